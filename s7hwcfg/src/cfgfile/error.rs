//! File structure errors
//!
//! Raised while splitting the preamble from the sections and while
//! segmenting sections. All of them abort the parse.

use crate::logging::codes;
use crate::utils::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileFormatError {
    #[error("Input contains no lines")]
    EmptyInput,

    #[error("No line starting with STATION found")]
    MissingStation,

    #[error("FILEVERSION entry missing from file header")]
    MissingFileVersion,

    #[error("END missing in section at {span}:\n{}", lines.join("\n"))]
    UnterminatedSection { lines: Vec<String>, span: Span },

    #[error("Section count exceeds limit of {limit} at {span}")]
    TooManySections { limit: usize, span: Span },

    #[error("Section '{title}' at {span} has {count} {part} lines, limit is {limit}")]
    SectionTooLong {
        title: String,
        part: &'static str,
        count: usize,
        limit: usize,
        span: Span,
    },

    #[error("No STATION section found")]
    MissingStationSection,

    #[error("{count} STATION sections found, expected exactly one (first at {first})")]
    MultipleStationSections { count: usize, first: Span },
}

impl FileFormatError {
    pub fn unterminated_section(lines: &[String], span: Span) -> Self {
        Self::UnterminatedSection {
            lines: lines.to_vec(),
            span,
        }
    }

    pub fn section_too_long(
        title: &str,
        part: &'static str,
        count: usize,
        limit: usize,
        span: Span,
    ) -> Self {
        Self::SectionTooLong {
            title: title.to_string(),
            part,
            count,
            limit,
            span,
        }
    }

    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::EmptyInput => codes::file_format::EMPTY_INPUT,
            Self::MissingStation => codes::file_format::MISSING_STATION_MARKER,
            Self::MissingFileVersion => codes::file_format::MISSING_FILEVERSION,
            Self::UnterminatedSection { .. } => codes::file_format::UNTERMINATED_SECTION,
            Self::TooManySections { .. } | Self::SectionTooLong { .. } => {
                codes::file_format::SECTION_LIMIT_EXCEEDED
            }
            Self::MissingStationSection => codes::file_format::MISSING_STATION_SECTION,
            Self::MultipleStationSections { .. } => codes::file_format::MULTIPLE_STATION_SECTIONS,
        }
    }

    /// Source lines involved, when the error is tied to a section
    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnterminatedSection { span, .. }
            | Self::TooManySections { span, .. }
            | Self::SectionTooLong { span, .. } => Some(*span),
            Self::MultipleStationSections { first, .. } => Some(*first),
            _ => None,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unterminated_section_message_lists_lines() {
        let lines = vec!["RACK 0, \"X\", \"Y\"".to_string(), "BEGIN".to_string()];
        let error = FileFormatError::unterminated_section(&lines, Span::lines(5, 6));
        let message = error.to_string();

        assert!(message.contains("lines 5-6"));
        assert!(message.contains("RACK 0"));
        assert!(message.ends_with("BEGIN"));
        assert_eq!(error.error_code(), codes::file_format::UNTERMINATED_SECTION);
        assert!(error.requires_halt());
    }

    #[test]
    fn test_span_only_for_section_errors() {
        assert!(FileFormatError::EmptyInput.span().is_none());
        let error = FileFormatError::section_too_long("RACK 0", "body", 10, 5, Span::lines(1, 12));
        assert_eq!(error.span(), Some(Span::lines(1, 12)));
    }
}
