//! Section segmentation
//!
//! Sections are runs of non-blank lines separated by one or more blank
//! lines. Every section ends with a literal `END`; the header is everything
//! before the first `BEGIN`, the body everything between `BEGIN` and the
//! closing `END`.

use super::error::FileFormatError;
use crate::config::compile_time::segmentation::{MAX_BODY_LINES, MAX_HEADER_LINES, MAX_SECTIONS};
use crate::grammar::keywords::{BEGIN, END};
use crate::utils::Span;

/// One delimited section of the export
#[derive(Debug, Clone, Eq)]
pub struct RawSection {
    /// Trimmed lines before `BEGIN`
    pub header: Vec<String>,
    /// Trimmed lines between `BEGIN` and `END`, markers excluded
    pub body: Vec<String>,
    /// Input lines the section occupied
    pub span: Span,
}

impl PartialEq for RawSection {
    fn eq(&self, other: &Self) -> bool {
        self.header == other.header && self.body == other.body
    }
}

impl RawSection {
    pub fn new(header: Vec<String>, body: Vec<String>, span: Span) -> Self {
        Self { header, body, span }
    }

    /// First header line, empty when the section has no header
    pub fn title(&self) -> &str {
        self.header.first().map(String::as_str).unwrap_or_default()
    }

    /// Header lines after the title
    pub fn options(&self) -> &[String] {
        self.header.get(1..).unwrap_or_default()
    }

    /// Render back to `header / BEGIN / body / END` lines
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = self.header.clone();
        lines.push(BEGIN.to_string());
        lines.extend(self.body.iter().cloned());
        lines.push(END.to_string());
        lines
    }

    /// Split accumulated lines into header and body.
    ///
    /// `lines` must end with `END`. Without a `BEGIN` the body is empty and
    /// the header excludes the closing `END`.
    fn from_terminated(lines: Vec<String>, span: Span) -> Self {
        let content = &lines[..lines.len().saturating_sub(1)];
        match content.iter().position(|line| line == BEGIN) {
            Some(begin) => Self::new(
                content[..begin].to_vec(),
                content[begin + 1..].to_vec(),
                span,
            ),
            None => Self::new(content.to_vec(), Vec::new(), span),
        }
    }
}

/// Incremental segmenter fed one line at a time
struct Segmenter {
    first_line: u32,
    buffer: Vec<String>,
    buffer_start: u32,
    sections: Vec<RawSection>,
}

impl Segmenter {
    fn new(first_line: u32) -> Self {
        Self {
            first_line,
            buffer: Vec::new(),
            buffer_start: first_line,
            sections: Vec::new(),
        }
    }

    fn push(&mut self, line_number: u32, line: &str) -> Result<(), FileFormatError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return self.flush(line_number.saturating_sub(1));
        }
        if self.buffer.is_empty() {
            self.buffer_start = line_number;
        }
        self.buffer.push(trimmed.to_string());
        Ok(())
    }

    fn flush(&mut self, last_line: u32) -> Result<(), FileFormatError> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let lines = std::mem::take(&mut self.buffer);
        let span = Span::lines(self.buffer_start, last_line.max(self.first_line));

        if lines.last().map(String::as_str) != Some(END) {
            return Err(FileFormatError::unterminated_section(&lines, span));
        }
        if self.sections.len() >= MAX_SECTIONS {
            return Err(FileFormatError::TooManySections {
                limit: MAX_SECTIONS,
                span,
            });
        }

        let section = RawSection::from_terminated(lines, span);
        if section.header.len() > MAX_HEADER_LINES {
            return Err(FileFormatError::section_too_long(
                section.title(),
                "header",
                section.header.len(),
                MAX_HEADER_LINES,
                span,
            ));
        }
        if section.body.len() > MAX_BODY_LINES {
            return Err(FileFormatError::section_too_long(
                section.title(),
                "body",
                section.body.len(),
                MAX_BODY_LINES,
                span,
            ));
        }

        self.sections.push(section);
        Ok(())
    }

    fn finish(mut self, last_line: u32) -> Result<Vec<RawSection>, FileFormatError> {
        self.flush(last_line)?;
        Ok(self.sections)
    }
}

/// Segment lines into sections.
///
/// `first_line` is the 1-based input line number of `lines[0]`, used for
/// section spans. A trailing section without a blank line after it is still
/// flushed.
pub fn segment<S: AsRef<str>>(
    lines: &[S],
    first_line: u32,
) -> Result<Vec<RawSection>, FileFormatError> {
    let mut segmenter = Segmenter::new(first_line);
    let mut line_number = first_line;

    for line in lines {
        segmenter.push(line_number, line.as_ref())?;
        line_number += 1;
    }

    segmenter.finish(line_number.saturating_sub(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn section(header: &[&str], body: &[&str]) -> RawSection {
        RawSection::new(
            header.iter().map(|s| s.to_string()).collect(),
            body.iter().map(|s| s.to_string()).collect(),
            Span::default(),
        )
    }

    #[test]
    fn test_segmentation_round_trip() {
        let sections = vec![
            section(&[r#"STATION S7300 , "SIMATIC 300(1)""#], &[r#"ASSET_ID """#]),
            section(&[r#"RACK 0, "6ES7 390-1???0-0AA0", "UR""#], &[]),
            section(
                &[
                    r#"RACK 0, SLOT 4, "6GK7 443-5DX03-0XE0", "CP 443-5 Ext""#,
                    r#"MASTER DPSUBSYSTEM 1, "PROFIBUS(1)", DPADDRESS 2"#,
                ],
                &[
                    r#"PROFIBUSADDRESS "2""#,
                    "LOCAL_IN_ADDRESSES",
                    "ADDRESS  0, 0, 4, 0, 1, 0",
                    "PARAMETER",
                ],
            ),
        ];

        let text: Vec<String> = sections
            .iter()
            .map(|s| s.to_lines().join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n")
            .lines()
            .map(str::to_string)
            .collect();

        let segmented = segment(&text, 1).unwrap();
        assert_eq!(segmented, sections);
    }

    #[test]
    fn test_missing_end_before_blank_line_is_fatal() {
        let lines = [r#"RACK 0, "X", "Y""#, "BEGIN", r#"KEY "v""#, "", "END"];
        let error = segment(&lines, 7).unwrap_err();

        assert_matches!(
            error,
            FileFormatError::UnterminatedSection { ref lines, span }
                if lines.len() == 3 && span == Span::lines(7, 9)
        );
    }

    #[test]
    fn test_missing_end_at_eof_is_fatal() {
        let lines = [r#"STATION S7300 , "S""#, "BEGIN", "END", "", r#"RACK 0, "X", "Y""#];
        assert_matches!(
            segment(&lines, 1),
            Err(FileFormatError::UnterminatedSection { lines, .. })
                if lines == vec![r#"RACK 0, "X", "Y""#.to_string()]
        );
    }

    #[test]
    fn test_blank_runs_and_whitespace_lines() {
        let lines = [
            "STATION S7300 , \"S\"",
            "BEGIN",
            "END",
            "",
            "   ",
            "",
            "  RACK 0, \"X\", \"Y\"  ",
            "  BEGIN",
            "  END",
        ];
        let sections = segment(&lines, 10).unwrap();

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].span, Span::lines(10, 12));
        assert_eq!(sections[1].title(), "RACK 0, \"X\", \"Y\"");
        assert_eq!(sections[1].span, Span::lines(16, 18));
    }

    #[test]
    fn test_section_without_begin() {
        let lines = ["RACK 0, \"X\", \"Y\"", "END"];
        let sections = segment(&lines, 1).unwrap();

        assert_eq!(sections[0].header, vec!["RACK 0, \"X\", \"Y\"".to_string()]);
        assert!(sections[0].body.is_empty());
    }

    #[test]
    fn test_title_and_options() {
        let s = section(&["RACK 0, SLOT 2, \"A\", \"B\"", "OPTION 1", "OPTION 2"], &[]);
        assert_eq!(s.title(), "RACK 0, SLOT 2, \"A\", \"B\"");
        assert_eq!(s.options().len(), 2);

        let empty = section(&[], &[]);
        assert_eq!(empty.title(), "");
        assert!(empty.options().is_empty());
    }

    #[test]
    fn test_body_line_limit() {
        let mut lines = vec!["RACK 0, \"X\", \"Y\"".to_string(), "BEGIN".to_string()];
        lines.extend((0..=MAX_BODY_LINES).map(|i| format!("KEY{} \"v\"", i)));
        lines.push("END".to_string());

        assert_matches!(
            segment(&lines, 1),
            Err(FileFormatError::SectionTooLong { part: "body", .. })
        );
    }
}
