//! Error types for hierarchical resolution
//!
//! Every section level error carries the offending header line and the
//! section's line span so the bad input can be located directly.

use crate::cfgfile::FileFormatError;
use crate::classification::SectionRole;
use crate::config_data::ConfigDataError;
use crate::logging::codes;
use crate::utils::Span;
use thiserror::Error;

/// Result type for resolution operations
pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// A classified section whose header, body or parent lookup failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SectionFormatError {
    #[error("Header does not match the {role} grammar at {span}: {header}")]
    HeaderMismatch {
        role: SectionRole,
        header: String,
        span: Span,
    },

    #[error("Field '{field}' value '{value}' out of range at {span}: {header}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        header: String,
        span: Span,
    },

    #[error("{source} (section at {span}: {header})")]
    MalformedBody {
        #[source]
        source: ConfigDataError,
        header: String,
        span: Span,
    },

    #[error("Rack {rack} is not declared, referenced at {span}: {header}")]
    UnknownRack { rack: u32, header: String, span: Span },

    #[error("Slot {slot} of rack {rack} is not declared, referenced at {span}: {header}")]
    UnknownSlot {
        rack: u32,
        slot: u32,
        header: String,
        span: Span,
    },

    #[error("Subsystem {subsystem} is not declared, referenced at {span}: {header}")]
    UnknownSubsystem {
        subsystem: u32,
        header: String,
        span: Span,
    },

    #[error("No node declared at subsystem {subsystem} address {address}, referenced at {span}: {header}")]
    UnknownSubsystemRack {
        subsystem: u32,
        address: u32,
        header: String,
        span: Span,
    },

    #[error("Slot {slot} of subsystem {subsystem} address {address} is not declared, referenced at {span}: {header}")]
    UnknownSubsystemRackSlot {
        subsystem: u32,
        address: u32,
        slot: u32,
        header: String,
        span: Span,
    },

    #[error("Duplicate {target} declared at {span}: {header}")]
    DuplicateKey {
        target: String,
        header: String,
        span: Span,
    },
}

impl SectionFormatError {
    pub fn header_mismatch(role: SectionRole, header: &str, span: Span) -> Self {
        Self::HeaderMismatch {
            role,
            header: header.to_string(),
            span,
        }
    }

    pub fn invalid_number(field: &'static str, value: &str, header: &str, span: Span) -> Self {
        Self::InvalidNumber {
            field,
            value: value.to_string(),
            header: header.to_string(),
            span,
        }
    }

    pub fn malformed_body(source: ConfigDataError, header: &str, span: Span) -> Self {
        Self::MalformedBody {
            source,
            header: header.to_string(),
            span,
        }
    }

    pub fn duplicate_key(target: &str, header: &str, span: Span) -> Self {
        Self::DuplicateKey {
            target: target.to_string(),
            header: header.to_string(),
            span,
        }
    }

    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::HeaderMismatch { .. } => codes::section_format::HEADER_MISMATCH,
            Self::InvalidNumber { .. } => codes::section_format::INVALID_NUMBER,
            Self::MalformedBody { source, .. } => source.error_code(),
            Self::UnknownRack { .. } => codes::section_format::UNKNOWN_RACK,
            Self::UnknownSlot { .. } => codes::section_format::UNKNOWN_SLOT,
            Self::UnknownSubsystem { .. } => codes::section_format::UNKNOWN_SUBSYSTEM,
            Self::UnknownSubsystemRack { .. } => codes::section_format::UNKNOWN_SUBSYSTEM_RACK,
            Self::UnknownSubsystemRackSlot { .. } => {
                codes::section_format::UNKNOWN_SUBSYSTEM_RACK_SLOT
            }
            Self::DuplicateKey { .. } => codes::section_format::DUPLICATE_KEY,
        }
    }

    /// Header line of the failing section
    pub fn header(&self) -> &str {
        match self {
            Self::HeaderMismatch { header, .. }
            | Self::InvalidNumber { header, .. }
            | Self::MalformedBody { header, .. }
            | Self::UnknownRack { header, .. }
            | Self::UnknownSlot { header, .. }
            | Self::UnknownSubsystem { header, .. }
            | Self::UnknownSubsystemRack { header, .. }
            | Self::UnknownSubsystemRackSlot { header, .. }
            | Self::DuplicateKey { header, .. } => header,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::HeaderMismatch { span, .. }
            | Self::InvalidNumber { span, .. }
            | Self::MalformedBody { span, .. }
            | Self::UnknownRack { span, .. }
            | Self::UnknownSlot { span, .. }
            | Self::UnknownSubsystem { span, .. }
            | Self::UnknownSubsystemRack { span, .. }
            | Self::UnknownSubsystemRackSlot { span, .. }
            | Self::DuplicateKey { span, .. } => *span,
        }
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.error_code().as_str())
    }
}

/// Fatal resolution failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error(transparent)]
    FileFormat(#[from] FileFormatError),

    #[error(transparent)]
    SectionFormat(#[from] SectionFormatError),
}

impl ResolutionError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::FileFormat(error) => error.error_code(),
            Self::SectionFormat(error) => error.error_code(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::FileFormat(error) => error.span(),
            Self::SectionFormat(error) => Some(error.span()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_header_text() {
        let error = SectionFormatError::UnknownRack {
            rack: 2,
            header: r#"RACK 2, SLOT 4, "X", "Y""#.to_string(),
            span: Span::lines(20, 24),
        };

        let message = error.to_string();
        assert!(message.contains("Rack 2"));
        assert!(message.contains("lines 20-24"));
        assert!(message.contains(r#"RACK 2, SLOT 4, "X", "Y""#));
        assert_eq!(error.error_code(), codes::section_format::UNKNOWN_RACK);
        assert!(error.requires_halt());
    }

    #[test]
    fn test_body_error_keeps_address_code() {
        let error = SectionFormatError::malformed_body(
            ConfigDataError::malformed_address_line("LOCAL_IN_ADDRESSES", "ADDRESS 1"),
            "RACK 0, SLOT 4, \"X\", \"Y\"",
            Span::lines(3, 9),
        );
        assert_eq!(error.error_code(), codes::section_format::MALFORMED_ADDRESS_LINE);
        assert_eq!(error.header(), "RACK 0, SLOT 4, \"X\", \"Y\"");
    }

    #[test]
    fn test_resolution_error_wraps_codes() {
        let error = ResolutionError::from(FileFormatError::MissingStationSection);
        assert_eq!(error.error_code(), codes::file_format::MISSING_STATION_SECTION);
        assert!(error.span().is_none());
    }
}
