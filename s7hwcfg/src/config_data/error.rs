//! Section body errors

use crate::logging::codes;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigDataError {
    #[error("The following line in section {region} couldn't be parsed: {line}")]
    MalformedAddressLine { region: &'static str, line: String },
}

impl ConfigDataError {
    pub fn malformed_address_line(region: &'static str, line: &str) -> Self {
        Self::MalformedAddressLine {
            region,
            line: line.to_string(),
        }
    }

    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::MalformedAddressLine { .. } => codes::section_format::MALFORMED_ADDRESS_LINE,
        }
    }
}
