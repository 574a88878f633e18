use crate::cfgfile::FileFormatError;
use crate::file_processor::FileProcessorError;
use crate::logging::codes;
use crate::resolution::{ResolutionError, SectionFormatError};

/// Pipeline processing errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("File processing failed: {0}")]
    FileProcessing(#[from] FileProcessorError),

    #[error("File format error: {0}")]
    FileFormat(#[from] FileFormatError),

    #[error("Section format error: {0}")]
    SectionFormat(#[from] SectionFormatError),
}

impl From<ResolutionError> for PipelineError {
    fn from(error: ResolutionError) -> Self {
        match error {
            ResolutionError::FileFormat(error) => Self::FileFormat(error),
            ResolutionError::SectionFormat(error) => Self::SectionFormat(error),
        }
    }
}

impl PipelineError {
    pub fn error_code(&self) -> codes::Code {
        match self {
            Self::FileProcessing(error) => error.error_code(),
            Self::FileFormat(error) => error.error_code(),
            Self::SectionFormat(error) => error.error_code(),
        }
    }
}
