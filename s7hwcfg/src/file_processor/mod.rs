//! Line source: reads configuration exports from disk

mod processor;

use crate::config::runtime::FileProcessorPreferences;
use std::path::Path;

pub use processor::{FileMetadata, FileProcessingResult, FileProcessor, FileProcessorError};

/// Read an export with the default processor
pub fn process_file(path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
    FileProcessor::new().process_file(path)
}

pub fn create_processor_from_preferences(prefs: &FileProcessorPreferences) -> FileProcessor {
    FileProcessor::from_preferences(prefs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_strict_preferences_reject_foreign_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plant.txt");
        fs::write(&path, "FILEVERSION \"3.2\"\n").unwrap();

        let strict = create_processor_from_preferences(&FileProcessorPreferences {
            require_cfg_extension: true,
            enable_performance_logging: false,
            log_non_cfg_processing: false,
        });

        assert_matches!(
            strict.process_file(&path),
            Err(FileProcessorError::InvalidExtension { .. })
        );
        assert!(process_file(&path).is_ok());
    }
}
