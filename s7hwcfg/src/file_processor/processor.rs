//! Reads a configuration export from disk into an ordered line sequence

use crate::config::compile_time::file_processing::{
    LARGE_FILE_THRESHOLD, MAX_FILE_SIZE, MAX_LINE_COUNT,
};
use crate::config::runtime::FileProcessorPreferences;
use crate::logging::codes::{self, Code};
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileProcessorError {
    #[error("no such file: {path}")]
    FileNotFound { path: String },

    #[error("expected a .cfg export, found extension {extension:?}")]
    InvalidExtension { extension: Option<String> },

    #[error("export is {size} bytes, limit is {max_size}")]
    FileTooLarge { size: u64, max_size: u64 },

    #[error("export is empty")]
    EmptyFile,

    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    #[error("export is not valid UTF-8: {path}")]
    InvalidEncoding { path: String },

    #[error("cannot read {path}: {message}")]
    IoError { path: String, message: String },

    #[error("not a regular file: {path}")]
    InvalidPath { path: String },

    #[error("export has {lines} lines, limit is {max_lines}")]
    TooManyLines { lines: usize, max_lines: usize },
}

impl FileProcessorError {
    pub fn error_code(&self) -> Code {
        use codes::file_processing::*;
        match self {
            Self::FileNotFound { .. } => FILE_NOT_FOUND,
            Self::InvalidExtension { .. } => INVALID_EXTENSION,
            Self::FileTooLarge { .. } => FILE_TOO_LARGE,
            Self::EmptyFile => EMPTY_FILE,
            Self::PermissionDenied { .. } => PERMISSION_DENIED,
            Self::InvalidEncoding { .. } => INVALID_ENCODING,
            Self::IoError { .. } => IO_ERROR,
            Self::InvalidPath { .. } => INVALID_PATH,
            Self::TooManyLines { .. } => TOO_MANY_LINES,
        }
    }

    fn from_io(path: &Path, error: &io::Error) -> Self {
        let path = path.display().to_string();
        match error.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::InvalidData => Self::InvalidEncoding { path },
            _ => Self::IoError {
                path,
                message: error.to_string(),
            },
        }
    }
}

/// What was read, for reporting alongside the parsed station
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct FileMetadata {
    /// Canonical path
    pub path: PathBuf,
    pub size: u64,
    /// Lowercased, without the dot
    pub extension: Option<String>,
    pub line_count: usize,
    pub is_cfg_file: bool,
}

impl FileMetadata {
    pub fn is_large_file(&self) -> bool {
        self.size > LARGE_FILE_THRESHOLD
    }
}

#[derive(Debug, Clone)]
pub struct FileProcessingResult {
    pub source: String,
    pub metadata: FileMetadata,
    pub processing_duration: Duration,
}

impl FileProcessingResult {
    /// Lines in file order, without terminators
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.source.lines()
    }
}

/// Reads exports within the compile-time size limits
#[derive(Debug, Clone)]
pub struct FileProcessor {
    pub require_cfg_extension: bool,
    pub enable_performance_logging: bool,
    pub log_non_cfg_processing: bool,
}

impl Default for FileProcessor {
    fn default() -> Self {
        Self {
            require_cfg_extension: false,
            enable_performance_logging: true,
            log_non_cfg_processing: true,
        }
    }
}

impl FileProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_preferences(prefs: &FileProcessorPreferences) -> Self {
        Self {
            require_cfg_extension: prefs.require_cfg_extension,
            enable_performance_logging: prefs.enable_performance_logging,
            log_non_cfg_processing: prefs.log_non_cfg_processing,
        }
    }

    pub fn with_cfg_extension_required(mut self, required: bool) -> Self {
        self.require_cfg_extension = required;
        self
    }

    pub fn process_file(&self, path: &Path) -> Result<FileProcessingResult, FileProcessorError> {
        let started = Instant::now();
        log_debug!("Reading export", "file" => path.display());

        let result = self.read(path, started);
        match &result {
            Ok(read) => self.log_read(read),
            Err(error) => log_error!(error.error_code(), &error.to_string(),
                "file" => path.display()),
        }
        result
    }

    fn read(&self, path: &Path, started: Instant) -> Result<FileProcessingResult, FileProcessorError> {
        if path.as_os_str().is_empty() {
            return Err(FileProcessorError::InvalidPath {
                path: String::new(),
            });
        }

        let stat = fs::metadata(path).map_err(|e| FileProcessorError::from_io(path, &e))?;
        if !stat.is_file() {
            return Err(FileProcessorError::InvalidPath {
                path: path.display().to_string(),
            });
        }
        let canonical = path
            .canonicalize()
            .map_err(|e| FileProcessorError::from_io(path, &e))?;

        let extension = canonical
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let is_cfg_file = extension.as_deref() == Some("cfg");

        if stat.len() > MAX_FILE_SIZE {
            return Err(FileProcessorError::FileTooLarge {
                size: stat.len(),
                max_size: MAX_FILE_SIZE,
            });
        }
        if stat.len() == 0 {
            return Err(FileProcessorError::EmptyFile);
        }
        if self.require_cfg_extension && !is_cfg_file {
            return Err(FileProcessorError::InvalidExtension { extension });
        }

        let source =
            fs::read_to_string(&canonical).map_err(|e| FileProcessorError::from_io(path, &e))?;
        let line_count = source.lines().count();
        if line_count > MAX_LINE_COUNT {
            return Err(FileProcessorError::TooManyLines {
                lines: line_count,
                max_lines: MAX_LINE_COUNT,
            });
        }

        Ok(FileProcessingResult {
            source,
            metadata: FileMetadata {
                path: canonical,
                size: stat.len(),
                extension,
                line_count,
                is_cfg_file,
            },
            processing_duration: started.elapsed(),
        })
    }

    fn log_read(&self, read: &FileProcessingResult) {
        let meta = &read.metadata;
        if self.enable_performance_logging {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Export read",
                "file" => meta.path.display(),
                "bytes" => meta.size,
                "lines" => meta.line_count,
                "large" => meta.is_large_file(),
                "duration_ms" => format!("{:.2}", read.processing_duration.as_secs_f64() * 1000.0));
        } else {
            log_success!(codes::success::FILE_PROCESSING_SUCCESS, "Export read",
                "file" => meta.path.display(),
                "lines" => meta.line_count);
        }

        if !meta.is_cfg_file && self.log_non_cfg_processing {
            log_debug!("Export has no .cfg extension",
                "extension" => meta.extension.as_deref().unwrap_or("none"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_reads_lines_and_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("Station.CFG");
        fs::write(&path, "FILEVERSION \"3.2\"\nSTATION S7300 , \"SIMATIC 300(1)\"\n").unwrap();

        let read = FileProcessor::new().process_file(&path).unwrap();
        assert!(read.metadata.is_cfg_file);
        assert_eq!(read.metadata.extension.as_deref(), Some("cfg"));
        assert_eq!(read.metadata.line_count, 2);
        assert_eq!(read.lines().next(), Some("FILEVERSION \"3.2\""));
        assert!(!read.metadata.is_large_file());
    }

    #[test]
    fn test_missing_file_and_directory() {
        let dir = tempdir().unwrap();
        let processor = FileProcessor::new();

        assert_matches!(
            processor.process_file(&dir.path().join("missing.cfg")),
            Err(FileProcessorError::FileNotFound { .. })
        );
        assert_matches!(
            processor.process_file(dir.path()),
            Err(FileProcessorError::InvalidPath { .. })
        );
        assert_matches!(
            processor.process_file(Path::new("")),
            Err(FileProcessorError::InvalidPath { .. })
        );
    }

    #[test]
    fn test_empty_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.cfg");
        fs::write(&path, "").unwrap();

        let error = FileProcessor::new().process_file(&path).unwrap_err();
        assert_eq!(error, FileProcessorError::EmptyFile);
        assert_eq!(error.error_code(), codes::file_processing::EMPTY_FILE);
    }

    #[test]
    fn test_extension_requirement() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("station.txt");
        fs::write(&path, "FILEVERSION \"3.2\"\n").unwrap();

        assert_matches!(
            FileProcessor::new().with_cfg_extension_required(true).process_file(&path),
            Err(FileProcessorError::InvalidExtension { extension: Some(ext) }) if ext == "txt"
        );
        assert!(FileProcessor::new().process_file(&path).is_ok());
    }

    #[test]
    fn test_invalid_encoding() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin1.cfg");
        fs::write(&path, [0x46u8, 0x49, 0xff, 0xfe, 0x0a]).unwrap();

        assert_matches!(
            FileProcessor::new().process_file(&path),
            Err(FileProcessorError::InvalidEncoding { .. })
        );
    }
}
