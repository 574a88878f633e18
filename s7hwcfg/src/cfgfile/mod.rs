//! Configuration file structure: preamble and sections
//!
//! Splits the line sequence at the first `STATION` line, parses the file
//! header from the lines before it and segments the rest into
//! `RawSection`s.

pub mod error;
pub mod preamble;
pub mod section;

pub use error::FileFormatError;
pub use preamble::{FileFormat, FileHeader};
pub use section::RawSection;

use crate::logging::codes;
use crate::{log_debug, log_error, log_success};

/// A segmented configuration export
#[derive(Debug, Clone)]
pub struct CfgFile {
    pub header: FileHeader,
    pub sections: Vec<RawSection>,
}

impl CfgFile {
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self, FileFormatError> {
        match Self::build(lines) {
            Ok(file) => {
                log_success!(
                    codes::success::SEGMENTATION_COMPLETE,
                    "Configuration file segmented",
                    "sections" => file.sections.len(),
                    "file_version" => &file.header.file_version
                );
                Ok(file)
            }
            Err(error) => {
                match error.span() {
                    Some(span) => log_error!(error.error_code(), &error.to_string(), span = span),
                    None => log_error!(error.error_code(), &error.to_string()),
                }
                Err(error)
            }
        }
    }

    fn build<S: AsRef<str>>(lines: &[S]) -> Result<Self, FileFormatError> {
        let station_index = preamble::find_station_line(lines)?;
        let header = preamble::parse_preamble(&lines[..station_index])?;

        log_debug!("File header parsed",
            "file_version" => &header.file_version,
            "metadata_entries" => header.metadata.len(),
            "station_line" => station_index + 1
        );

        let first_line = u32::try_from(station_index + 1).unwrap_or(u32::MAX);
        let sections = section::segment(&lines[station_index..], first_line)?;

        Ok(Self { header, sections })
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Span;
    use assert_matches::assert_matches;

    const SAMPLE: &str = r#"FILEVERSION "3.2"
#STEP7_VERSION V5.6

STATION S7300 , "SIMATIC 300(1)"
BEGIN
  ASSET_ID ""
END

RACK 0, "6ES7 390-1???0-0AA0", "UR"
BEGIN
END
"#;

    #[test]
    fn test_from_lines() {
        let lines: Vec<&str> = SAMPLE.lines().collect();
        let file = CfgFile::from_lines(&lines).unwrap();

        assert_eq!(file.header.file_version, "3.2");
        assert_eq!(file.section_count(), 2);
        assert_eq!(file.sections[0].title(), r#"STATION S7300 , "SIMATIC 300(1)""#);
        assert_eq!(file.sections[0].body, vec![r#"ASSET_ID """#.to_string()]);
        assert_eq!(file.sections[0].span, Span::lines(4, 7));
        assert_eq!(file.sections[1].span, Span::lines(9, 11));
    }

    #[test]
    fn test_missing_station_marker() {
        let lines = [r#"FILEVERSION "3.2""#, "#CPU_RACK 0"];
        assert_matches!(CfgFile::from_lines(&lines), Err(FileFormatError::MissingStation));
    }

    #[test]
    fn test_missing_file_version() {
        let lines = ["#CPU_RACK 0", r#"STATION S7300 , "S""#, "BEGIN", "END"];
        assert_matches!(
            CfgFile::from_lines(&lines),
            Err(FileFormatError::MissingFileVersion)
        );
    }
}
