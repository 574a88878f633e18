//! File header (preamble) parsing
//!
//! Everything before the first line starting with `STATION` is the file
//! header:
//!
//! ```text
//! FILEVERSION "3.2"
//! #STEP7_VERSION V5.6
//! #CPU_RACK 0
//! FORMAT COMPACT
//! ```

use super::error::FileFormatError;
use crate::grammar::cached;
use crate::grammar::keywords::STATION;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

static FILE_VERSION: OnceLock<Regex> = OnceLock::new();
static METADATA: OnceLock<Regex> = OnceLock::new();
static COMPACT_FORMAT: OnceLock<Regex> = OnceLock::new();

/// Layout variant announced by the file header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FileFormat {
    #[default]
    Readable,
    Compact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileHeader {
    pub file_version: String,
    /// `#TAG value` lines keyed by tag
    pub metadata: BTreeMap<String, String>,
    pub format: FileFormat,
}

impl FileHeader {
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.metadata.get(tag).map(String::as_str)
    }
}

/// Index of the first line starting with `STATION`
pub fn find_station_line<S: AsRef<str>>(lines: &[S]) -> Result<usize, FileFormatError> {
    if lines.iter().all(|line| line.as_ref().trim().is_empty()) {
        return Err(FileFormatError::EmptyInput);
    }

    lines
        .iter()
        .position(|line| line.as_ref().trim_start().starts_with(STATION))
        .ok_or(FileFormatError::MissingStation)
}

/// Parse the preamble lines into a `FileHeader`.
///
/// The first `FILEVERSION` line is used; it is the only required entry.
pub fn parse_preamble<S: AsRef<str>>(lines: &[S]) -> Result<FileHeader, FileFormatError> {
    let file_version_re = cached(
        &FILE_VERSION,
        r#"^FILEVERSION\s+"(?P<version>[a-zA-Z0-9]+\.[a-zA-Z0-9]+)"$"#,
    );
    let metadata_re = cached(&METADATA, r"^#(?P<tag>[A-Z0-9_]+)\s(?P<value>.+)$");
    let compact_re = cached(&COMPACT_FORMAT, r"^FORMAT\s+COMPACT$");

    let trimmed = || lines.iter().map(|line| line.as_ref().trim());

    let file_version = trimmed()
        .find_map(|line| file_version_re.captures(line))
        .and_then(|caps| caps.name("version"))
        .map(|m| m.as_str().to_string())
        .ok_or(FileFormatError::MissingFileVersion)?;

    let metadata = trimmed()
        .filter_map(|line| metadata_re.captures(line))
        .filter_map(|caps| {
            let tag = caps.name("tag")?.as_str().to_string();
            let value = caps.name("value")?.as_str().trim().to_string();
            Some((tag, value))
        })
        .collect();

    let format = if trimmed().any(|line| compact_re.is_match(line)) {
        FileFormat::Compact
    } else {
        FileFormat::Readable
    };

    Ok(FileHeader {
        file_version,
        metadata,
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_full_preamble() {
        let lines = [
            r#"FILEVERSION "3.2""#,
            "#STEP7_VERSION V5.6",
            "#CPU_RACK 0",
            "FORMAT COMPACT",
            "",
        ];
        let header = parse_preamble(&lines).unwrap();

        assert_eq!(header.file_version, "3.2");
        assert_eq!(header.get("STEP7_VERSION"), Some("V5.6"));
        assert_eq!(header.get("CPU_RACK"), Some("0"));
        assert_eq!(header.format, FileFormat::Compact);
    }

    #[test]
    fn test_readable_is_default_format() {
        let header = parse_preamble(&[r#"FILEVERSION "3.2""#]).unwrap();
        assert_eq!(header.format, FileFormat::Readable);
        assert!(header.metadata.is_empty());
    }

    #[test]
    fn test_missing_file_version() {
        assert_matches!(
            parse_preamble(&["#CPU_RACK 0"]),
            Err(FileFormatError::MissingFileVersion)
        );
        assert_matches!(
            parse_preamble(&[r#"FILEVERSION "3""#]),
            Err(FileFormatError::MissingFileVersion)
        );
    }

    #[test]
    fn test_find_station_line() {
        let lines = [r#"FILEVERSION "3.2""#, "", r#"STATION S7300 , "S""#];
        assert_eq!(find_station_line(&lines).unwrap(), 2);

        assert_matches!(
            find_station_line(&[r#"FILEVERSION "3.2""#]),
            Err(FileFormatError::MissingStation)
        );

        let empty: [&str; 0] = [];
        assert_matches!(find_station_line(&empty), Err(FileFormatError::EmptyInput));
        assert_matches!(find_station_line(&["", "  "]), Err(FileFormatError::EmptyInput));
    }
}
