//! Section body (configuration data) parsing
//!
//! A body starts with free `KEY "value"` lines, followed by optional blocks
//! introduced by marker lines:
//!
//! ```text
//! ASSET_ID ""
//! COMMENT ""
//! LOCAL_IN_ADDRESSES
//!   ADDRESS  0, 0, 4, 0, 1, 0
//! LOCAL_OUT_ADDRESSES
//!   ADDRESS  0, 0, 4, 0, 1, 0
//! PARAMETER
//!   ...
//! ```
//!
//! The key/value scan is lenient and skips anything it does not recognise.
//! Address regions are strict: every line up to the next marker must be a
//! valid `ADDRESS` line.

pub mod address;
pub mod error;

pub use address::AddressLine;
pub use error::ConfigDataError;

use crate::grammar::cached;
use crate::grammar::keywords::{is_config_data_keyword, LOCAL_IN_ADDRESSES, LOCAL_OUT_ADDRESSES};
use crate::model::{AddressArea, AddressKind};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

static KEY_VALUE: OnceLock<Regex> = OnceLock::new();

/// Parsed section body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigData {
    pub values: BTreeMap<String, String>,
    pub inputs: Vec<AddressArea>,
    pub outputs: Vec<AddressArea>,
}

impl ConfigData {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn has_addresses(&self) -> bool {
        !self.inputs.is_empty() || !self.outputs.is_empty()
    }
}

/// Parse `KEY "value"` lines up to the first body keyword.
///
/// Later occurrences of a key overwrite earlier ones.
pub fn parse_key_values<S: AsRef<str>>(body: &[S]) -> BTreeMap<String, String> {
    let key_value = cached(&KEY_VALUE, r#"^(?P<key>\w+)\s+"(?P<value>.*)"$"#);

    body.iter()
        .map(|line| line.as_ref().trim())
        .take_while(|line| !is_config_data_keyword(line))
        .filter_map(|line| {
            let caps = key_value.captures(line)?;
            Some((
                caps.name("key")?.as_str().to_string(),
                caps.name("value")?.as_str().to_string(),
            ))
        })
        .collect()
}

/// Parse the address region introduced by `marker`.
///
/// Only the first occurrence of the marker is used; a missing marker yields
/// an empty list.
pub fn parse_address_region<S: AsRef<str>>(
    body: &[S],
    marker: &'static str,
    kind: AddressKind,
) -> Result<Vec<AddressArea>, ConfigDataError> {
    body.iter()
        .map(|line| line.as_ref().trim())
        .skip_while(|line| *line != marker)
        .skip(1)
        .take_while(|line| !is_config_data_keyword(line))
        .map(|line| {
            AddressLine::parse(line)
                .map(|address| address.to_area(kind))
                .ok_or_else(|| ConfigDataError::malformed_address_line(marker, line))
        })
        .collect()
}

/// Parse a complete section body
pub fn parse_config_data<S: AsRef<str>>(body: &[S]) -> Result<ConfigData, ConfigDataError> {
    Ok(ConfigData {
        values: parse_key_values(body),
        inputs: parse_address_region(body, LOCAL_IN_ADDRESSES, AddressKind::Input)?,
        outputs: parse_address_region(body, LOCAL_OUT_ADDRESSES, AddressKind::Output)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Address, AddressWidth};
    use assert_matches::assert_matches;

    #[test]
    fn test_input_region_decodes_one_area() {
        let body = ["LOCAL_IN_ADDRESSES", "ADDRESS 10,0,2,0,1,0", "PARAMETER"];
        let data = parse_config_data(&body).unwrap();

        assert_eq!(data.inputs.len(), 1);
        assert!(data.outputs.is_empty());

        let area = data.inputs[0];
        assert_eq!(area.start.kind, AddressKind::Input);
        assert_eq!(area.start.byte, 10);
        assert_eq!(area.start.bit, 0);
        assert_eq!(area.start.width, AddressWidth::Byte);
        assert_eq!(area.length, Address::byte(AddressKind::Plain, 2));
    }

    #[test]
    fn test_key_values_are_lenient() {
        let body = [
            r#"ASSET_ID "A-17""#,
            "some free comment",
            r#"COMMENT "with "inner" quotes""#,
            r#"ASSET_ID "A-18""#,
            "PARAMETER",
            r#"HIDDEN "not scanned""#,
        ];
        let values = parse_key_values(&body);

        assert_eq!(values.get("ASSET_ID").map(String::as_str), Some("A-18"));
        assert_eq!(
            values.get("COMMENT").map(String::as_str),
            Some(r#"with "inner" quotes"#)
        );
        assert!(!values.contains_key("HIDDEN"));
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn test_both_regions_and_region_end() {
        let body = [
            r#"PROFIBUSADDRESS "2""#,
            "LOCAL_OUT_ADDRESSES",
            "ADDRESS  4, 0, 2, 0, 1, 0",
            "LOCAL_IN_ADDRESSES",
            "ADDRESS  0, 0, 4, 0, 1, 0",
            "ADDRESS  8, 0, 2, 0, 7, 0",
            "SYMBOL",
            "ADDRESS  not an address",
        ];
        let data = parse_config_data(&body).unwrap();

        assert_eq!(data.get("PROFIBUSADDRESS"), Some("2"));
        assert_eq!(data.outputs.len(), 1);
        assert_eq!(data.outputs[0].start.to_string(), "QB4");
        assert_eq!(data.inputs.len(), 2);
        assert_eq!(data.inputs[1].start.to_string(), "IW8");
        assert!(data.has_addresses());
    }

    #[test]
    fn test_first_marker_occurrence_wins() {
        let body = [
            "LOCAL_IN_ADDRESSES",
            "ADDRESS  0, 0, 1, 0, 1, 0",
            "PARAMETER",
            "LOCAL_IN_ADDRESSES",
            "ADDRESS  9, 0, 1, 0, 1, 0",
        ];
        let data = parse_config_data(&body).unwrap();
        assert_eq!(data.inputs.len(), 1);
        assert_eq!(data.inputs[0].start.byte, 0);
    }

    #[test]
    fn test_malformed_line_in_region_is_an_error() {
        let body = ["LOCAL_IN_ADDRESSES", "ADDRESS 1, 2", "PARAMETER"];
        assert_matches!(
            parse_config_data(&body),
            Err(ConfigDataError::MalformedAddressLine { region: "LOCAL_IN_ADDRESSES", ref line })
                if line == "ADDRESS 1, 2"
        );
    }

    #[test]
    fn test_empty_body() {
        let body: [&str; 0] = [];
        assert_eq!(parse_config_data(&body).unwrap(), ConfigData::default());
    }
}
