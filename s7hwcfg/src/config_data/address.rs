//! `ADDRESS` line decoding
//!
//! ```text
//! ADDRESS  <startByte>, <startBit>, <lengthByte>, <lengthBit>, <type1>, <type2>
//! ```
//!
//! The two type codes select the data width of the start address and of the
//! length. The mapping is inferred from sample exports and is not a
//! documented table:
//!
//! | type1 | type2 | start        | length       |
//! |-------|-------|--------------|--------------|
//! | 0     | 16    | byte         | bit          |
//! | 0,1,2 | any   | byte         | byte         |
//! | 7,8   | any   | word         | byte         |
//! | other | any   | bit          | byte         |
//!
//! A bit offset above 7 in a bit-wide position makes the line malformed.

use crate::grammar::cached;
use crate::model::{Address, AddressArea, AddressKind};
use regex::Regex;
use std::sync::OnceLock;

static ADDRESS_LINE: OnceLock<Regex> = OnceLock::new();

fn address_regex() -> &'static Regex {
    cached(
        &ADDRESS_LINE,
        r"^\s*ADDRESS\s*(?P<start_byte>\d+)\s*,\s*(?P<start_bit>\d+)\s*,\s*(?P<length_byte>\d+)\s*,\s*(?P<length_bit>\d+)\s*,\s*(?P<type1>\d+)\s*,\s*(?P<type2>\d+)\s*$",
    )
}

/// Highest bit offset within a byte
const MAX_BIT: u8 = 7;

/// The six numeric fields of an `ADDRESS` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressLine {
    pub start_byte: u32,
    pub start_bit: u8,
    pub length_byte: u32,
    pub length_bit: u8,
    pub type1: u32,
    pub type2: u32,
}

impl AddressLine {
    /// Parse one line, `None` if it is not a well-formed `ADDRESS` line
    pub fn parse(line: &str) -> Option<Self> {
        let caps = address_regex().captures(line)?;
        let field = |name: &str| caps.name(name).map(|m| m.as_str());

        let line = Self {
            start_byte: field("start_byte")?.parse().ok()?,
            start_bit: field("start_bit")?.parse().ok()?,
            length_byte: field("length_byte")?.parse().ok()?,
            length_bit: field("length_bit")?.parse().ok()?,
            type1: field("type1")?.parse().ok()?,
            type2: field("type2")?.parse().ok()?,
        };

        let start_ok = !line.start_is_bit() || line.start_bit <= MAX_BIT;
        let length_ok = !line.length_is_bit() || line.length_bit <= MAX_BIT;
        (start_ok && length_ok).then_some(line)
    }

    fn start_is_bit(&self) -> bool {
        !matches!(self.type1, 0..=2 | 7 | 8)
    }

    fn length_is_bit(&self) -> bool {
        self.type1 == 0 && self.type2 == 16
    }

    /// Build the address area for the given direction
    pub fn to_area(&self, kind: AddressKind) -> AddressArea {
        let start = match self.type1 {
            0..=2 => Address::byte(kind, self.start_byte),
            7 | 8 => Address::word(kind, self.start_byte),
            _ => Address::bit(kind, self.start_byte, self.start_bit),
        };

        let length = if self.length_is_bit() {
            Address::bit(AddressKind::Plain, self.length_byte, self.length_bit)
        } else {
            Address::byte(AddressKind::Plain, self.length_byte)
        };

        AddressArea::new(start, length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AddressWidth;

    #[test]
    fn test_byte_addressing_branch() {
        let line = AddressLine::parse("ADDRESS 10,0,2,0,1,0").unwrap();
        let area = line.to_area(AddressKind::Input);

        assert_eq!(area.start.kind, AddressKind::Input);
        assert_eq!(area.start.width, AddressWidth::Byte);
        assert_eq!(area.start.byte, 10);
        assert_eq!(area.start.bit, 0);
        assert_eq!(area.length, Address::byte(AddressKind::Plain, 2));
    }

    #[test]
    fn test_type_code_table() {
        let decode = |line: &str| {
            AddressLine::parse(line)
                .map(|l| l.to_area(AddressKind::Output))
                .unwrap()
        };

        let bit_length = decode("ADDRESS  4, 0, 1, 0, 0, 16");
        assert_eq!(bit_length.start.width, AddressWidth::Byte);
        assert_eq!(bit_length.length.width, AddressWidth::Bit);

        let word = decode("ADDRESS  256, 0, 4, 0, 7, 0");
        assert_eq!(word.start.to_string(), "QW256");

        let bit = decode("ADDRESS  3, 5, 1, 0, 4, 0");
        assert_eq!(bit.start.to_string(), "Q3.5");
    }

    #[test]
    fn test_rejects_malformed_lines() {
        assert!(AddressLine::parse("ADDRESS 1, 2, 3").is_none());
        assert!(AddressLine::parse("ADDRESS 1, 2, 3, 4, 5, x").is_none());
        assert!(AddressLine::parse("ADDRESS 1, 999, 3, 0, 1, 0").is_none());
        assert!(AddressLine::parse(r#"COMMENT "x""#).is_none());
    }

    #[test]
    fn test_bit_offsets_stay_within_a_byte() {
        assert!(AddressLine::parse("ADDRESS 3, 7, 1, 0, 4, 0").is_some());
        assert!(AddressLine::parse("ADDRESS 3, 9, 1, 0, 4, 0").is_none());
        assert!(AddressLine::parse("ADDRESS 4, 0, 1, 8, 0, 16").is_none());

        // offsets in byte-wide positions are not bit numbers
        let area = AddressLine::parse("ADDRESS 3, 9, 1, 12, 1, 0")
            .unwrap()
            .to_area(AddressKind::Input);
        assert_eq!(area.start.to_string(), "IB3");
    }
}
