//! Header grammars of the hardware configuration export
//!
//! `keywords` holds the literal tokens, `header` the fixed-shape section
//! header grammars and `options` the bus declaration lines that may follow a
//! module header.

pub mod header;
pub mod keywords;
pub mod options;

use regex::Regex;
use std::sync::OnceLock;

pub use header::{
    Grammar, HeaderError, HeaderFields, ModuleIdent, RackHeader, RackSlotHeader,
    RackSlotSubslotHeader, StationHeader, SubsystemAddressHeader, SubsystemAddressSlotHeader,
    SubsystemAddressSlotSubslotHeader, SubsystemHeader,
};
pub use keywords::BusKind;
pub use options::{parse_bus_declaration, BusDeclaration};

/// Quoted string field; `NAME` is replaced by the capture group name
pub(crate) const QUOTED: &str = r#""(?P<NAME>[^"]*)""#;

/// Decimal number field
pub(crate) const ADDRESS_NUM: &str = r"\d+";

/// Compile a fixed pattern once and keep it for the life of the process.
///
/// Patterns passed here are built from constants in this crate, so a
/// compile failure is a programming error.
pub(crate) fn cached(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("static pattern compiles"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cached_regex_is_compiled_once() {
        static CELL: OnceLock<Regex> = OnceLock::new();
        let first = cached(&CELL, r"^\d+$");
        let second = cached(&CELL, r"ignored once compiled");
        assert!(std::ptr::eq(first, second));
        assert!(second.is_match("42"));
    }

    #[test]
    fn test_every_grammar_compiles() {
        for grammar in Grammar::ALL {
            assert!(!grammar.regex().as_str().is_empty(), "{}", grammar);
        }
    }
}
