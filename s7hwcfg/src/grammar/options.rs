//! Bus declaration option lines
//!
//! A module header may be followed by option lines. Two of them make the
//! module the active station of a field bus:
//!
//! ```text
//! MASTER DPSUBSYSTEM 1, "PROFIBUS(1)", DPADDRESS 2
//! CONTROLLER IOSUBSYSTEM 100, "Ethernet(1)", IOADDRESS 1
//! ```

use super::header::HeaderError;
use super::keywords::BusKind;
use super::{cached, ADDRESS_NUM};
use regex::Regex;
use std::sync::OnceLock;

static MASTER_DP: OnceLock<Regex> = OnceLock::new();
static CONTROLLER_IO: OnceLock<Regex> = OnceLock::new();

/// Bus master or controller declaration found in a header's options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusDeclaration {
    pub kind: BusKind,
    pub subsystem: u32,
    pub address: u32,
}

fn declaration_regex(kind: BusKind) -> &'static Regex {
    let (cell, role) = match kind {
        BusKind::Dp => (&MASTER_DP, "MASTER"),
        BusKind::Io => (&CONTROLLER_IO, "CONTROLLER"),
    };
    cached(
        cell,
        &format!(
            r"^{role}\s+{}\s+(?P<subsystem>{num})\s*,.*\b{}\s+(?P<address>{num})\s*$",
            kind.subsystem_keyword(),
            kind.address_keyword(),
            num = ADDRESS_NUM,
        ),
    )
}

fn parse_line(kind: BusKind, line: &str) -> Option<Result<BusDeclaration, HeaderError>> {
    let caps = declaration_regex(kind).captures(line.trim())?;
    let number = |field: &'static str| {
        let value = caps.name(field).map(|m| m.as_str()).unwrap_or_default();
        value.parse::<u32>().map_err(|_| HeaderError::InvalidNumber {
            field,
            value: value.to_string(),
        })
    };

    Some(number("subsystem").and_then(|subsystem| {
        Ok(BusDeclaration {
            kind,
            subsystem,
            address: number("address")?,
        })
    }))
}

/// Find the bus declaration among a section's option lines.
///
/// The first DP master line wins; without one, the first IO controller line
/// is used.
pub fn parse_bus_declaration<S: AsRef<str>>(
    options: &[S],
) -> Result<Option<BusDeclaration>, HeaderError> {
    for kind in BusKind::ALL {
        if let Some(found) = options
            .iter()
            .find_map(|line| parse_line(kind, line.as_ref()))
        {
            return found.map(Some);
        }
    }
    Ok(None)
}
