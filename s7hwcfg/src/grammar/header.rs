//! Section header grammars and typed header records
//!
//! Each structural role has one fixed-shape grammar. The header line is
//! matched as a whole (anchored), numeric fields are decimal integers and
//! string fields are the text between a pair of double quotes. Module
//! headers may carry a second quoted component, the firmware version,
//! directly after the order number.

use super::keywords::{BusKind, RACK, SLOT, STATION, SUBSLOT};
use super::{cached, ADDRESS_NUM, QUOTED};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::OnceLock;

/// Header field extraction failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HeaderError {
    #[error("header does not match the {grammar} grammar")]
    Mismatch { grammar: Grammar },

    #[error("field '{field}' value '{value}' is not a valid number")]
    InvalidNumber { field: &'static str, value: String },
}

/// One fixed header shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Grammar {
    /// `STATION <TYPE>, "<name>"`
    Station,
    /// `RACK <n>, "<order>", "<name>"`
    Rack,
    /// `RACK <n>, SLOT <s>, "<order>" ["<ver>"], "<name>"`
    RackSlot,
    /// `RACK <n>, SLOT <s>, SUBSLOT <t>, "<order>" ["<ver>"], "<name>"`
    RackSlotSubslot,
    /// `DPSUBSYSTEM <n>, "<name>"`
    Subsystem(BusKind),
    /// `DPSUBSYSTEM <n>, DPADDRESS <a>, "<order>" ["<ver>"], "<name>"`
    SubsystemAddress(BusKind),
    /// `... DPADDRESS <a>, SLOT <s>, "<order>" ["<ver>"], "<name>"`
    SubsystemAddressSlot(BusKind),
    /// `... DPADDRESS <a>, SLOT <s>, SUBSLOT <t>, "<order>" ["<ver>"], "<name>"`
    SubsystemAddressSlotSubslot(BusKind),
}

const GRAMMAR_COUNT: usize = 12;

#[allow(clippy::declare_interior_mutable_const)]
const UNCOMPILED: OnceLock<Regex> = OnceLock::new();
static GRAMMAR_REGEXES: [OnceLock<Regex>; GRAMMAR_COUNT] = [UNCOMPILED; GRAMMAR_COUNT];

impl Grammar {
    /// All grammars in matching priority order.
    ///
    /// Header shapes are nested prefixes of each other, so the most specific
    /// shape comes first: sub-slot before slot before rack, and
    /// address+slot before address before bare subsystem.
    pub const ALL: [Grammar; GRAMMAR_COUNT] = [
        Grammar::RackSlotSubslot,
        Grammar::RackSlot,
        Grammar::Rack,
        Grammar::SubsystemAddressSlotSubslot(BusKind::Dp),
        Grammar::SubsystemAddressSlotSubslot(BusKind::Io),
        Grammar::SubsystemAddressSlot(BusKind::Dp),
        Grammar::SubsystemAddressSlot(BusKind::Io),
        Grammar::SubsystemAddress(BusKind::Dp),
        Grammar::SubsystemAddress(BusKind::Io),
        Grammar::Subsystem(BusKind::Dp),
        Grammar::Subsystem(BusKind::Io),
        Grammar::Station,
    ];

    fn index(&self) -> usize {
        let bus = |kind: &BusKind| match kind {
            BusKind::Dp => 0,
            BusKind::Io => 1,
        };
        match self {
            Grammar::Station => 0,
            Grammar::Rack => 1,
            Grammar::RackSlot => 2,
            Grammar::RackSlotSubslot => 3,
            Grammar::Subsystem(kind) => 4 + bus(kind),
            Grammar::SubsystemAddress(kind) => 6 + bus(kind),
            Grammar::SubsystemAddressSlot(kind) => 8 + bus(kind),
            Grammar::SubsystemAddressSlotSubslot(kind) => 10 + bus(kind),
        }
    }

    /// Regex source for this grammar
    pub fn pattern(&self) -> String {
        let module = format!(
            r#"{order}\s*(?:{version}\s*)?,\s*{name}\s*$"#,
            order = QUOTED.replace("NAME", "order"),
            version = QUOTED.replace("NAME", "version"),
            name = QUOTED.replace("NAME", "name"),
        );
        let subsystem_prefix = |kind: &BusKind| {
            format!(
                r"^{}\s+(?P<subsystem>{num})\s*,\s*{}\s+(?P<address>{num})\s*,\s*",
                kind.subsystem_keyword(),
                kind.address_keyword(),
                num = ADDRESS_NUM,
            )
        };

        match self {
            Grammar::Station => format!(
                r"^{STATION}\s+(?P<station_type>[A-Za-z0-9_]+)\s*,\s*{}\s*$",
                QUOTED.replace("NAME", "name")
            ),
            Grammar::Rack => format!(
                r"^{RACK}\s+(?P<rack>{num})\s*,\s*{}\s*,\s*{}\s*$",
                QUOTED.replace("NAME", "order"),
                QUOTED.replace("NAME", "name"),
                num = ADDRESS_NUM,
            ),
            Grammar::RackSlot => format!(
                r"^{RACK}\s+(?P<rack>{num})\s*,\s*{SLOT}\s+(?P<slot>{num})\s*,\s*{module}",
                num = ADDRESS_NUM,
            ),
            Grammar::RackSlotSubslot => format!(
                r"^{RACK}\s+(?P<rack>{num})\s*,\s*{SLOT}\s+(?P<slot>{num})\s*,\s*{SUBSLOT}\s+(?P<subslot>{num})\s*,\s*{module}",
                num = ADDRESS_NUM,
            ),
            Grammar::Subsystem(kind) => format!(
                r"^{}\s+(?P<subsystem>{num})\s*,\s*{}\s*$",
                kind.subsystem_keyword(),
                QUOTED.replace("NAME", "name"),
                num = ADDRESS_NUM,
            ),
            Grammar::SubsystemAddress(kind) => {
                format!("{}{module}", subsystem_prefix(kind))
            }
            Grammar::SubsystemAddressSlot(kind) => format!(
                r"{}{SLOT}\s+(?P<slot>{num})\s*,\s*{module}",
                subsystem_prefix(kind),
                num = ADDRESS_NUM,
            ),
            Grammar::SubsystemAddressSlotSubslot(kind) => format!(
                r"{}{SLOT}\s+(?P<slot>{num})\s*,\s*{SUBSLOT}\s+(?P<subslot>{num})\s*,\s*{module}",
                subsystem_prefix(kind),
                num = ADDRESS_NUM,
            ),
        }
    }

    pub fn regex(&self) -> &'static Regex {
        cached(&GRAMMAR_REGEXES[self.index()], &self.pattern())
    }

    /// Match a header line, returning its fields or `None`
    pub fn match_line<'a>(&self, line: &'a str) -> Option<HeaderFields<'a>> {
        self.regex().captures(line.trim()).map(|caps| HeaderFields {
            grammar: *self,
            caps,
        })
    }

    /// Match a header line, reporting a mismatch as an error
    pub fn fields<'a>(&self, line: &'a str) -> Result<HeaderFields<'a>, HeaderError> {
        self.match_line(line)
            .ok_or(HeaderError::Mismatch { grammar: *self })
    }

    /// First grammar in priority order matching the line
    pub fn detect(line: &str) -> Option<Grammar> {
        Grammar::ALL
            .into_iter()
            .find(|grammar| grammar.regex().is_match(line.trim()))
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grammar::Station => write!(f, "{STATION}"),
            Grammar::Rack => write!(f, "{RACK}"),
            Grammar::RackSlot => write!(f, "{RACK}/{SLOT}"),
            Grammar::RackSlotSubslot => write!(f, "{RACK}/{SLOT}/{SUBSLOT}"),
            Grammar::Subsystem(kind) => write!(f, "{}", kind.subsystem_keyword()),
            Grammar::SubsystemAddress(kind) => write!(
                f,
                "{}/{}",
                kind.subsystem_keyword(),
                kind.address_keyword()
            ),
            Grammar::SubsystemAddressSlot(kind) => write!(
                f,
                "{}/{}/SLOT",
                kind.subsystem_keyword(),
                kind.address_keyword()
            ),
            Grammar::SubsystemAddressSlotSubslot(kind) => write!(
                f,
                "{}/{}/SLOT/SUBSLOT",
                kind.subsystem_keyword(),
                kind.address_keyword()
            ),
        }
    }
}

/// Named fields captured from one header line
#[derive(Debug)]
pub struct HeaderFields<'a> {
    grammar: Grammar,
    caps: Captures<'a>,
}

impl<'a> HeaderFields<'a> {
    pub fn grammar(&self) -> Grammar {
        self.grammar
    }

    pub fn text(&self, field: &'static str) -> &'a str {
        self.caps.name(field).map(|m| m.as_str()).unwrap_or_default()
    }

    pub fn optional_text(&self, field: &'static str) -> Option<&'a str> {
        self.caps.name(field).map(|m| m.as_str())
    }

    pub fn number(&self, field: &'static str) -> Result<u32, HeaderError> {
        let value = self.text(field);
        value.parse().map_err(|_| HeaderError::InvalidNumber {
            field,
            value: value.to_string(),
        })
    }

    fn module_ident(&self) -> ModuleIdent {
        ModuleIdent {
            order_number: self.text("order").to_string(),
            version: self.optional_text("version").map(str::to_string),
            name: self.text("name").to_string(),
        }
    }
}

// ============================================================================
// TYPED HEADERS
// ============================================================================

/// Order number, optional firmware version and display name of a module
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ModuleIdent {
    pub order_number: String,
    pub version: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationHeader {
    /// Raw station type code, e.g. `S7300`
    pub type_code: String,
    pub name: String,
}

impl StationHeader {
    pub fn parse(line: &str) -> Result<Self, HeaderError> {
        let fields = Grammar::Station.fields(line)?;
        Ok(Self {
            type_code: fields.text("station_type").to_string(),
            name: fields.text("name").to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RackHeader {
    pub rack: u32,
    pub order_number: String,
    pub name: String,
}

impl RackHeader {
    pub fn parse(line: &str) -> Result<Self, HeaderError> {
        let fields = Grammar::Rack.fields(line)?;
        Ok(Self {
            rack: fields.number("rack")?,
            order_number: fields.text("order").to_string(),
            name: fields.text("name").to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RackSlotHeader {
    pub rack: u32,
    pub slot: u32,
    pub ident: ModuleIdent,
}

impl RackSlotHeader {
    pub fn parse(line: &str) -> Result<Self, HeaderError> {
        let fields = Grammar::RackSlot.fields(line)?;
        Ok(Self {
            rack: fields.number("rack")?,
            slot: fields.number("slot")?,
            ident: fields.module_ident(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RackSlotSubslotHeader {
    pub rack: u32,
    pub slot: u32,
    pub subslot: u32,
    pub ident: ModuleIdent,
}

impl RackSlotSubslotHeader {
    pub fn parse(line: &str) -> Result<Self, HeaderError> {
        let fields = Grammar::RackSlotSubslot.fields(line)?;
        Ok(Self {
            rack: fields.number("rack")?,
            slot: fields.number("slot")?,
            subslot: fields.number("subslot")?,
            ident: fields.module_ident(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemHeader {
    pub kind: BusKind,
    pub subsystem: u32,
    pub name: String,
}

impl SubsystemHeader {
    pub fn parse(kind: BusKind, line: &str) -> Result<Self, HeaderError> {
        let fields = Grammar::Subsystem(kind).fields(line)?;
        Ok(Self {
            kind,
            subsystem: fields.number("subsystem")?,
            name: fields.text("name").to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemAddressHeader {
    pub kind: BusKind,
    pub subsystem: u32,
    pub address: u32,
    pub ident: ModuleIdent,
}

impl SubsystemAddressHeader {
    pub fn parse(kind: BusKind, line: &str) -> Result<Self, HeaderError> {
        let fields = Grammar::SubsystemAddress(kind).fields(line)?;
        Ok(Self {
            kind,
            subsystem: fields.number("subsystem")?,
            address: fields.number("address")?,
            ident: fields.module_ident(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemAddressSlotHeader {
    pub kind: BusKind,
    pub subsystem: u32,
    pub address: u32,
    pub slot: u32,
    pub ident: ModuleIdent,
}

impl SubsystemAddressSlotHeader {
    pub fn parse(kind: BusKind, line: &str) -> Result<Self, HeaderError> {
        let fields = Grammar::SubsystemAddressSlot(kind).fields(line)?;
        Ok(Self {
            kind,
            subsystem: fields.number("subsystem")?,
            address: fields.number("address")?,
            slot: fields.number("slot")?,
            ident: fields.module_ident(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemAddressSlotSubslotHeader {
    pub kind: BusKind,
    pub subsystem: u32,
    pub address: u32,
    pub slot: u32,
    pub subslot: u32,
    pub ident: ModuleIdent,
}

impl SubsystemAddressSlotSubslotHeader {
    pub fn parse(kind: BusKind, line: &str) -> Result<Self, HeaderError> {
        let fields = Grammar::SubsystemAddressSlotSubslot(kind).fields(line)?;
        Ok(Self {
            kind,
            subsystem: fields.number("subsystem")?,
            address: fields.number("address")?,
            slot: fields.number("slot")?,
            subslot: fields.number("subslot")?,
            ident: fields.module_ident(),
        })
    }
}
