//! Process image addresses and address areas

use serde::Serialize;
use std::fmt;

/// Direction of an address; lengths carry no direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AddressKind {
    Input,
    Output,
    Plain,
}

impl AddressKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            AddressKind::Input => "I",
            AddressKind::Output => "Q",
            AddressKind::Plain => "",
        }
    }
}

/// Data width class of an address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum AddressWidth {
    Bit,
    Byte,
    Word,
    Dword,
}

impl AddressWidth {
    pub fn prefix(&self) -> &'static str {
        match self {
            AddressWidth::Bit => "",
            AddressWidth::Byte => "B",
            AddressWidth::Word => "W",
            AddressWidth::Dword => "D",
        }
    }
}

/// One address in STEP 7 notation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Address {
    pub kind: AddressKind,
    pub width: AddressWidth,
    pub byte: u32,
    /// Only meaningful for `AddressWidth::Bit`
    pub bit: u8,
}

impl Address {
    pub fn bit(kind: AddressKind, byte: u32, bit: u8) -> Self {
        Self {
            kind,
            width: AddressWidth::Bit,
            byte,
            bit,
        }
    }

    pub fn byte(kind: AddressKind, byte: u32) -> Self {
        Self::with_width(kind, AddressWidth::Byte, byte)
    }

    pub fn word(kind: AddressKind, byte: u32) -> Self {
        Self::with_width(kind, AddressWidth::Word, byte)
    }

    pub fn dword(kind: AddressKind, byte: u32) -> Self {
        Self::with_width(kind, AddressWidth::Dword, byte)
    }

    fn with_width(kind: AddressKind, width: AddressWidth, byte: u32) -> Self {
        Self {
            kind,
            width,
            byte,
            bit: 0,
        }
    }
}

/// Renders `IB10`, `QW4`, `I0.3`; plain lengths render without prefix
impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.kind.prefix(), self.width.prefix(), self.byte)?;
        if self.width == AddressWidth::Bit {
            write!(f, ".{}", self.bit)?;
        }
        Ok(())
    }
}

/// Contiguous process image region occupied by a module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AddressArea {
    pub start: Address,
    /// Direction-less length, `AddressKind::Plain`
    pub length: Address,
}

impl AddressArea {
    pub fn new(start: Address, length: Address) -> Self {
        Self { start, length }
    }

    pub fn kind(&self) -> AddressKind {
        self.start.kind
    }
}

impl fmt::Display for AddressArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (length {})", self.start, self.length)
    }
}
