//! Keywords and marker lines of the configuration export format

use serde::Serialize;
use std::fmt;

pub const STATION: &str = "STATION";
pub const RACK: &str = "RACK";
pub const SLOT: &str = "SLOT";
pub const SUBSLOT: &str = "SUBSLOT";

/// Opens a section body
pub const BEGIN: &str = "BEGIN";
/// Closes a section
pub const END: &str = "END";

pub const LOCAL_IN_ADDRESSES: &str = "LOCAL_IN_ADDRESSES";
pub const LOCAL_OUT_ADDRESSES: &str = "LOCAL_OUT_ADDRESSES";
pub const PARAMETER: &str = "PARAMETER";
pub const SYMBOL: &str = "SYMBOL";

/// Body marker lines that end the key/value block and delimit address regions
pub const CONFIG_DATA_KEYWORDS: [&str; 4] =
    [LOCAL_IN_ADDRESSES, LOCAL_OUT_ADDRESSES, PARAMETER, SYMBOL];

pub fn is_config_data_keyword(line: &str) -> bool {
    CONFIG_DATA_KEYWORDS.contains(&line.trim())
}

/// The two field-bus families a subsystem section can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum BusKind {
    /// PROFIBUS-DP
    Dp,
    /// PROFINET IO / Industrial Ethernet
    Io,
}

impl BusKind {
    pub const ALL: [BusKind; 2] = [BusKind::Dp, BusKind::Io];

    /// Section keyword, `DPSUBSYSTEM` or `IOSUBSYSTEM`
    pub fn subsystem_keyword(&self) -> &'static str {
        match self {
            BusKind::Dp => "DPSUBSYSTEM",
            BusKind::Io => "IOSUBSYSTEM",
        }
    }

    /// Address qualifier, `DPADDRESS` or `IOADDRESS`
    pub fn address_keyword(&self) -> &'static str {
        match self {
            BusKind::Dp => "DPADDRESS",
            BusKind::Io => "IOADDRESS",
        }
    }

    pub fn from_subsystem_keyword(keyword: &str) -> Option<BusKind> {
        BusKind::ALL
            .into_iter()
            .find(|kind| kind.subsystem_keyword() == keyword)
    }

    pub fn from_address_keyword(keyword: &str) -> Option<BusKind> {
        BusKind::ALL
            .into_iter()
            .find(|kind| kind.address_keyword() == keyword)
    }
}

impl fmt::Display for BusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusKind::Dp => write!(f, "PROFIBUS-DP"),
            BusKind::Io => write!(f, "PROFINET IO"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bus_keywords_round_trip() {
        for kind in BusKind::ALL {
            assert_eq!(
                BusKind::from_subsystem_keyword(kind.subsystem_keyword()),
                Some(kind)
            );
            assert_eq!(BusKind::from_address_keyword(kind.address_keyword()), Some(kind));
        }
        assert_eq!(BusKind::from_subsystem_keyword("RACK"), None);
    }

    #[test]
    fn test_config_data_keywords() {
        assert!(is_config_data_keyword("PARAMETER"));
        assert!(is_config_data_keyword("  SYMBOL "));
        assert!(!is_config_data_keyword("ADDRESS 0, 0, 1, 0, 1, 0"));
    }
}
