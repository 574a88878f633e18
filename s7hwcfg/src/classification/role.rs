//! Structural roles of sections and the resolution passes consuming them

use crate::grammar::{BusKind, Grammar};
use serde::Serialize;
use std::fmt;

/// Role of a section, assigned once from its header line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SectionRole {
    Station,
    Rack,
    RackSlot,
    RackSlotSubslot,
    BusSubsystem(BusKind),
    BusSubsystemAddress(BusKind),
    BusSubsystemAddressSlot(BusKind),
    BusSubsystemAddressSlotSubslot(BusKind),
    Unknown,
}

impl SectionRole {
    /// Grammar the header must satisfy, `None` for unknown sections
    pub fn grammar(&self) -> Option<Grammar> {
        match *self {
            SectionRole::Station => Some(Grammar::Station),
            SectionRole::Rack => Some(Grammar::Rack),
            SectionRole::RackSlot => Some(Grammar::RackSlot),
            SectionRole::RackSlotSubslot => Some(Grammar::RackSlotSubslot),
            SectionRole::BusSubsystem(kind) => Some(Grammar::Subsystem(kind)),
            SectionRole::BusSubsystemAddress(kind) => Some(Grammar::SubsystemAddress(kind)),
            SectionRole::BusSubsystemAddressSlot(kind) => {
                Some(Grammar::SubsystemAddressSlot(kind))
            }
            SectionRole::BusSubsystemAddressSlotSubslot(kind) => {
                Some(Grammar::SubsystemAddressSlotSubslot(kind))
            }
            SectionRole::Unknown => None,
        }
    }

    /// Resolution pass consuming sections of this role
    pub fn pass(&self) -> Option<ResolutionPass> {
        match self {
            SectionRole::Station => Some(ResolutionPass::Station),
            SectionRole::Rack => Some(ResolutionPass::Rack),
            SectionRole::BusSubsystem(_) => Some(ResolutionPass::Subsystem),
            SectionRole::RackSlot => Some(ResolutionPass::RackSlot),
            SectionRole::RackSlotSubslot => Some(ResolutionPass::RackSlotSubslot),
            SectionRole::BusSubsystemAddress(_) => Some(ResolutionPass::SubsystemAddress),
            SectionRole::BusSubsystemAddressSlot(_) => Some(ResolutionPass::SubsystemAddressSlot),
            SectionRole::BusSubsystemAddressSlotSubslot(_) => {
                Some(ResolutionPass::SubsystemAddressSlotSubslot)
            }
            SectionRole::Unknown => None,
        }
    }

    pub fn bus_kind(&self) -> Option<BusKind> {
        match *self {
            SectionRole::BusSubsystem(kind)
            | SectionRole::BusSubsystemAddress(kind)
            | SectionRole::BusSubsystemAddressSlot(kind)
            | SectionRole::BusSubsystemAddressSlotSubslot(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SectionRole::Unknown)
    }
}

impl From<Grammar> for SectionRole {
    fn from(grammar: Grammar) -> Self {
        match grammar {
            Grammar::Station => SectionRole::Station,
            Grammar::Rack => SectionRole::Rack,
            Grammar::RackSlot => SectionRole::RackSlot,
            Grammar::RackSlotSubslot => SectionRole::RackSlotSubslot,
            Grammar::Subsystem(kind) => SectionRole::BusSubsystem(kind),
            Grammar::SubsystemAddress(kind) => SectionRole::BusSubsystemAddress(kind),
            Grammar::SubsystemAddressSlot(kind) => SectionRole::BusSubsystemAddressSlot(kind),
            Grammar::SubsystemAddressSlotSubslot(kind) => {
                SectionRole::BusSubsystemAddressSlotSubslot(kind)
            }
        }
    }
}

impl fmt::Display for SectionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.grammar() {
            Some(grammar) => write!(f, "{}", grammar),
            None => write!(f, "UNKNOWN"),
        }
    }
}

/// Resolution passes in execution order.
///
/// Each pass drains one role bucket and fills the lookup table a later pass
/// indexes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ResolutionPass {
    Station,
    Rack,
    Subsystem,
    RackSlot,
    RackSlotSubslot,
    SubsystemAddress,
    SubsystemAddressSlot,
    SubsystemAddressSlotSubslot,
}

impl ResolutionPass {
    pub const ALL: [ResolutionPass; 8] = [
        ResolutionPass::Station,
        ResolutionPass::Rack,
        ResolutionPass::Subsystem,
        ResolutionPass::RackSlot,
        ResolutionPass::RackSlotSubslot,
        ResolutionPass::SubsystemAddress,
        ResolutionPass::SubsystemAddressSlot,
        ResolutionPass::SubsystemAddressSlotSubslot,
    ];

    /// 1-based position in the pass sequence
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    pub fn name(&self) -> &'static str {
        match self {
            ResolutionPass::Station => "station",
            ResolutionPass::Rack => "rack",
            ResolutionPass::Subsystem => "subsystem",
            ResolutionPass::RackSlot => "rack-slot",
            ResolutionPass::RackSlotSubslot => "rack-slot-subslot",
            ResolutionPass::SubsystemAddress => "subsystem-address",
            ResolutionPass::SubsystemAddressSlot => "subsystem-address-slot",
            ResolutionPass::SubsystemAddressSlotSubslot => "subsystem-address-slot-subslot",
        }
    }
}

impl fmt::Display for ResolutionPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pass {} ({})", self.number(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_order_matches_declaration() {
        let numbers: Vec<usize> = ResolutionPass::ALL.iter().map(|p| p.number()).collect();
        assert_eq!(numbers, (1..=8).collect::<Vec<_>>());

        let mut sorted = ResolutionPass::ALL;
        sorted.sort();
        assert_eq!(sorted, ResolutionPass::ALL);
    }

    #[test]
    fn test_subsystem_pass_precedes_membership_passes() {
        assert!(ResolutionPass::Subsystem < ResolutionPass::RackSlot);
        assert!(ResolutionPass::Subsystem < ResolutionPass::RackSlotSubslot);
        assert!(ResolutionPass::SubsystemAddress < ResolutionPass::SubsystemAddressSlot);
    }

    #[test]
    fn test_every_grammar_maps_to_a_pass() {
        for grammar in Grammar::ALL {
            let role = SectionRole::from(grammar);
            assert_eq!(role.grammar(), Some(grammar));
            assert!(role.pass().is_some());
        }
        assert_eq!(SectionRole::Unknown.pass(), None);
    }
}
