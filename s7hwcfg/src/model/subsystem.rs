//! Field bus subsystems and bus membership
//!
//! A subsystem never owns its nodes. Its node table maps bus addresses to
//! `NodeRef`s, plain index paths resolved through the station on demand.

use crate::config_data::ConfigData;
use crate::grammar::BusKind;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Bus technology of a subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubnetType {
    ProfibusDp,
    Profinet,
    /// Subnets without a modelled section grammar (MPI, plain Ethernet)
    NotImplemented,
}

impl From<BusKind> for SubnetType {
    fn from(kind: BusKind) -> Self {
        match kind {
            BusKind::Dp => SubnetType::ProfibusDp,
            BusKind::Io => SubnetType::Profinet,
        }
    }
}

impl fmt::Display for SubnetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetType::ProfibusDp => write!(f, "PROFIBUS-DP"),
            SubnetType::Profinet => write!(f, "PROFINET"),
            SubnetType::NotImplemented => write!(f, "not implemented"),
        }
    }
}

/// Role a node plays on its bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BusRole {
    /// Active PROFIBUS-DP station
    Master,
    /// Passive PROFIBUS-DP station
    Slave,
    /// Active PROFINET IO station
    Controller,
    /// Passive PROFINET IO station
    Device,
}

impl BusRole {
    /// Role of a module declaring itself master or controller
    pub fn active(kind: BusKind) -> Self {
        match kind {
            BusKind::Dp => BusRole::Master,
            BusKind::Io => BusRole::Controller,
        }
    }

    /// Role of a rack hosted at a bus address
    pub fn passive(kind: BusKind) -> Self {
        match kind {
            BusKind::Dp => BusRole::Slave,
            BusKind::Io => BusRole::Device,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BusRole::Master => "MASTER",
            BusRole::Slave => "SLAVE",
            BusRole::Controller => "CONTROLLER",
            BusRole::Device => "DEVICE",
        }
    }
}

/// Back-reference from a node to the subsystem it sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SubsystemMembership {
    pub subsystem: u32,
    pub address: u32,
    pub role: BusRole,
}

impl fmt::Display for SubsystemMembership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of subsystem {} at address {}",
            self.role.as_str(),
            self.subsystem,
            self.address
        )
    }
}

/// Index path to a node owned elsewhere in the station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeRef {
    SlotModule {
        rack: u32,
        slot: u32,
    },
    SubSlotModule {
        rack: u32,
        slot: u32,
        subslot: u32,
    },
    SubsystemRack {
        subsystem: u32,
        address: u32,
    },
    SubsystemRackSlotModule {
        subsystem: u32,
        address: u32,
        slot: u32,
    },
    SubsystemRackSubSlotModule {
        subsystem: u32,
        address: u32,
        slot: u32,
        subslot: u32,
    },
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::SlotModule { rack, slot } => write!(f, "rack {} slot {}", rack, slot),
            NodeRef::SubSlotModule {
                rack,
                slot,
                subslot,
            } => write!(f, "rack {} slot {} sub-slot {}", rack, slot, subslot),
            NodeRef::SubsystemRack { subsystem, address } => {
                write!(f, "subsystem {} address {}", subsystem, address)
            }
            NodeRef::SubsystemRackSlotModule {
                subsystem,
                address,
                slot,
            } => write!(
                f,
                "subsystem {} address {} slot {}",
                subsystem, address, slot
            ),
            NodeRef::SubsystemRackSubSlotModule {
                subsystem,
                address,
                slot,
                subslot,
            } => write!(
                f,
                "subsystem {} address {} slot {} sub-slot {}",
                subsystem, address, slot, subslot
            ),
        }
    }
}

/// A field bus declared by a `DPSUBSYSTEM`/`IOSUBSYSTEM` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subsystem {
    pub number: u32,
    pub name: String,
    pub kind: BusKind,
    pub subnet_type: SubnetType,
    pub data: ConfigData,
    nodes: BTreeMap<u32, NodeRef>,
}

impl Subsystem {
    pub fn new(kind: BusKind, number: u32, name: &str, data: ConfigData) -> Self {
        Self {
            number,
            name: name.to_string(),
            kind,
            subnet_type: SubnetType::from(kind),
            data,
            nodes: BTreeMap::new(),
        }
    }

    /// Attach a node at `address`.
    ///
    /// An occupied address keeps its first node; the current occupant is
    /// returned as the error.
    pub fn attach_node(&mut self, address: u32, node: NodeRef) -> Result<(), NodeRef> {
        match self.nodes.entry(address) {
            Entry::Vacant(entry) => {
                entry.insert(node);
                Ok(())
            }
            Entry::Occupied(entry) => Err(*entry.get()),
        }
    }

    pub fn node(&self, address: u32) -> Option<NodeRef> {
        self.nodes.get(&address).copied()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (u32, NodeRef)> + '_ {
        self.nodes.iter().map(|(address, node)| (*address, *node))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_keeps_first_node() {
        let mut subsystem = Subsystem::new(BusKind::Dp, 1, "PROFIBUS(1)", ConfigData::default());
        let master = NodeRef::SlotModule { rack: 0, slot: 4 };
        let slave = NodeRef::SubsystemRack {
            subsystem: 1,
            address: 2,
        };

        assert!(subsystem.attach_node(2, master).is_ok());
        assert_eq!(subsystem.attach_node(2, slave), Err(master));
        assert_eq!(subsystem.node(2), Some(master));
        assert_eq!(subsystem.node_count(), 1);
        assert_eq!(subsystem.subnet_type, SubnetType::ProfibusDp);
    }

    #[test]
    fn test_roles_per_bus() {
        assert_eq!(BusRole::active(BusKind::Dp), BusRole::Master);
        assert_eq!(BusRole::active(BusKind::Io), BusRole::Controller);
        assert_eq!(BusRole::passive(BusKind::Dp), BusRole::Slave);
        assert_eq!(BusRole::passive(BusKind::Io), BusRole::Device);
    }

    #[test]
    fn test_membership_display() {
        let membership = SubsystemMembership {
            subsystem: 100,
            address: 1,
            role: BusRole::Controller,
        };
        assert_eq!(
            membership.to_string(),
            "CONTROLLER of subsystem 100 at address 1"
        );
    }
}
