//! Station racks and bus-hosted racks

use super::module::{impl_module_host, SlotModule, SubsystemRackSlotModule};
use super::subsystem::{BusRole, SubsystemMembership};
use crate::config_data::ConfigData;
use crate::grammar::{BusKind, ModuleIdent};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mounting rack of the station
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rack {
    pub number: u32,
    pub order_number: String,
    pub name: String,
    pub data: ConfigData,
    pub slots: BTreeMap<u32, SlotModule>,
}

impl Rack {
    pub fn new(number: u32, order_number: &str, name: &str, data: ConfigData) -> Self {
        Self {
            number,
            order_number: order_number.to_string(),
            name: name.to_string(),
            data,
            slots: BTreeMap::new(),
        }
    }
}

impl_module_host!(Rack, SlotModule, slots, "rack");

/// Rack-like device sitting at an address of a field bus (DP slave, IO device)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsystemRack {
    pub ident: ModuleIdent,
    pub data: ConfigData,
    pub kind: BusKind,
    /// Lookup key, taken from the section header
    pub subsystem: u32,
    pub address: u32,
    /// Set once the rack owns its bus address; always passive
    pub membership: Option<SubsystemMembership>,
    pub slots: BTreeMap<u32, SubsystemRackSlotModule>,
}

impl SubsystemRack {
    pub fn new(
        kind: BusKind,
        subsystem: u32,
        address: u32,
        ident: ModuleIdent,
        data: ConfigData,
    ) -> Self {
        Self {
            ident,
            data,
            kind,
            subsystem,
            address,
            membership: None,
            slots: BTreeMap::new(),
        }
    }

    pub fn subsystem(&self) -> u32 {
        self.subsystem
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    /// Membership at the header's address, recorded once the bus accepted the rack
    pub fn bus_membership(&self) -> SubsystemMembership {
        SubsystemMembership {
            subsystem: self.subsystem,
            address: self.address,
            role: BusRole::passive(self.kind),
        }
    }

    /// Designation given in the section header
    pub fn designation(&self) -> &str {
        &self.ident.name
    }
}

impl_module_host!(
    SubsystemRack,
    SubsystemRackSlotModule,
    slots,
    "subsystem rack"
);
