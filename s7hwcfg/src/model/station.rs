//! Station root of the hardware graph

use super::module::{insert_unique, InsertError, SlotModule, SubSlotModule, SubsystemRackSlotModule};
use super::rack::{Rack, SubsystemRack};
use super::subsystem::{NodeRef, Subsystem};
use crate::config_data::ConfigData;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Controller family of a station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StationType {
    S7300,
    S7400,
    NotImplemented,
}

impl StationType {
    /// Map the header type code, `S7300` or `S7400`
    pub fn from_code(code: &str) -> Self {
        match code {
            "S7300" => StationType::S7300,
            "S7400" => StationType::S7400,
            _ => StationType::NotImplemented,
        }
    }
}

impl fmt::Display for StationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationType::S7300 => write!(f, "S7-300"),
            StationType::S7400 => write!(f, "S7-400"),
            StationType::NotImplemented => write!(f, "not implemented"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Station {
    pub name: String,
    pub station_type: StationType,
    /// Type code as written in the header
    pub type_code: String,
    pub data: ConfigData,
    racks: BTreeMap<u32, Rack>,
    subsystems: BTreeMap<u32, Subsystem>,
    subsystem_racks: Vec<SubsystemRack>,
}

/// Borrowed view of a bus node, produced from a `NodeRef`
#[derive(Debug, Clone, Copy)]
pub enum NodeView<'a> {
    SlotModule(&'a SlotModule),
    SubSlotModule(&'a SubSlotModule),
    SubsystemRack(&'a SubsystemRack),
    SubsystemRackSlotModule(&'a SubsystemRackSlotModule),
}

impl NodeView<'_> {
    /// Display name of the node
    pub fn name(&self) -> &str {
        match self {
            NodeView::SlotModule(module) => &module.ident.name,
            NodeView::SubSlotModule(module) => &module.ident.name,
            NodeView::SubsystemRack(rack) => &rack.ident.name,
            NodeView::SubsystemRackSlotModule(module) => &module.ident.name,
        }
    }

    pub fn order_number(&self) -> &str {
        match self {
            NodeView::SlotModule(module) => &module.ident.order_number,
            NodeView::SubSlotModule(module) => &module.ident.order_number,
            NodeView::SubsystemRack(rack) => &rack.ident.order_number,
            NodeView::SubsystemRackSlotModule(module) => &module.ident.order_number,
        }
    }
}

/// Element counts of a station graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StationSummary {
    pub racks: usize,
    pub modules: usize,
    pub subsystems: usize,
    pub subsystem_racks: usize,
    pub bus_nodes: usize,
}

impl Station {
    pub fn new(name: &str, type_code: &str, data: ConfigData) -> Self {
        Self {
            name: name.to_string(),
            station_type: StationType::from_code(type_code),
            type_code: type_code.to_string(),
            data,
            racks: BTreeMap::new(),
            subsystems: BTreeMap::new(),
            subsystem_racks: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    pub fn insert_rack(&mut self, rack: Rack) -> Result<(), InsertError> {
        insert_unique(&mut self.racks, rack.number, rack)
    }

    pub fn insert_subsystem(&mut self, subsystem: Subsystem) -> Result<(), InsertError> {
        insert_unique(&mut self.subsystems, subsystem.number, subsystem)
    }

    /// Add a bus-hosted rack; `(subsystem, address)` must be unique
    pub fn insert_subsystem_rack(&mut self, rack: SubsystemRack) -> Result<(), InsertError> {
        if self.subsystem_rack(rack.subsystem(), rack.address()).is_some() {
            return Err(InsertError::Occupied {
                position: rack.address(),
            });
        }
        self.subsystem_racks.push(rack);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn racks(&self) -> &BTreeMap<u32, Rack> {
        &self.racks
    }

    pub fn rack(&self, number: u32) -> Option<&Rack> {
        self.racks.get(&number)
    }

    pub fn rack_mut(&mut self, number: u32) -> Option<&mut Rack> {
        self.racks.get_mut(&number)
    }

    pub fn subsystems(&self) -> &BTreeMap<u32, Subsystem> {
        &self.subsystems
    }

    pub fn subsystem(&self, number: u32) -> Option<&Subsystem> {
        self.subsystems.get(&number)
    }

    pub fn subsystem_mut(&mut self, number: u32) -> Option<&mut Subsystem> {
        self.subsystems.get_mut(&number)
    }

    /// Bus-hosted racks in declaration order
    pub fn subsystem_racks(&self) -> &[SubsystemRack] {
        &self.subsystem_racks
    }

    pub fn subsystem_rack(&self, subsystem: u32, address: u32) -> Option<&SubsystemRack> {
        self.subsystem_racks
            .iter()
            .find(|rack| rack.subsystem() == subsystem && rack.address() == address)
    }

    pub fn subsystem_rack_mut(
        &mut self,
        subsystem: u32,
        address: u32,
    ) -> Option<&mut SubsystemRack> {
        self.subsystem_racks
            .iter_mut()
            .find(|rack| rack.subsystem() == subsystem && rack.address() == address)
    }

    pub fn slot_module(&self, rack: u32, slot: u32) -> Option<&SlotModule> {
        self.rack(rack)?.slots.get(&slot)
    }

    pub fn slot_module_mut(&mut self, rack: u32, slot: u32) -> Option<&mut SlotModule> {
        self.rack_mut(rack)?.slots.get_mut(&slot)
    }

    pub fn subsystem_rack_slot_module(
        &self,
        subsystem: u32,
        address: u32,
        slot: u32,
    ) -> Option<&SubsystemRackSlotModule> {
        self.subsystem_rack(subsystem, address)?.slots.get(&slot)
    }

    pub fn subsystem_rack_slot_module_mut(
        &mut self,
        subsystem: u32,
        address: u32,
        slot: u32,
    ) -> Option<&mut SubsystemRackSlotModule> {
        self.subsystem_rack_mut(subsystem, address)?
            .slots
            .get_mut(&slot)
    }

    /// Follow an index path to the node it names
    pub fn node(&self, node: NodeRef) -> Option<NodeView<'_>> {
        match node {
            NodeRef::SlotModule { rack, slot } => {
                self.slot_module(rack, slot).map(NodeView::SlotModule)
            }
            NodeRef::SubSlotModule {
                rack,
                slot,
                subslot,
            } => self
                .slot_module(rack, slot)?
                .subslots
                .get(&subslot)
                .map(NodeView::SubSlotModule),
            NodeRef::SubsystemRack { subsystem, address } => self
                .subsystem_rack(subsystem, address)
                .map(NodeView::SubsystemRack),
            NodeRef::SubsystemRackSlotModule {
                subsystem,
                address,
                slot,
            } => self
                .subsystem_rack_slot_module(subsystem, address, slot)
                .map(NodeView::SubsystemRackSlotModule),
            NodeRef::SubsystemRackSubSlotModule {
                subsystem,
                address,
                slot,
                subslot,
            } => self
                .subsystem_rack_slot_module(subsystem, address, slot)?
                .subslots
                .get(&subslot)
                .map(NodeView::SubSlotModule),
        }
    }

    /// Node attached to `subsystem` at bus `address`
    pub fn resolve_node(&self, subsystem: u32, address: u32) -> Option<NodeView<'_>> {
        let node = self.subsystem(subsystem)?.node(address)?;
        self.node(node)
    }

    pub fn summary(&self) -> StationSummary {
        let rack_modules: usize = self
            .racks
            .values()
            .flat_map(|rack| rack.slots.values())
            .map(|module| 1 + module.subslots.len())
            .sum();
        let hosted_modules: usize = self
            .subsystem_racks
            .iter()
            .flat_map(|rack| rack.slots.values())
            .map(|module| 1 + module.subslots.len())
            .sum();

        StationSummary {
            racks: self.racks.len(),
            modules: rack_modules + hosted_modules,
            subsystems: self.subsystems.len(),
            subsystem_racks: self.subsystem_racks.len(),
            bus_nodes: self.subsystems.values().map(Subsystem::node_count).sum(),
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Station '{}' ({})", self.name, self.station_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{BusKind, ModuleIdent};
    use crate::model::module::Module;
    use assert_matches::assert_matches;

    fn ident(name: &str) -> ModuleIdent {
        ModuleIdent {
            order_number: format!("ORDER-{}", name),
            version: None,
            name: name.to_string(),
        }
    }

    fn station() -> Station {
        let mut station = Station::new("SIMATIC 300(1)", "S7300", ConfigData::default());
        let mut rack = Rack::new(0, "6ES7 390-1???0-0AA0", "UR", ConfigData::default());
        rack.insert_module(4, SlotModule::new(4, ident("CP"), ConfigData::default()))
            .unwrap();
        station.insert_rack(rack).unwrap();
        station
            .insert_subsystem(Subsystem::new(BusKind::Dp, 1, "PROFIBUS(1)", ConfigData::default()))
            .unwrap();
        station
    }

    #[test]
    fn test_station_type_codes() {
        assert_eq!(StationType::from_code("S7300"), StationType::S7300);
        assert_eq!(StationType::from_code("S7400"), StationType::S7400);
        assert_eq!(StationType::from_code("S71500"), StationType::NotImplemented);
    }

    #[test]
    fn test_resolve_node_returns_owned_module() {
        let mut station = station();
        station
            .subsystem_mut(1)
            .unwrap()
            .attach_node(2, NodeRef::SlotModule { rack: 0, slot: 4 })
            .unwrap();

        let Some(NodeView::SlotModule(module)) = station.resolve_node(1, 2) else {
            panic!("expected slot module at address 2");
        };
        assert!(std::ptr::eq(module, station.slot_module(0, 4).unwrap()));
        assert!(station.resolve_node(1, 3).is_none());
        assert!(station.resolve_node(9, 2).is_none());
    }

    #[test]
    fn test_duplicate_rack_and_subsystem_rack() {
        let mut station = station();
        assert_matches!(
            station.insert_rack(Rack::new(0, "X", "Y", ConfigData::default())),
            Err(InsertError::Occupied { position: 0 })
        );

        let hosted = SubsystemRack::new(BusKind::Dp, 1, 3, ident("IM153"), ConfigData::default());
        station.insert_subsystem_rack(hosted.clone()).unwrap();
        assert_matches!(
            station.insert_subsystem_rack(hosted),
            Err(InsertError::Occupied { position: 3 })
        );
    }

    #[test]
    fn test_summary() {
        let mut station = station();
        let mut hosted =
            SubsystemRack::new(BusKind::Dp, 1, 3, ident("IM153"), ConfigData::default());
        hosted
            .insert_module(4, SubsystemRackSlotModule::new(4, ident("DI32"), ConfigData::default()))
            .unwrap();
        station.insert_subsystem_rack(hosted).unwrap();
        station
            .subsystem_mut(1)
            .unwrap()
            .attach_node(3, NodeRef::SubsystemRack { subsystem: 1, address: 3 })
            .unwrap();

        let summary = station.summary();
        assert_eq!(summary.racks, 1);
        assert_eq!(summary.modules, 2);
        assert_eq!(summary.subsystems, 1);
        assert_eq!(summary.subsystem_racks, 1);
        assert_eq!(summary.bus_nodes, 1);
        assert_eq!(station.to_string(), "Station 'SIMATIC 300(1)' (S7-300)");
    }
}
