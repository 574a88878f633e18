//! Hardware object graph
//!
//! Ownership is a tree: the station owns racks, subsystems and bus-hosted
//! racks; racks own slot modules which own sub-slot modules. Links between a
//! subsystem and its nodes are index paths (`NodeRef`, `SubsystemMembership`)
//! resolved through the station.

pub mod address;
pub mod module;
pub mod rack;
pub mod station;
pub mod subsystem;

pub use address::{Address, AddressArea, AddressKind, AddressWidth};
pub use module::{InsertError, Module, SlotModule, SubSlotModule, SubsystemRackSlotModule};
pub use rack::{Rack, SubsystemRack};
pub use station::{NodeView, Station, StationSummary, StationType};
pub use subsystem::{BusRole, NodeRef, SubnetType, Subsystem, SubsystemMembership};
