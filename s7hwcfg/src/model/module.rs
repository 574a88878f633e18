//! Slot modules and the hosting capability
//!
//! Racks and modules form a strict ownership tree. Every node that can hold
//! children implements `Module`; the sub-slot leaf implements it as well but
//! rejects every insertion.

use super::subsystem::SubsystemMembership;
use crate::config_data::ConfigData;
use crate::grammar::ModuleIdent;
use serde::Serialize;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Child insertion failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InsertError {
    #[error("position {position} is already occupied")]
    Occupied { position: u32 },

    #[error("{host} cannot hold further modules")]
    Terminal { host: &'static str },
}

/// Capability of hosting child modules by slot number
pub trait Module {
    type Child;

    fn kind_name(&self) -> &'static str;

    fn insert_module(&mut self, slot: u32, child: Self::Child) -> Result<(), InsertError>;

    fn module(&self, slot: u32) -> Option<&Self::Child>;

    fn module_mut(&mut self, slot: u32) -> Option<&mut Self::Child>;

    fn module_count(&self) -> usize;
}

/// Insert keeping the first occupant
pub(crate) fn insert_unique<T>(
    map: &mut BTreeMap<u32, T>,
    position: u32,
    value: T,
) -> Result<(), InsertError> {
    match map.entry(position) {
        Entry::Vacant(entry) => {
            entry.insert(value);
            Ok(())
        }
        Entry::Occupied(_) => Err(InsertError::Occupied { position }),
    }
}

macro_rules! impl_module_host {
    ($host:ty, $child:ty, $field:ident, $name:literal) => {
        impl $crate::model::module::Module for $host {
            type Child = $child;

            fn kind_name(&self) -> &'static str {
                $name
            }

            fn insert_module(
                &mut self,
                slot: u32,
                child: $child,
            ) -> Result<(), $crate::model::module::InsertError> {
                $crate::model::module::insert_unique(&mut self.$field, slot, child)
            }

            fn module(&self, slot: u32) -> Option<&$child> {
                self.$field.get(&slot)
            }

            fn module_mut(&mut self, slot: u32) -> Option<&mut $child> {
                self.$field.get_mut(&slot)
            }

            fn module_count(&self) -> usize {
                self.$field.len()
            }
        }
    };
}

pub(crate) use impl_module_host;

/// Module plugged into a station rack slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotModule {
    pub slot: u32,
    pub ident: ModuleIdent,
    pub data: ConfigData,
    pub membership: Option<SubsystemMembership>,
    pub subslots: BTreeMap<u32, SubSlotModule>,
}

impl SlotModule {
    pub fn new(slot: u32, ident: ModuleIdent, data: ConfigData) -> Self {
        Self {
            slot,
            ident,
            data,
            membership: None,
            subslots: BTreeMap::new(),
        }
    }
}

impl_module_host!(SlotModule, SubSlotModule, subslots, "slot module");

/// Module plugged into a sub-slot; terminal in the hierarchy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubSlotModule {
    pub subslot: u32,
    pub ident: ModuleIdent,
    pub data: ConfigData,
    pub membership: Option<SubsystemMembership>,
}

impl SubSlotModule {
    pub fn new(subslot: u32, ident: ModuleIdent, data: ConfigData) -> Self {
        Self {
            subslot,
            ident,
            data,
            membership: None,
        }
    }
}

impl Module for SubSlotModule {
    type Child = SubSlotModule;

    fn kind_name(&self) -> &'static str {
        "sub-slot module"
    }

    fn insert_module(&mut self, _slot: u32, _child: SubSlotModule) -> Result<(), InsertError> {
        Err(InsertError::Terminal {
            host: self.kind_name(),
        })
    }

    fn module(&self, _slot: u32) -> Option<&SubSlotModule> {
        None
    }

    fn module_mut(&mut self, _slot: u32) -> Option<&mut SubSlotModule> {
        None
    }

    fn module_count(&self) -> usize {
        0
    }
}

/// Module plugged into a slot of a bus-hosted rack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubsystemRackSlotModule {
    pub slot: u32,
    pub ident: ModuleIdent,
    pub data: ConfigData,
    /// Bus this module masters or controls, distinct from its host bus
    pub membership: Option<SubsystemMembership>,
    pub subslots: BTreeMap<u32, SubSlotModule>,
}

impl SubsystemRackSlotModule {
    pub fn new(slot: u32, ident: ModuleIdent, data: ConfigData) -> Self {
        Self {
            slot,
            ident,
            data,
            membership: None,
            subslots: BTreeMap::new(),
        }
    }
}

impl_module_host!(
    SubsystemRackSlotModule,
    SubSlotModule,
    subslots,
    "subsystem rack slot module"
);

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn ident(name: &str) -> ModuleIdent {
        ModuleIdent {
            order_number: "6ES7 000-0AA00-0AA0".to_string(),
            version: None,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_slot_module_hosts_subslots() {
        let mut module = SlotModule::new(2, ident("CPU"), ConfigData::default());
        module
            .insert_module(1, SubSlotModule::new(1, ident("MPI/DP"), ConfigData::default()))
            .unwrap();

        assert_eq!(module.module_count(), 1);
        assert_eq!(module.module(1).map(|m| m.ident.name.as_str()), Some("MPI/DP"));
        assert!(module.module(2).is_none());
    }

    #[test]
    fn test_duplicate_subslot_is_rejected() {
        let mut module = SlotModule::new(2, ident("CPU"), ConfigData::default());
        let child = SubSlotModule::new(1, ident("X1"), ConfigData::default());
        module.insert_module(1, child.clone()).unwrap();

        assert_matches!(
            module.insert_module(1, child),
            Err(InsertError::Occupied { position: 1 })
        );
        assert_eq!(module.module(1).map(|m| m.ident.name.as_str()), Some("X1"));
    }

    #[test]
    fn test_leaf_rejects_insertion() {
        let mut leaf = SubSlotModule::new(1, ident("X1"), ConfigData::default());
        let result = leaf.insert_module(1, SubSlotModule::new(1, ident("X2"), ConfigData::default()));

        assert_matches!(result, Err(InsertError::Terminal { .. }));
        assert_eq!(leaf.module_count(), 0);
        assert!(leaf.module(1).is_none());
    }
}
