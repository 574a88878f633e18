//! The ordered resolution passes
//!
//! Every pass drains one role bucket. Passes only look up tables filled by
//! earlier passes, never the other way round.

use super::error::{ResolutionResult, SectionFormatError};
use super::types::{push_diagnostic, Diagnostic, ResolutionStats};
use crate::cfgfile::{FileFormatError, RawSection};
use crate::classification::{ClassifiedSection, ResolutionPass, SectionRole};
use crate::config::runtime::ResolutionPreferences;
use crate::config_data::{parse_config_data, ConfigData};
use crate::grammar::{
    parse_bus_declaration, BusKind, HeaderError, RackHeader, RackSlotHeader,
    RackSlotSubslotHeader, StationHeader, SubsystemAddressHeader, SubsystemAddressSlotHeader,
    SubsystemAddressSlotSubslotHeader, SubsystemHeader,
};
use crate::model::{
    BusRole, Module, NodeRef, Rack, SlotModule, Station, SubSlotModule, Subsystem,
    SubsystemMembership, SubsystemRack, SubsystemRackSlotModule,
};
use crate::{log_debug, log_warning};

fn header_error(error: HeaderError, role: SectionRole, section: &RawSection) -> SectionFormatError {
    match error {
        HeaderError::Mismatch { .. } => {
            SectionFormatError::header_mismatch(role, section.title(), section.span)
        }
        HeaderError::InvalidNumber { field, value } => {
            SectionFormatError::invalid_number(field, &value, section.title(), section.span)
        }
    }
}

fn parse_body(section: &RawSection) -> Result<ConfigData, SectionFormatError> {
    parse_config_data(&section.body)
        .map_err(|error| SectionFormatError::malformed_body(error, section.title(), section.span))
}

/// Pass 1: exactly one station section builds the root
pub(crate) fn resolve_station(sections: Vec<ClassifiedSection>) -> ResolutionResult<Station> {
    let count = sections.len();
    let Some(classified) = sections.into_iter().next() else {
        return Err(FileFormatError::MissingStationSection.into());
    };
    let section = &classified.section;
    if count > 1 {
        return Err(FileFormatError::MultipleStationSections {
            count,
            first: section.span,
        }
        .into());
    }

    let header = StationHeader::parse(section.title())
        .map_err(|error| header_error(error, SectionRole::Station, section))?;
    let data = parse_body(section)?;

    Ok(Station::new(&header.name, &header.type_code, data))
}

/// Passes 2 to 8 over a station produced by pass 1
pub(crate) struct Resolver<'a> {
    station: Station,
    diagnostics: Vec<Diagnostic>,
    stats: ResolutionStats,
    preferences: &'a ResolutionPreferences,
}

impl<'a> Resolver<'a> {
    pub fn new(station: Station, preferences: &'a ResolutionPreferences) -> Self {
        Self {
            station,
            diagnostics: Vec::new(),
            stats: ResolutionStats::new(),
            preferences,
        }
    }

    pub fn stats_mut(&mut self) -> &mut ResolutionStats {
        &mut self.stats
    }

    pub fn finish(self) -> (Station, Vec<Diagnostic>, ResolutionStats) {
        (self.station, self.diagnostics, self.stats)
    }

    /// Run one pass over its drained bucket
    pub fn run_pass(
        &mut self,
        pass: ResolutionPass,
        sections: Vec<ClassifiedSection>,
    ) -> Result<(), SectionFormatError> {
        self.stats.record_pass(pass, sections.len());

        for classified in &sections {
            if self.preferences.log_pass_details {
                log_debug!("Resolving section",
                    "pass" => pass,
                    "role" => classified.role(),
                    "span" => classified.section.span
                );
            }
            self.resolve_section(classified)?;
        }

        log_debug!("Resolution pass complete",
            "pass" => pass,
            "sections" => sections.len()
        );
        Ok(())
    }

    fn resolve_section(&mut self, classified: &ClassifiedSection) -> Result<(), SectionFormatError> {
        let section = &classified.section;
        match classified.role() {
            SectionRole::Rack => self.resolve_rack(section),
            SectionRole::BusSubsystem(kind) => self.resolve_subsystem(kind, section),
            SectionRole::RackSlot => self.resolve_rack_slot(section),
            SectionRole::RackSlotSubslot => self.resolve_rack_slot_subslot(section),
            SectionRole::BusSubsystemAddress(kind) => self.resolve_subsystem_rack(kind, section),
            SectionRole::BusSubsystemAddressSlot(kind) => {
                self.resolve_subsystem_rack_slot(kind, section)
            }
            SectionRole::BusSubsystemAddressSlotSubslot(kind) => {
                self.resolve_subsystem_rack_subslot(kind, section)
            }
            // consumed before the resolver exists, or never bucketed
            SectionRole::Station | SectionRole::Unknown => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Passes 2 and 3: lookup tables
    // ------------------------------------------------------------------

    fn resolve_rack(&mut self, section: &RawSection) -> Result<(), SectionFormatError> {
        let header = RackHeader::parse(section.title())
            .map_err(|error| header_error(error, SectionRole::Rack, section))?;
        let data = parse_body(section)?;

        self.station
            .insert_rack(Rack::new(header.rack, &header.order_number, &header.name, data))
            .map_err(|_| {
                SectionFormatError::duplicate_key(
                    &format!("rack {}", header.rack),
                    section.title(),
                    section.span,
                )
            })
    }

    fn resolve_subsystem(&mut self, kind: BusKind, section: &RawSection) -> Result<(), SectionFormatError> {
        let header = SubsystemHeader::parse(kind, section.title())
            .map_err(|error| header_error(error, SectionRole::BusSubsystem(kind), section))?;
        let data = parse_body(section)?;

        self.station
            .insert_subsystem(Subsystem::new(kind, header.subsystem, &header.name, data))
            .map_err(|_| {
                SectionFormatError::duplicate_key(
                    &format!("subsystem {}", header.subsystem),
                    section.title(),
                    section.span,
                )
            })
    }

    // ------------------------------------------------------------------
    // Passes 4 and 5: station rack modules
    // ------------------------------------------------------------------

    fn resolve_rack_slot(&mut self, section: &RawSection) -> Result<(), SectionFormatError> {
        let header = RackSlotHeader::parse(section.title())
            .map_err(|error| header_error(error, SectionRole::RackSlot, section))?;
        let data = parse_body(section)?;

        let missing = || SectionFormatError::UnknownRack {
            rack: header.rack,
            header: section.title().to_string(),
            span: section.span,
        };
        if self.station.rack(header.rack).is_none() {
            return Err(missing());
        }

        let mut module = SlotModule::new(header.slot, header.ident, data);
        module.membership = self.bus_membership(SectionRole::RackSlot, section)?;
        let membership = module.membership;

        let rack = self.station.rack_mut(header.rack).ok_or_else(missing)?;
        rack.insert_module(header.slot, module).map_err(|_| {
            SectionFormatError::duplicate_key(
                &format!("slot {} of rack {}", header.slot, header.rack),
                section.title(),
                section.span,
            )
        })?;

        self.link_membership(
            membership,
            NodeRef::SlotModule {
                rack: header.rack,
                slot: header.slot,
            },
        );
        Ok(())
    }

    fn resolve_rack_slot_subslot(&mut self, section: &RawSection) -> Result<(), SectionFormatError> {
        let header = RackSlotSubslotHeader::parse(section.title())
            .map_err(|error| header_error(error, SectionRole::RackSlotSubslot, section))?;
        let data = parse_body(section)?;

        let missing = || SectionFormatError::UnknownSlot {
            rack: header.rack,
            slot: header.slot,
            header: section.title().to_string(),
            span: section.span,
        };
        if self.station.slot_module(header.rack, header.slot).is_none() {
            return Err(missing());
        }

        let mut module = SubSlotModule::new(header.subslot, header.ident, data);
        module.membership = self.bus_membership(SectionRole::RackSlotSubslot, section)?;
        let membership = module.membership;

        let host = self
            .station
            .slot_module_mut(header.rack, header.slot)
            .ok_or_else(missing)?;
        host.insert_module(header.subslot, module).map_err(|_| {
            SectionFormatError::duplicate_key(
                &format!(
                    "sub-slot {} of rack {} slot {}",
                    header.subslot, header.rack, header.slot
                ),
                section.title(),
                section.span,
            )
        })?;

        self.link_membership(
            membership,
            NodeRef::SubSlotModule {
                rack: header.rack,
                slot: header.slot,
                subslot: header.subslot,
            },
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Passes 6 to 8: bus-hosted racks and their modules
    // ------------------------------------------------------------------

    fn resolve_subsystem_rack(&mut self, kind: BusKind, section: &RawSection) -> Result<(), SectionFormatError> {
        let header = SubsystemAddressHeader::parse(kind, section.title())
            .map_err(|error| header_error(error, SectionRole::BusSubsystemAddress(kind), section))?;
        let data = parse_body(section)?;

        if self.station.subsystem(header.subsystem).is_none() {
            return Err(SectionFormatError::UnknownSubsystem {
                subsystem: header.subsystem,
                header: section.title().to_string(),
                span: section.span,
            });
        }

        let rack = SubsystemRack::new(kind, header.subsystem, header.address, header.ident, data);
        self.station.insert_subsystem_rack(rack).map_err(|_| {
            SectionFormatError::duplicate_key(
                &format!(
                    "subsystem rack at subsystem {} address {}",
                    header.subsystem, header.address
                ),
                section.title(),
                section.span,
            )
        })?;

        let node = NodeRef::SubsystemRack {
            subsystem: header.subsystem,
            address: header.address,
        };
        let attached = match self.station.subsystem_mut(header.subsystem) {
            Some(subsystem) => subsystem.attach_node(header.address, node),
            None => return Ok(()),
        };
        match attached {
            Ok(()) => {
                self.stats.memberships_attached += 1;
                if let Some(rack) = self
                    .station
                    .subsystem_rack_mut(header.subsystem, header.address)
                {
                    rack.membership = Some(rack.bus_membership());
                }
            }
            Err(occupant) => {
                self.stats.memberships_dropped += 1;
                self.warn(Diagnostic::address_occupied(
                    header.subsystem,
                    header.address,
                    occupant,
                    section.title(),
                    section.span,
                ));
            }
        }
        Ok(())
    }

    fn resolve_subsystem_rack_slot(&mut self, kind: BusKind, section: &RawSection) -> Result<(), SectionFormatError> {
        let header = SubsystemAddressSlotHeader::parse(kind, section.title()).map_err(|error| {
            header_error(error, SectionRole::BusSubsystemAddressSlot(kind), section)
        })?;
        let data = parse_body(section)?;

        let missing = || SectionFormatError::UnknownSubsystemRack {
            subsystem: header.subsystem,
            address: header.address,
            header: section.title().to_string(),
            span: section.span,
        };
        if self
            .station
            .subsystem_rack(header.subsystem, header.address)
            .is_none()
        {
            return Err(missing());
        }

        let mut module = SubsystemRackSlotModule::new(header.slot, header.ident, data);
        module.membership =
            self.bus_membership(SectionRole::BusSubsystemAddressSlot(kind), section)?;
        let membership = module.membership;

        let rack = self
            .station
            .subsystem_rack_mut(header.subsystem, header.address)
            .ok_or_else(missing)?;
        rack.insert_module(header.slot, module).map_err(|_| {
            SectionFormatError::duplicate_key(
                &format!(
                    "slot {} at subsystem {} address {}",
                    header.slot, header.subsystem, header.address
                ),
                section.title(),
                section.span,
            )
        })?;

        self.link_membership(
            membership,
            NodeRef::SubsystemRackSlotModule {
                subsystem: header.subsystem,
                address: header.address,
                slot: header.slot,
            },
        );
        Ok(())
    }

    fn resolve_subsystem_rack_subslot(&mut self, kind: BusKind, section: &RawSection) -> Result<(), SectionFormatError> {
        let header =
            SubsystemAddressSlotSubslotHeader::parse(kind, section.title()).map_err(|error| {
                header_error(
                    error,
                    SectionRole::BusSubsystemAddressSlotSubslot(kind),
                    section,
                )
            })?;
        let data = parse_body(section)?;

        let missing = || SectionFormatError::UnknownSubsystemRackSlot {
            subsystem: header.subsystem,
            address: header.address,
            slot: header.slot,
            header: section.title().to_string(),
            span: section.span,
        };
        if self
            .station
            .subsystem_rack_slot_module(header.subsystem, header.address, header.slot)
            .is_none()
        {
            return Err(missing());
        }

        let mut module = SubSlotModule::new(header.subslot, header.ident, data);
        module.membership =
            self.bus_membership(SectionRole::BusSubsystemAddressSlotSubslot(kind), section)?;
        let membership = module.membership;

        let host = self
            .station
            .subsystem_rack_slot_module_mut(header.subsystem, header.address, header.slot)
            .ok_or_else(missing)?;
        host.insert_module(header.subslot, module).map_err(|_| {
            SectionFormatError::duplicate_key(
                &format!(
                    "sub-slot {} of slot {} at subsystem {} address {}",
                    header.subslot, header.slot, header.subsystem, header.address
                ),
                section.title(),
                section.span,
            )
        })?;

        self.link_membership(
            membership,
            NodeRef::SubsystemRackSubSlotModule {
                subsystem: header.subsystem,
                address: header.address,
                slot: header.slot,
                subslot: header.subslot,
            },
        );
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bus membership
    // ------------------------------------------------------------------

    /// Membership declared by the section's option lines, if it can be honoured.
    ///
    /// A missing subsystem or an occupied address is recorded as a
    /// diagnostic and the module is built without membership.
    fn bus_membership(
        &mut self,
        role: SectionRole,
        section: &RawSection,
    ) -> Result<Option<SubsystemMembership>, SectionFormatError> {
        let declaration = parse_bus_declaration(section.options())
            .map_err(|error| header_error(error, role, section))?;
        let Some(declaration) = declaration else {
            return Ok(None);
        };

        let occupant = match self.station.subsystem(declaration.subsystem) {
            None => {
                self.stats.memberships_dropped += 1;
                self.warn(Diagnostic::dangling_subsystem(
                    declaration.subsystem,
                    declaration.address,
                    section.title(),
                    section.span,
                ));
                return Ok(None);
            }
            Some(subsystem) => subsystem.node(declaration.address),
        };

        if let Some(occupant) = occupant {
            self.stats.memberships_dropped += 1;
            self.warn(Diagnostic::address_occupied(
                declaration.subsystem,
                declaration.address,
                occupant,
                section.title(),
                section.span,
            ));
            return Ok(None);
        }

        Ok(Some(SubsystemMembership {
            subsystem: declaration.subsystem,
            address: declaration.address,
            role: BusRole::active(declaration.kind),
        }))
    }

    /// Enter an inserted module into its subsystem's node table
    fn link_membership(&mut self, membership: Option<SubsystemMembership>, node: NodeRef) {
        let Some(membership) = membership else {
            return;
        };
        if let Some(subsystem) = self.station.subsystem_mut(membership.subsystem) {
            if subsystem.attach_node(membership.address, node).is_ok() {
                self.stats.memberships_attached += 1;
            }
        }
    }

    fn warn(&mut self, diagnostic: Diagnostic) {
        log_warning!(code = diagnostic.code, &diagnostic.message, span = diagnostic.span,
            "header" => &diagnostic.header
        );
        push_diagnostic(&mut self.diagnostics, &mut self.stats, diagnostic);
    }
}
