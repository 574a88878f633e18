//! Section classification
//!
//! Every section is classified exactly once from its title line. The full
//! header grammars are tried first in priority order. A title that matches
//! none of them but still has the keyword shape of a known role keeps that
//! role, so the resolver reports the malformed header instead of silently
//! skipping it. Anything else is `Unknown` and ignored.

pub mod role;

pub use role::{ResolutionPass, SectionRole};

use crate::cfgfile::RawSection;
use crate::grammar::keywords::{RACK, SLOT, STATION, SUBSLOT};
use crate::grammar::{cached, BusKind, Grammar};
use crate::logging::codes;
use crate::log_success;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

static SHAPE: OnceLock<Regex> = OnceLock::new();

fn shape_regex() -> &'static Regex {
    let subsystem = BusKind::ALL.map(|kind| kind.subsystem_keyword()).join("|");
    let address = BusKind::ALL.map(|kind| kind.address_keyword()).join("|");
    cached(
        &SHAPE,
        &format!(
            r"^(?P<keyword>{STATION}|{RACK}|{subsystem})\s+\w+\s*(?:,\s*(?P<address>{address})\s+\d+\s*)?(?:,\s*(?P<slot>{SLOT})\s+\d+\s*)?(?:,\s*(?P<subslot>{SUBSLOT})\s+\d+)?.*$"
        ),
    )
}

/// Role from keyword and qualifier presence alone
fn classify_shape(title: &str) -> SectionRole {
    let Some(caps) = shape_regex().captures(title) else {
        return SectionRole::Unknown;
    };

    let keyword = caps.name("keyword").map(|m| m.as_str()).unwrap_or_default();
    let address = caps.name("address").map(|m| m.as_str());
    let slot = caps.name("slot").is_some();
    let subslot = caps.name("subslot").is_some();

    match (keyword, address, slot, subslot) {
        (STATION, None, false, false) => SectionRole::Station,
        (RACK, None, false, false) => SectionRole::Rack,
        (RACK, None, true, false) => SectionRole::RackSlot,
        (RACK, None, true, true) => SectionRole::RackSlotSubslot,
        (subsystem, address, slot, subslot) => {
            let Some(kind) = BusKind::from_subsystem_keyword(subsystem) else {
                return SectionRole::Unknown;
            };
            match (address.and_then(BusKind::from_address_keyword), slot, subslot) {
                (None, false, false) if address.is_none() => SectionRole::BusSubsystem(kind),
                (Some(a), false, false) if a == kind => SectionRole::BusSubsystemAddress(kind),
                (Some(a), true, false) if a == kind => SectionRole::BusSubsystemAddressSlot(kind),
                (Some(a), true, true) if a == kind => {
                    SectionRole::BusSubsystemAddressSlotSubslot(kind)
                }
                _ => SectionRole::Unknown,
            }
        }
    }
}

/// Classify a section by its title line. Pure and total.
pub fn classify(section: &RawSection) -> SectionRole {
    classify_title(section.title())
}

pub fn classify_title(title: &str) -> SectionRole {
    match Grammar::detect(title) {
        Some(grammar) => SectionRole::from(grammar),
        None => classify_shape(title.trim()),
    }
}

/// A section with its immutable role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedSection {
    role: SectionRole,
    pub section: RawSection,
}

impl ClassifiedSection {
    pub fn new(section: RawSection) -> Self {
        Self {
            role: classify(&section),
            section,
        }
    }

    pub fn role(&self) -> SectionRole {
        self.role
    }
}

/// Classified sections grouped by the pass that consumes them.
///
/// Each pass drains its own bucket; source order is kept within a bucket.
#[derive(Debug, Default)]
pub struct SectionBuckets {
    buckets: BTreeMap<ResolutionPass, Vec<ClassifiedSection>>,
    unknown: Vec<RawSection>,
}

impl SectionBuckets {
    pub fn from_sections(sections: Vec<RawSection>) -> Self {
        let mut buckets = Self::default();

        for section in sections {
            let classified = ClassifiedSection::new(section);
            match classified.role().pass() {
                Some(pass) => buckets.buckets.entry(pass).or_default().push(classified),
                None => buckets.unknown.push(classified.section),
            }
        }

        log_success!(
            codes::success::CLASSIFICATION_COMPLETE,
            "Sections classified",
            "classified" => buckets.pending_count(),
            "unknown" => buckets.unknown.len()
        );

        buckets
    }

    /// Remove and return every section consumed by `pass`
    pub fn take(&mut self, pass: ResolutionPass) -> Vec<ClassifiedSection> {
        self.buckets.remove(&pass).unwrap_or_default()
    }

    pub fn count(&self, pass: ResolutionPass) -> usize {
        self.buckets.get(&pass).map_or(0, Vec::len)
    }

    /// Sections not yet taken by any pass
    pub fn pending_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn unknown(&self) -> &[RawSection] {
        &self.unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::Span;

    fn titled(title: &str) -> RawSection {
        RawSection::new(vec![title.to_string()], Vec::new(), Span::default())
    }

    #[test]
    fn test_all_twelve_shapes_classify() {
        let cases = [
            (r#"STATION S7400 , "SIMATIC 400(1)""#, SectionRole::Station),
            (r#"RACK 0, "6ES7 400-1JA01-0AA0", "UR2""#, SectionRole::Rack),
            (r#"RACK 0, SLOT 3, "6ES7 414-3EM05-0AB0" "V5.1", "CPU 414-3 PN/DP""#, SectionRole::RackSlot),
            (r#"RACK 0, SLOT 3, SUBSLOT 2, "", "DP""#, SectionRole::RackSlotSubslot),
            (r#"DPSUBSYSTEM 1, "PROFIBUS(1)""#, SectionRole::BusSubsystem(BusKind::Dp)),
            (r#"DPSUBSYSTEM 1, DPADDRESS 3, "6ES7 153-1AA03-0XB0", "IM153-1""#, SectionRole::BusSubsystemAddress(BusKind::Dp)),
            (r#"DPSUBSYSTEM 1, DPADDRESS 3, SLOT 4, "6ES7 321-1BL00-0AA0", "DI32xDC24V""#, SectionRole::BusSubsystemAddressSlot(BusKind::Dp)),
            (r#"DPSUBSYSTEM 1, DPADDRESS 3, SLOT 4, SUBSLOT 1, "X", "Y""#, SectionRole::BusSubsystemAddressSlotSubslot(BusKind::Dp)),
            (r#"IOSUBSYSTEM 100, "Ethernet(1)""#, SectionRole::BusSubsystem(BusKind::Io)),
            (r#"IOSUBSYSTEM 100, IOADDRESS 1, "6ES7 151-3BA23-0AB0" "V7.0", "IM151-3PN""#, SectionRole::BusSubsystemAddress(BusKind::Io)),
            (r#"IOSUBSYSTEM 100, IOADDRESS 1, SLOT 1, "6ES7 138-4CA01-0AA0", "PM-E DC24V""#, SectionRole::BusSubsystemAddressSlot(BusKind::Io)),
            (r#"IOSUBSYSTEM 100, IOADDRESS 1, SLOT 0, SUBSLOT 1, "X" "V7.0", "PN-IO""#, SectionRole::BusSubsystemAddressSlotSubslot(BusKind::Io)),
        ];

        for (title, expected) in cases {
            assert_eq!(classify(&titled(title)), expected, "{}", title);
        }
    }

    #[test]
    fn test_unrecognized_header_is_unknown() {
        assert_eq!(classify_title(r#"FOO 1, "x""#), SectionRole::Unknown);
        assert_eq!(classify_title(""), SectionRole::Unknown);
        assert_eq!(classify_title(r#"RACK 0, DPADDRESS 2, "x", "y""#), SectionRole::Unknown);
        assert_eq!(
            classify_title(r#"DPSUBSYSTEM 1, IOADDRESS 2, "x", "y""#),
            SectionRole::Unknown
        );
    }

    #[test]
    fn test_malformed_header_keeps_shape_role() {
        assert_eq!(classify_title("RACK 0, SLOT 4, missing quotes"), SectionRole::RackSlot);
        assert_eq!(
            classify_title("DPSUBSYSTEM 1, DPADDRESS 3"),
            SectionRole::BusSubsystemAddress(BusKind::Dp)
        );
    }

    #[test]
    fn test_classification_is_stable() {
        let section = titled(r#"RACK 0, SLOT 4, "X", "Y""#);
        let first = classify(&section);
        for _ in 0..3 {
            assert_eq!(classify(&section), first);
        }
    }

    #[test]
    fn test_buckets_drain_per_pass() {
        let mut buckets = SectionBuckets::from_sections(vec![
            titled(r#"RACK 0, SLOT 2, "A", "B""#),
            titled(r#"FOO 1, "x""#),
            titled(r#"RACK 0, "A", "B""#),
            titled(r#"RACK 0, SLOT 3, "A", "C""#),
        ]);

        assert_eq!(buckets.unknown().len(), 1);
        assert_eq!(buckets.count(ResolutionPass::RackSlot), 2);
        assert_eq!(buckets.pending_count(), 3);

        let slots = buckets.take(ResolutionPass::RackSlot);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].section.title(), r#"RACK 0, SLOT 2, "A", "B""#);
        assert!(buckets.take(ResolutionPass::RackSlot).is_empty());
        assert_eq!(buckets.pending_count(), 1);
    }
}
