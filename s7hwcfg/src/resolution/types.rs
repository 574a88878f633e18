//! Resolution result, diagnostics and statistics

use crate::classification::ResolutionPass;
use crate::config::compile_time::resolution::MAX_DIAGNOSTICS;
use crate::logging::codes::{self, Code};
use crate::model::{NodeRef, Station};
use crate::utils::Span;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A fully resolved station with everything observed on the way
#[derive(Debug, Clone, Serialize)]
pub struct Resolution {
    pub station: Station,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ResolutionStats,
}

impl Resolution {
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Recoverable inconsistency found during resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub code: Code,
    pub message: String,
    /// Header line of the section that triggered it, empty for the limit marker
    pub header: String,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DiagnosticKind {
    /// Bus declaration names a subsystem that was never declared
    DanglingSubsystemReference { subsystem: u32, address: u32 },
    /// Bus address already holds another node
    BusAddressOccupied {
        subsystem: u32,
        address: u32,
        occupant: NodeRef,
    },
    /// Further diagnostics were counted but not recorded
    DiagnosticLimitReached { limit: usize },
}

impl Diagnostic {
    pub fn dangling_subsystem(subsystem: u32, address: u32, header: &str, span: Span) -> Self {
        Self {
            kind: DiagnosticKind::DanglingSubsystemReference { subsystem, address },
            code: codes::resolution::DANGLING_SUBSYSTEM_REFERENCE,
            message: format!(
                "Subsystem {} is not declared; module kept without bus membership at address {}",
                subsystem, address
            ),
            header: header.to_string(),
            span: Some(span),
        }
    }

    pub fn address_occupied(
        subsystem: u32,
        address: u32,
        occupant: NodeRef,
        header: &str,
        span: Span,
    ) -> Self {
        Self {
            kind: DiagnosticKind::BusAddressOccupied {
                subsystem,
                address,
                occupant,
            },
            code: codes::resolution::BUS_ADDRESS_OCCUPIED,
            message: format!(
                "Address {} of subsystem {} is already held by {}",
                address, subsystem, occupant
            ),
            header: header.to_string(),
            span: Some(span),
        }
    }

    pub fn limit_reached(limit: usize) -> Self {
        Self {
            kind: DiagnosticKind::DiagnosticLimitReached { limit },
            code: codes::resolution::DIAGNOSTIC_LIMIT_REACHED,
            message: format!("Diagnostic limit of {} reached; further ones are counted only", limit),
            header: String::new(),
            span: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning[{}]: {}", self.code, self.message)?;
        if let Some(span) = self.span {
            write!(f, "\n  --> {}: {}", span, self.header)?;
        }
        Ok(())
    }
}

/// Counters collected while resolving
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub sections_per_pass: BTreeMap<ResolutionPass, usize>,
    pub unknown_sections: usize,
    pub memberships_attached: usize,
    pub memberships_dropped: usize,
    /// Diagnostics beyond the cap, counted but not stored
    pub suppressed_diagnostics: usize,
}

impl ResolutionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_pass(&mut self, pass: ResolutionPass, sections: usize) {
        self.sections_per_pass.insert(pass, sections);
    }

    pub fn sections_consumed(&self) -> usize {
        self.sections_per_pass.values().sum()
    }

    pub fn sections_in(&self, pass: ResolutionPass) -> usize {
        self.sections_per_pass.get(&pass).copied().unwrap_or(0)
    }

    pub fn summary(&self) -> String {
        format!(
            "{} sections resolved, {} unknown ignored, {} bus memberships attached, {} dropped",
            self.sections_consumed(),
            self.unknown_sections,
            self.memberships_attached,
            self.memberships_dropped
        )
    }
}

/// Push a diagnostic respecting the compile-time cap.
///
/// The first diagnostic over the cap is replaced by a single limit marker;
/// everything after that is only counted.
pub(crate) fn push_diagnostic(
    diagnostics: &mut Vec<Diagnostic>,
    stats: &mut ResolutionStats,
    diagnostic: Diagnostic,
) {
    push_capped(diagnostics, stats, diagnostic, MAX_DIAGNOSTICS);
}

fn push_capped(
    diagnostics: &mut Vec<Diagnostic>,
    stats: &mut ResolutionStats,
    diagnostic: Diagnostic,
    limit: usize,
) {
    if diagnostics.len() < limit {
        diagnostics.push(diagnostic);
        return;
    }
    if diagnostics.len() == limit {
        diagnostics.push(Diagnostic::limit_reached(limit));
    }
    stats.suppressed_diagnostics += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_diagnostic_display_points_at_header() {
        let diagnostic = Diagnostic::dangling_subsystem(
            1,
            2,
            r#"RACK 0, SLOT 4, "X", "Y""#,
            Span::lines(12, 18),
        );
        let rendered = diagnostic.to_string();

        assert!(rendered.starts_with("warning[W100]"));
        assert!(rendered.contains("lines 12-18"));
        assert!(rendered.contains(r#"RACK 0, SLOT 4, "X", "Y""#));
    }

    #[test]
    fn test_cap_adds_single_marker() {
        let mut diagnostics = Vec::new();
        let mut stats = ResolutionStats::new();

        for address in 0..5 {
            push_capped(
                &mut diagnostics,
                &mut stats,
                Diagnostic::dangling_subsystem(9, address, "", Span::default()),
                2,
            );
        }

        assert_eq!(diagnostics.len(), 3);
        assert_matches!(
            diagnostics[2].kind,
            DiagnosticKind::DiagnosticLimitReached { limit: 2 }
        );
        assert_eq!(stats.suppressed_diagnostics, 3);
    }

    #[test]
    fn test_stats_summary() {
        let mut stats = ResolutionStats::new();
        stats.record_pass(ResolutionPass::Station, 1);
        stats.record_pass(ResolutionPass::RackSlot, 3);
        stats.unknown_sections = 2;
        stats.memberships_attached = 1;

        assert_eq!(stats.sections_consumed(), 4);
        assert_eq!(stats.sections_in(ResolutionPass::Rack), 0);
        assert_eq!(
            stats.summary(),
            "4 sections resolved, 2 unknown ignored, 1 bus memberships attached, 0 dropped"
        );
    }
}
