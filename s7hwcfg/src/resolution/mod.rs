//! Hierarchical resolution of classified sections into a station graph
//!
//! Sections are classified once and bucketed by the pass that consumes
//! them. Passes then run in a fixed sequence, so a section's position in
//! the file never matters, only the pass its role belongs to.

pub mod error;
mod passes;
pub mod types;

pub use error::{ResolutionError, ResolutionResult, SectionFormatError};
pub use types::{Diagnostic, DiagnosticKind, Resolution, ResolutionStats};

use crate::cfgfile::RawSection;
use crate::classification::{ResolutionPass, SectionBuckets};
use crate::config::runtime::ResolutionPreferences;
use crate::logging::codes;
use crate::{log_debug, log_error, log_info, log_success};
use passes::Resolver;

/// Resolve sections into a station with default preferences
pub fn resolve(sections: Vec<RawSection>) -> ResolutionResult<Resolution> {
    resolve_with_preferences(sections, &ResolutionPreferences::default())
}

/// Resolve sections into a station
pub fn resolve_with_preferences(
    sections: Vec<RawSection>,
    preferences: &ResolutionPreferences,
) -> ResolutionResult<Resolution> {
    log_info!("Starting hierarchical resolution", "sections" => sections.len());

    match run_passes(sections, preferences) {
        Ok(resolution) => {
            log_success!(
                codes::success::RESOLUTION_COMPLETE,
                "Station resolved",
                "station" => &resolution.station.name,
                "sections" => resolution.stats.sections_consumed(),
                "memberships_attached" => resolution.stats.memberships_attached,
                "memberships_dropped" => resolution.stats.memberships_dropped,
                "diagnostics" => resolution.diagnostics.len()
            );
            Ok(resolution)
        }
        Err(error) => {
            match error.span() {
                Some(span) => log_error!(error.error_code(), &error.to_string(), span = span),
                None => log_error!(error.error_code(), &error.to_string()),
            }
            Err(error)
        }
    }
}

fn run_passes(
    sections: Vec<RawSection>,
    preferences: &ResolutionPreferences,
) -> ResolutionResult<Resolution> {
    let mut buckets = SectionBuckets::from_sections(sections);

    if preferences.log_unknown_sections {
        for section in buckets.unknown() {
            log_debug!("Unknown section ignored",
                "title" => section.title(),
                "span" => section.span
            );
        }
    }
    let unknown_sections = buckets.unknown().len();

    let station_sections = buckets.take(ResolutionPass::Station);
    let station_count = station_sections.len();
    let station = passes::resolve_station(station_sections)?;

    let mut resolver = Resolver::new(station, preferences);
    resolver
        .stats_mut()
        .record_pass(ResolutionPass::Station, station_count);
    resolver.stats_mut().unknown_sections = unknown_sections;

    for pass in ResolutionPass::ALL.into_iter().skip(1) {
        resolver.run_pass(pass, buckets.take(pass))?;
    }

    let (station, diagnostics, stats) = resolver.finish();
    log_debug!("Resolution statistics", "summary" => stats.summary());

    Ok(Resolution {
        station,
        diagnostics,
        stats,
    })
}
