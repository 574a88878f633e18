use crate::cfgfile::FileHeader;
use crate::file_processor::FileMetadata;
use crate::model::Station;
use crate::resolution::{Diagnostic, Resolution, ResolutionStats};
use serde::Serialize;
use std::time::Duration;

/// A parsed hardware configuration export
#[derive(Debug, Clone, Serialize)]
pub struct HwConfig {
    pub header: FileHeader,
    pub station: Station,
    pub diagnostics: Vec<Diagnostic>,
    pub stats: ResolutionStats,
    /// Present when the configuration was read from disk
    pub file_metadata: Option<FileMetadata>,
    pub processing_duration: Duration,
}

impl HwConfig {
    pub fn new(header: FileHeader, resolution: Resolution, processing_duration: Duration) -> Self {
        Self {
            header,
            station: resolution.station,
            diagnostics: resolution.diagnostics,
            stats: resolution.stats,
            file_metadata: None,
            processing_duration,
        }
    }

    pub fn with_file_metadata(mut self, metadata: FileMetadata) -> Self {
        self.file_metadata = Some(metadata);
        self
    }

    pub fn log_success(&self, source: &str) {
        let summary = self.station.summary();
        crate::log_success!(
            crate::logging::codes::success::PIPELINE_COMPLETE,
            "Hardware configuration parsed",
            "source" => source,
            "station" => &self.station.name,
            "racks" => summary.racks,
            "modules" => summary.modules,
            "subsystems" => summary.subsystems,
            "diagnostics" => self.diagnostics.len(),
            "duration_ms" => format!("{:.2}", self.processing_duration.as_secs_f64() * 1000.0)
        );
    }
}
