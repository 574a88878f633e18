mod error;
mod result;

pub use error::PipelineError;
pub use result::HwConfig;

use crate::cfgfile::CfgFile;
use crate::config::runtime::{ResolutionPreferences, RuntimeConfig};
use crate::file_processor::create_processor_from_preferences;
use crate::logging;
use std::path::Path;
use std::time::Instant;

/// Parse a station from the line sequence of an export (file header -> segmentation -> resolution)
pub fn parse_lines<S: AsRef<str>>(lines: &[S]) -> Result<HwConfig, PipelineError> {
    parse_lines_with_preferences(lines, &ResolutionPreferences::default())
}

/// Parse a station from a line sequence with custom resolution preferences
pub fn parse_lines_with_preferences<S: AsRef<str>>(
    lines: &[S],
    preferences: &ResolutionPreferences,
) -> Result<HwConfig, PipelineError> {
    let start_time = Instant::now();

    let file = CfgFile::from_lines(lines)?;
    let resolution = crate::resolution::resolve_with_preferences(file.sections, preferences)?;

    Ok(HwConfig::new(file.header, resolution, start_time.elapsed()))
}

/// Parse a station from an in-memory export
pub fn parse_str(source: &str) -> Result<HwConfig, PipelineError> {
    let lines: Vec<&str> = source.lines().collect();
    let config = parse_lines(&lines)?;
    config.log_success("<memory>");
    Ok(config)
}

/// Read and parse a configuration export (file -> lines -> station)
pub fn process_file(path: &Path) -> Result<HwConfig, PipelineError> {
    process_file_with_config(path, &RuntimeConfig::default())
}

/// Read and parse a configuration export with explicit runtime preferences
pub fn process_file_with_config(
    path: &Path,
    config: &RuntimeConfig,
) -> Result<HwConfig, PipelineError> {
    logging::with_file_context(path.to_path_buf(), 0, || {
        crate::log_info!("Starting hardware configuration pipeline",
            "file" => path.display(),
            "log_pass_details" => config.resolution.log_pass_details
        );

        let start_time = Instant::now();

        // Stage 1: line source
        let processor = create_processor_from_preferences(&config.file_processor);
        let file_result = processor.process_file(path)?;
        let lines: Vec<&str> = file_result.lines().collect();

        // Stages 2-4: preamble, segmentation, resolution
        let mut parsed = parse_lines_with_preferences(&lines, &config.resolution)?
            .with_file_metadata(file_result.metadata.clone());
        parsed.processing_duration = start_time.elapsed();

        parsed.log_success(&path.display().to_string());
        Ok(parsed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfgfile::FileFormat;
    use crate::model::{AddressKind, NodeView, StationType};
    use crate::resolution::SectionFormatError;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    const EXPORT: &str = r#"FILEVERSION "3.2"
#STEP7_VERSION V5.5 + SP4
#CPU_ORDER_NUMBER 6ES7 315-2AG10-0AB0

STATION S7300 , "SIMATIC 300(1)"
BEGIN
  ASSET_ID ""
  COMMENT ""
END

RACK 0, "6ES7 390-1???0-0AA0", "UR"
BEGIN
  COMMENT ""
END

DPSUBSYSTEM 1, "PROFIBUS(1)"
BEGIN
  COMMENT ""
END

RACK 0, SLOT 2, "6ES7 315-2AG10-0AB0" "V2.6", "CPU 315-2 DP"
BEGIN
  CPU_NAME "CPU 315-2 DP"
END

RACK 0, SLOT 2, SUBSLOT 1, "", "DP"
MASTER DPSUBSYSTEM 1, "PROFIBUS(1)", DPADDRESS 2
BEGIN
  COMMENT ""
END

DPSUBSYSTEM 1, DPADDRESS 3, "6ES7 153-1AA03-0XB0", "IM 153-1"
BEGIN
  COMMENT ""
END

DPSUBSYSTEM 1, DPADDRESS 3, SLOT 4, "6ES7 321-1BL00-0AA0", "DI32xDC24V"
BEGIN
  LOCAL_IN_ADDRESSES
    ADDRESS  0, 0, 4, 0, 1, 0
  PARAMETER
END
"#;

    #[test]
    fn test_parse_str_builds_station() {
        let config = parse_str(EXPORT).unwrap();

        assert_eq!(config.header.file_version, "3.2");
        assert_eq!(config.header.get("STEP7_VERSION"), Some("V5.5 + SP4"));
        assert_eq!(config.header.format, FileFormat::Readable);
        assert_eq!(config.station.station_type, StationType::S7300);
        assert!(config.diagnostics.is_empty());
        assert!(config.file_metadata.is_none());

        let Some(NodeView::SubSlotModule(dp_interface)) = config.station.resolve_node(1, 2) else {
            panic!("expected the CPU's DP interface at address 2");
        };
        assert_eq!(dp_interface.ident.name, "DP");

        let inputs = &config
            .station
            .subsystem_rack_slot_module(1, 3, 4)
            .unwrap()
            .data
            .inputs;
        assert_eq!(inputs.len(), 1);
        assert_eq!(inputs[0].kind(), AddressKind::Input);

        let summary = config.station.summary();
        assert_eq!(summary.racks, 1);
        assert_eq!(summary.modules, 3);
        assert_eq!(summary.bus_nodes, 2);
    }

    #[test]
    fn test_process_file_attaches_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("station.cfg");
        fs::write(&path, EXPORT).unwrap();

        let config = process_file(&path).unwrap();
        let metadata = config.file_metadata.unwrap();
        assert!(metadata.is_cfg_file);
        assert_eq!(metadata.line_count, EXPORT.lines().count());
        assert_eq!(config.station.name, "SIMATIC 300(1)");
    }

    #[test]
    fn test_missing_file_is_file_processing_error() {
        let dir = tempdir().unwrap();
        let result = process_file(&dir.path().join("missing.cfg"));
        assert_matches!(result, Err(PipelineError::FileProcessing(_)));
    }

    #[test]
    fn test_stage_errors_keep_their_category() {
        assert_matches!(
            parse_str("STATION S7300 , \"S\"\nBEGIN\nEND\n"),
            Err(PipelineError::FileFormat(_))
        );

        let unknown_rack = EXPORT.replace(
            "RACK 0, \"6ES7 390-1???0-0AA0\", \"UR\"",
            "RACK 1, \"6ES7 390-1???0-0AA0\", \"UR\"",
        );
        assert_matches!(
            parse_str(&unknown_rack),
            Err(PipelineError::SectionFormat(SectionFormatError::UnknownRack { rack: 0, .. }))
        );
    }

    #[test]
    fn test_unterminated_section_reports_its_lines() {
        let source = "FILEVERSION \"3.2\"\n\nSTATION S7300 , \"S\"\nBEGIN\nCOMMENT \"x\"\n\nRACK 0, \"A\", \"B\"\nBEGIN\nEND\n";
        let Err(PipelineError::FileFormat(error)) = parse_str(source) else {
            panic!("expected file format error");
        };
        assert!(error.to_string().contains("COMMENT \"x\""));
        assert_eq!(error.error_code().as_str(), "E023");
    }
}
