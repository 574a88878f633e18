//! Error, warning and success codes with their classification metadata
//!
//! Every code emitted by the parser is declared here together with its
//! category, severity and recommended action. Error enums map onto these
//! codes through their `error_code()` methods.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Code wrapper shared by errors, warnings and success events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Code {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
    pub const TOO_MANY_LINES: Code = Code::new("E013");
}

/// File structure error codes (preamble and segmentation)
pub mod file_format {
    use super::Code;

    pub const EMPTY_INPUT: Code = Code::new("E020");
    pub const MISSING_FILEVERSION: Code = Code::new("E021");
    pub const MISSING_STATION_MARKER: Code = Code::new("E022");
    pub const UNTERMINATED_SECTION: Code = Code::new("E023");
    pub const SECTION_LIMIT_EXCEEDED: Code = Code::new("E024");
    pub const MISSING_STATION_SECTION: Code = Code::new("E025");
    pub const MULTIPLE_STATION_SECTIONS: Code = Code::new("E026");
}

/// Section level error codes (headers, bodies and parent lookups)
pub mod section_format {
    use super::Code;

    pub const HEADER_MISMATCH: Code = Code::new("E040");
    pub const INVALID_NUMBER: Code = Code::new("E041");
    pub const MALFORMED_ADDRESS_LINE: Code = Code::new("E042");
    pub const UNKNOWN_RACK: Code = Code::new("E050");
    pub const UNKNOWN_SLOT: Code = Code::new("E051");
    pub const UNKNOWN_SUBSYSTEM: Code = Code::new("E052");
    pub const UNKNOWN_SUBSYSTEM_RACK: Code = Code::new("E053");
    pub const UNKNOWN_SUBSYSTEM_RACK_SLOT: Code = Code::new("E054");
    pub const DUPLICATE_KEY: Code = Code::new("E060");
}

/// Recoverable resolution warnings
pub mod resolution {
    use super::Code;

    pub const DANGLING_SUBSYSTEM_REFERENCE: Code = Code::new("W100");
    pub const BUS_ADDRESS_OCCUPIED: Code = Code::new("W101");
    pub const DIAGNOSTIC_LIMIT_REACHED: Code = Code::new("W102");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const SEGMENTATION_COMPLETE: Code = Code::new("I020");
    pub const CLASSIFICATION_COMPLETE: Code = Code::new("I030");
    pub const RESOLUTION_COMPLETE: Code = Code::new("I060");
    pub const PIPELINE_COMPLETE: Code = Code::new("I070");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        let entries = [
            // File processing errors
            ErrorMetadata::new(
                "E005",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Export file does not exist",
                "Check the path passed on the command line",
            ),
            ErrorMetadata::new(
                "E006",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "File does not have .cfg extension",
                "Export the hardware configuration as a .cfg file or disable the extension check",
            ),
            ErrorMetadata::new(
                "E007",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Export is larger than the build profile allows",
                "Reduce file size or build with a larger limit profile",
            ),
            ErrorMetadata::new(
                "E008",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Export file has no content",
                "Provide a non-empty hardware configuration export",
            ),
            ErrorMetadata::new(
                "E009",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Export file cannot be opened",
                "Grant read access to the export",
            ),
            ErrorMetadata::new(
                "E010",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Export is not UTF-8 text",
                "Convert the export to UTF-8 before parsing",
            ),
            ErrorMetadata::new(
                "E011",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Reading the export failed",
                "Retry, or copy the export to local storage first",
            ),
            ErrorMetadata::new(
                "E012",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "Invalid file path provided",
                "Provide a valid file path",
            ),
            ErrorMetadata::new(
                "E013",
                "FileProcessing",
                Severity::Medium,
                false,
                true,
                "File exceeds maximum line count",
                "Split the export or build with a larger limit profile",
            ),
            // File structure errors
            ErrorMetadata::new(
                "E020",
                "FileFormat",
                Severity::High,
                false,
                true,
                "Input contains no lines",
                "Provide a complete hardware configuration export",
            ),
            ErrorMetadata::new(
                "E021",
                "FileFormat",
                Severity::High,
                false,
                true,
                "FILEVERSION line missing from preamble",
                "Re-export the configuration including the file header",
            ),
            ErrorMetadata::new(
                "E022",
                "FileFormat",
                Severity::High,
                false,
                true,
                "No line starting with STATION found",
                "Check that the file is a hardware configuration export",
            ),
            ErrorMetadata::new(
                "E023",
                "FileFormat",
                Severity::High,
                false,
                true,
                "Section is not terminated by END",
                "Add the missing END line before the blank separator line",
            ),
            ErrorMetadata::new(
                "E024",
                "FileFormat",
                Severity::High,
                false,
                true,
                "Section count or section length exceeds limits",
                "Split the export or build with a larger limit profile",
            ),
            ErrorMetadata::new(
                "E025",
                "FileFormat",
                Severity::High,
                false,
                true,
                "No STATION section found",
                "Ensure the export contains exactly one STATION section",
            ),
            ErrorMetadata::new(
                "E026",
                "FileFormat",
                Severity::High,
                false,
                true,
                "More than one STATION section found",
                "Export one station per file",
            ),
            // Section errors
            ErrorMetadata::new(
                "E040",
                "SectionFormat",
                Severity::High,
                false,
                true,
                "Section header does not match the grammar for its role",
                "Check quoting and comma separation of the header line",
            ),
            ErrorMetadata::new(
                "E041",
                "SectionFormat",
                Severity::High,
                false,
                true,
                "Numeric header field out of range",
                "Check rack, slot, subsystem and address numbers",
            ),
            ErrorMetadata::new(
                "E042",
                "SectionFormat",
                Severity::High,
                false,
                true,
                "Malformed line inside an address region",
                "ADDRESS lines need six comma separated integers",
            ),
            ErrorMetadata::new(
                "E050",
                "SectionFormat",
                Severity::High,
                false,
                true,
                "Slot references a rack that was never declared",
                "Add the RACK section or fix the rack number",
            ),
            ErrorMetadata::new(
                "E051",
                "SectionFormat",
                Severity::High,
                false,
                true,
                "Sub-slot references a slot that was never declared",
                "Add the slot section or fix the slot number",
            ),
            ErrorMetadata::new(
                "E052",
                "SectionFormat",
                Severity::High,
                false,
                true,
                "Section references a subsystem that was never declared",
                "Add the DPSUBSYSTEM/IOSUBSYSTEM section or fix the number",
            ),
            ErrorMetadata::new(
                "E053",
                "SectionFormat",
                Severity::High,
                false,
                true,
                "Slot references a bus node that was never declared",
                "Add the subsystem address section or fix the address",
            ),
            ErrorMetadata::new(
                "E054",
                "SectionFormat",
                Severity::High,
                false,
                true,
                "Sub-slot references a bus node slot that was never declared",
                "Add the subsystem slot section or fix the slot number",
            ),
            ErrorMetadata::new(
                "E060",
                "SectionFormat",
                Severity::High,
                false,
                true,
                "Two sections declare the same rack, slot, subsystem or address",
                "Remove the duplicated section",
            ),
            // Resolution warnings
            ErrorMetadata::new(
                "W100",
                "Resolution",
                Severity::Low,
                true,
                false,
                "Bus membership references an undeclared subsystem",
                "Module kept without bus membership; check the export",
            ),
            ErrorMetadata::new(
                "W101",
                "Resolution",
                Severity::Low,
                true,
                false,
                "Bus address already occupied by another node",
                "Module kept without bus membership; check address assignment",
            ),
            ErrorMetadata::new(
                "W102",
                "Resolution",
                Severity::Low,
                true,
                false,
                "Diagnostic limit reached, further diagnostics suppressed",
                "Fix reported inconsistencies and parse again",
            ),
            // Success codes
            ErrorMetadata::new(
                "I004",
                "System",
                Severity::Low,
                true,
                false,
                "Logging initialized",
                "Continue normal operation",
            ),
            ErrorMetadata::new(
                "I006",
                "FileProcessing",
                Severity::Low,
                true,
                false,
                "Export read into lines",
                "Continue to segmentation",
            ),
            ErrorMetadata::new(
                "I020",
                "FileFormat",
                Severity::Low,
                true,
                false,
                "Segmentation completed successfully",
                "Continue to classification",
            ),
            ErrorMetadata::new(
                "I030",
                "Classification",
                Severity::Low,
                true,
                false,
                "Classification completed successfully",
                "Continue to resolution",
            ),
            ErrorMetadata::new(
                "I060",
                "Resolution",
                Severity::Low,
                true,
                false,
                "Resolution completed successfully",
                "Station graph ready",
            ),
            ErrorMetadata::new(
                "I070",
                "Pipeline",
                Severity::Low,
                true,
                false,
                "Hardware configuration parsed successfully",
                "Station graph ready",
            ),
        ];

        entries
            .into_iter()
            .map(|metadata| (metadata.code, metadata))
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Whether parsing can continue after this code
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}
