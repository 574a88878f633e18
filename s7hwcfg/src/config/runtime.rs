//! Runtime preferences, read from `S7HWCFG_*` environment variables
//!
//! Hard limits live in `compile_time`; everything here only changes what
//! gets logged or how strictly inputs are checked.

use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

/// Environment variable names
pub mod env_vars {
    pub const REQUIRE_CFG_EXTENSION: &str = "S7HWCFG_REQUIRE_CFG_EXTENSION";
    pub const ENABLE_PERFORMANCE_LOGGING: &str = "S7HWCFG_ENABLE_PERFORMANCE_LOGGING";
    pub const LOG_NON_CFG_PROCESSING: &str = "S7HWCFG_LOG_NON_CFG_PROCESSING";

    pub const RESOLUTION_LOG_PASS_DETAILS: &str = "S7HWCFG_RESOLUTION_LOG_PASS_DETAILS";
    pub const RESOLUTION_LOG_UNKNOWN_SECTIONS: &str = "S7HWCFG_RESOLUTION_LOG_UNKNOWN_SECTIONS";

    pub const LOGGING_USE_STRUCTURED: &str = "S7HWCFG_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "S7HWCFG_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "S7HWCFG_LOGGING_MIN_LEVEL";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "S7HWCFG_LOGGING_INCLUDE_FILE_CONTEXT";
}

/// Parsed value of `name`, or `default` when unset or unparsable
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileProcessorPreferences {
    /// Reject exports whose extension is not `.cfg`
    pub require_cfg_extension: bool,
    /// Log size and timing when an export has been read
    pub enable_performance_logging: bool,
    /// Debug-log exports read without a `.cfg` extension
    pub log_non_cfg_processing: bool,
}

impl Default for FileProcessorPreferences {
    fn default() -> Self {
        Self {
            require_cfg_extension: env_or(env_vars::REQUIRE_CFG_EXTENSION, false),
            enable_performance_logging: env_or(env_vars::ENABLE_PERFORMANCE_LOGGING, true),
            log_non_cfg_processing: env_or(env_vars::LOG_NON_CFG_PROCESSING, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionPreferences {
    /// Debug-log every section consumed by a resolution pass
    pub log_pass_details: bool,
    /// Debug-log sections that no pass consumes
    pub log_unknown_sections: bool,
}

impl Default for ResolutionPreferences {
    fn default() -> Self {
        Self {
            log_pass_details: env_or(env_vars::RESOLUTION_LOG_PASS_DETAILS, false),
            log_unknown_sections: env_or(env_vars::RESOLUTION_LOG_UNKNOWN_SECTIONS, false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// One JSON object per event instead of plain lines
    pub use_structured_logging: bool,
    /// With console output off, events are only kept in memory
    pub enable_console_logging: bool,
    pub min_log_level: LogLevel,
    /// Attach the export path to every event
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_or(env_vars::LOGGING_USE_STRUCTURED, false),
            enable_console_logging: env_or(env_vars::LOGGING_ENABLE_CONSOLE, true),
            min_log_level: env_or(env_vars::LOGGING_MIN_LEVEL, LogLevel::Warning),
            include_file_context: env_or(env_vars::LOGGING_INCLUDE_FILE_CONTEXT, true),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub file_processor: FileProcessorPreferences,
    pub resolution: ResolutionPreferences,
    pub logging: LoggingPreferences,
}
