//! Logging limits and preferences
//!
//! Buffer sizes come from the TOML profile selected at build time. Level,
//! output format and file context come from `LoggingPreferences`, installed
//! once at startup or read from the environment on first use.

use super::events::LogLevel;
use crate::config::compile_time::logging::*;
use crate::config::runtime::LoggingPreferences;
use std::sync::OnceLock;

static PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install preferences for the rest of the process
pub fn install_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    PREFERENCES
        .set(preferences)
        .map_err(|_| "Logging preferences already installed".to_string())
}

fn preferences() -> &'static LoggingPreferences {
    PREFERENCES.get_or_init(LoggingPreferences::default)
}

pub fn get_min_log_level() -> LogLevel {
    preferences().min_log_level
}

pub fn use_structured_logging() -> bool {
    preferences().use_structured_logging
}

pub fn use_console_logging() -> bool {
    preferences().enable_console_logging
}

pub fn include_file_context() -> bool {
    preferences().include_file_context
}

pub fn get_error_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn get_max_log_message_length() -> usize {
    MAX_LOG_MESSAGE_LENGTH
}

/// Sanity check of the generated limits, run once at startup
pub fn validate_config() -> Result<(), String> {
    if !(100..=100_000).contains(&LOG_BUFFER_SIZE) {
        return Err(format!(
            "log_buffer_size must be within 100..=100000, got {}",
            LOG_BUFFER_SIZE
        ));
    }
    if MAX_LOG_EVENTS_PER_FILE > LOG_BUFFER_SIZE {
        return Err(format!(
            "max_log_events_per_file ({}) exceeds log_buffer_size ({})",
            MAX_LOG_EVENTS_PER_FILE, LOG_BUFFER_SIZE
        ));
    }
    if MAX_LOG_MESSAGE_LENGTH < 80 {
        return Err(format!(
            "max_log_message_length must be at least 80, got {}",
            MAX_LOG_MESSAGE_LENGTH
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_limits_validate() {
        assert!(validate_config().is_ok());
        assert!(get_error_buffer_size() >= MAX_LOG_EVENTS_PER_FILE);
    }

    #[test]
    fn test_preferences_install_once() {
        // The first access, from any test, fixes the preferences.
        let _ = get_min_log_level();
        assert!(install_preferences(LoggingPreferences::default()).is_err());
    }
}
