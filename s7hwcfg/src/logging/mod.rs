//! Process-wide logging
//!
//! A global `LoggingService` prints events as they happen, while an
//! `ErrorCollector` keeps the errors and warnings raised inside a file
//! context so the CLI can print a cargo-style report at the end.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use crate::config::runtime::LoggingPreferences;
use crate::utils::Span;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::OnceLock;

pub use codes::Code;
pub use collector::{CollectionSummary, ErrorCollector, FileContext};
pub use events::{LogEvent, LogLevel};
pub use service::{ConsoleLogger, JsonLogger, Logger, LoggingService, MemoryLogger};

static GLOBAL_LOGGER: OnceLock<LoggingService> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<ErrorCollector> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileContext>> = const { RefCell::new(None) };
}

/// Initialize logging from preferences found in the environment
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config()?;

    GLOBAL_LOGGER
        .set(LoggingService::from_preferences())
        .map_err(|_| "Global logger already initialized")?;
    GLOBAL_ERROR_COLLECTOR
        .set(ErrorCollector::new())
        .map_err(|_| "Global error collector already initialized")?;

    for code in [
        codes::file_processing::FILE_NOT_FOUND,
        codes::file_format::UNTERMINATED_SECTION,
        codes::section_format::HEADER_MISMATCH,
        codes::resolution::DANGLING_SUBSYSTEM_REFERENCE,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("No metadata registered for code {}", code));
        }
    }

    log_success_with_context(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Logging initialized",
        vec![("min_level", config::get_min_log_level().to_string())],
    );
    Ok(())
}

/// Initialize logging with explicit preferences instead of the environment
pub fn init_global_logging_with(preferences: LoggingPreferences) -> Result<(), String> {
    config::install_preferences(preferences)?;
    init_global_logging()
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get()
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR.get()
}

/// Whether `log_debug!` should build its event at all
pub fn debug_enabled() -> bool {
    config::get_min_log_level() >= LogLevel::Debug
}

// ============================================================================
// FILE CONTEXT
// ============================================================================

pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    if let Some(collector) = try_get_global_error_collector() {
        collector.register_file(&file_path);
    }
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(FileContext::new(file_path, file_id)));
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| *ctx.borrow_mut() = None);
}

/// Run `f` with events attributed to `file_path`
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_file_context(file_path, file_id);
    let result = f();
    clear_file_context();
    result
}

pub fn current_file_context() -> Option<FileContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT
// ============================================================================

type Context = Vec<(&'static str, String)>;

fn build(mut event: LogEvent, span: Option<Span>, context: Context) -> LogEvent {
    if let Some(span) = span {
        event = event.with_span(span);
    }
    for (key, value) in context {
        event = event.with_context(key, value);
    }
    if config::include_file_context() {
        if let Some(file) = current_file_context() {
            event = event
                .with_context("file", file.file_path.display().to_string())
                .with_context("file_id", file.file_id.to_string());
        }
    }
    event
}

/// Hand the event to the logger; errors and warnings are also collected
/// against the active file
fn dispatch(event: LogEvent) {
    if event.is_error() || event.is_warning() {
        if let (Some(file), Some(collector)) =
            (current_file_context(), try_get_global_error_collector())
        {
            collector.record_event(&file.file_path, event.clone());
        }
    }
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event);
    }
}

pub fn log_error_with_context(code: Code, message: &str, span: Option<Span>, context: Context) {
    dispatch(build(LogEvent::error(code, message), span, context));
}

pub fn log_warning_with_context(code: Code, message: &str, span: Option<Span>, context: Context) {
    dispatch(build(LogEvent::warning(code, message), span, context));
}

pub fn log_success_with_context(code: Code, message: &str, context: Context) {
    dispatch(build(LogEvent::success(code, message), None, context));
}

pub fn log_info_with_context(message: &str, context: Context) {
    dispatch(build(LogEvent::info(message), None, context));
}

pub fn log_debug_with_context(message: &str, context: Context) {
    dispatch(build(LogEvent::debug(message), None, context));
}

/// Print the collected errors and warnings, if any
pub fn print_cargo_style_summary() {
    if let Some(collector) = try_get_global_error_collector() {
        let report = collector.render();
        if !report.is_empty() {
            println!("{}", report);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_logging_initialization() {
        // Another test may initialize first; either way logging ends up usable.
        let _ = init_global_logging();
        assert!(is_initialized());
        assert!(init_global_logging().is_err());
    }

    #[test]
    fn test_with_file_context_is_scoped() {
        assert!(current_file_context().is_none());

        let id = with_file_context(PathBuf::from("station.cfg"), 2, || {
            let context = current_file_context();
            assert!(context
                .as_ref()
                .is_some_and(|c| c.file_path == PathBuf::from("station.cfg")));
            context.map(|c| c.file_id)
        });

        assert_eq!(id, Some(2));
        assert!(current_file_context().is_none());
    }

    #[test]
    fn test_events_carry_file_context() {
        let event = with_file_context(PathBuf::from("plant.cfg"), 7, || {
            build(
                LogEvent::warning(codes::resolution::BUS_ADDRESS_OCCUPIED, "taken"),
                Some(Span::lines(3, 5)),
                vec![("address", "4".to_string())],
            )
        });

        assert_eq!(event.span, Some(Span::lines(3, 5)));
        assert_eq!(event.context["address"], "4");
        if config::include_file_context() {
            assert_eq!(event.context["file"], "plant.cfg");
            assert_eq!(event.context["file_id"], "7");
        }
    }
}
