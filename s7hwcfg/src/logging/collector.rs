//! Per-file collection of errors and warnings
//!
//! Events raised while a file context is active are grouped by export so
//! the CLI can print one cargo-style block per file once parsing is done.

use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use crate::logging::codes;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// The export currently being processed on this thread
#[derive(Debug, Clone)]
pub struct FileContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

impl FileContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self { file_path, file_id }
    }
}

/// Error and warning totals across collected files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub files: usize,
    pub failed_files: usize,
    pub files_with_warnings: usize,
    pub errors: usize,
    pub warnings: usize,
}

/// Thread-safe store of events keyed by export path
#[derive(Default)]
pub struct ErrorCollector {
    files: Mutex<BTreeMap<PathBuf, Vec<LogEvent>>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<PathBuf, Vec<LogEvent>>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Register a file so it shows up in the summary even if it stays clean
    pub fn register_file(&self, file_path: &Path) {
        self.lock().entry(file_path.to_path_buf()).or_default();
    }

    /// Record an event for a file.
    ///
    /// Once `MAX_LOG_EVENTS_PER_FILE` is reached a single overflow warning is
    /// appended and later events for that file are dropped.
    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut files = self.lock();
        let events = files.entry(file_path.to_path_buf()).or_default();

        if events.len() < MAX_LOG_EVENTS_PER_FILE {
            events.push(event);
        } else if events.len() == MAX_LOG_EVENTS_PER_FILE {
            events.push(LogEvent::warning(
                codes::resolution::DIAGNOSTIC_LIMIT_REACHED,
                format!(
                    "more than {} events for this file, further events dropped",
                    MAX_LOG_EVENTS_PER_FILE
                ),
            ));
        }
    }

    pub fn file_events(&self, file_path: &Path) -> Vec<LogEvent> {
        self.lock().get(file_path).cloned().unwrap_or_default()
    }

    pub fn summary(&self) -> CollectionSummary {
        let files = self.lock();
        let mut summary = CollectionSummary {
            files: files.len(),
            ..CollectionSummary::default()
        };

        for events in files.values() {
            let errors = events.iter().filter(|e| e.is_error()).count();
            let warnings = events.iter().filter(|e| e.is_warning()).count();
            if errors > 0 {
                summary.failed_files += 1;
            } else if warnings > 0 {
                summary.files_with_warnings += 1;
            }
            summary.errors += errors;
            summary.warnings += warnings;
        }

        summary
    }

    /// Render every file with errors or warnings the way rustc reports them:
    ///
    /// ```text
    /// warning[W100]: DP subsystem 2 is not declared
    ///   --> plant.cfg:lines 40-44
    ///   = header: RACK 0, SLOT 2, SUBSLOT 1, "", "DP"
    /// ```
    pub fn render(&self) -> String {
        let files = self.lock();
        let mut output = String::new();

        for (file_path, events) in files.iter() {
            let reported: Vec<&LogEvent> = events
                .iter()
                .filter(|e| e.is_error() || e.is_warning())
                .collect();
            if reported.is_empty() {
                continue;
            }

            let _ = writeln!(output, "Checking {}", file_path.display());
            for event in reported {
                render_event(&mut output, file_path, event);
            }
            output.push('\n');
        }

        drop(files);
        let summary = self.summary();
        if summary.errors > 0 || summary.warnings > 0 {
            let _ = writeln!(
                output,
                "{} error(s), {} warning(s) in {} file(s)",
                summary.errors, summary.warnings, summary.files
            );
        }

        output
    }
}

fn render_event(output: &mut String, file_path: &Path, event: &LogEvent) {
    let label = if event.is_error() { "error" } else { "warning" };
    let _ = writeln!(output, "{}[{}]: {}", label, event.code, event.message);

    if let Some(span) = &event.span {
        let _ = writeln!(output, "  --> {}:{}", file_path.display(), span);
    }
    for (key, value) in &event.context {
        if key != "file" && key != "file_id" {
            let _ = writeln!(output, "  = {}: {}", key, value);
        }
    }
    if event.is_error() {
        if let Some(help) = event.help() {
            let _ = writeln!(output, "  = help: {}", help);
        }
    }
}
