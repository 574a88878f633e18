//! Logger backends and the level-filtering service in front of them

use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard};

/// Sink for log events
pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

/// Filters events by level and bounds message length before handing them to a `Logger`
pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Build the backend selected by the logging preferences.
    ///
    /// With console output disabled, events are kept in memory only.
    pub fn from_preferences() -> Self {
        let min_level = config::get_min_log_level();
        let logger: Arc<dyn Logger> = if !config::use_console_logging() {
            Arc::new(MemoryLogger::default())
        } else if config::use_structured_logging() {
            Arc::new(JsonLogger)
        } else {
            Arc::new(ConsoleLogger)
        };

        Self::new(logger, min_level)
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, mut event: LogEvent) {
        if !self.enabled(event.level) {
            return;
        }
        truncate_message(&mut event.message, config::get_max_log_message_length());
        self.logger.log(&event);
    }
}

fn truncate_message(message: &mut String, max_len: usize) {
    if message.len() <= max_len {
        return;
    }
    let mut cut = max_len;
    while !message.is_char_boundary(cut) {
        cut -= 1;
    }
    message.truncate(cut);
    message.push_str("...");
}

/// Human readable lines; errors go to stderr
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        match event.level {
            LogLevel::Error => eprintln!("{}", event),
            _ => println!("{}", event),
        }
    }
}

/// One JSON object per line
pub struct JsonLogger;

impl Logger for JsonLogger {
    fn log(&self, event: &LogEvent) {
        let line = event.to_json().unwrap_or_else(|_| event.to_string());
        match event.level {
            LogLevel::Error => eprintln!("{}", line),
            _ => println!("{}", line),
        }
    }
}

/// Ring buffer of recent events, bounded by the compile-time buffer size
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn count_at(&self, level: LogLevel) -> usize {
        self.lock().iter().filter(|e| e.level == level).count()
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();
        let capacity = config::get_error_buffer_size();
        if events.len() >= capacity {
            let overflow = events.len() + 1 - capacity;
            events.drain(..overflow);
        }
        events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;

    fn memory_service(min_level: LogLevel) -> (Arc<MemoryLogger>, LoggingService) {
        let memory = Arc::new(MemoryLogger::default());
        let service = LoggingService::new(memory.clone(), min_level);
        (memory, service)
    }

    #[test]
    fn test_level_filtering() {
        let (memory, service) = memory_service(LogLevel::Warning);

        service.log_event(LogEvent::debug("Section consumed"));
        service.log_event(LogEvent::info("Starting resolution"));
        service.log_event(LogEvent::warning(
            codes::resolution::BUS_ADDRESS_OCCUPIED,
            "DP address 3 already taken",
        ));
        service.log_event(LogEvent::error(
            codes::section_format::UNKNOWN_SLOT,
            "Slot 4 of rack 0 is not declared",
        ));

        assert_eq!(memory.len(), 2);
        assert_eq!(memory.count_at(LogLevel::Warning), 1);
        assert_eq!(memory.count_at(LogLevel::Error), 1);
        assert!(service.enabled(LogLevel::Error));
        assert!(!service.enabled(LogLevel::Info));
    }

    #[test]
    fn test_long_messages_are_truncated() {
        let (memory, service) = memory_service(LogLevel::Debug);
        let limit = config::get_max_log_message_length();

        service.log_event(LogEvent::info("x".repeat(limit + 50)));

        let events = memory.events();
        assert_eq!(events[0].message.len(), limit + 3);
        assert!(events[0].message.ends_with("..."));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let mut message = "ÄÄÄ".to_string();
        truncate_message(&mut message, 3);
        assert_eq!(message, "Ä...");
    }
}
