//! Log events raised while parsing a configuration export

use super::codes::{self, Code};
use crate::utils::Span;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Event severity, ordered from most to least severe
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    /// Accepts level names in any case as well as their numeric rank
    fn from_str(level: &str) -> Result<Self, Self::Err> {
        match level.trim().to_ascii_lowercase().as_str() {
            "error" | "0" => Ok(LogLevel::Error),
            "warn" | "warning" | "1" => Ok(LogLevel::Warning),
            "info" | "2" => Ok(LogLevel::Info),
            "debug" | "3" => Ok(LogLevel::Debug),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// A single logged occurrence with its code, location and key/value context
#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn new(level: LogLevel, code: Code, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            code,
            message: message.into(),
            span: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(code: Code, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, code, message)
    }

    pub fn warning(code: Code, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, code, message)
    }

    /// Progress message without a dedicated code
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, Code::new("I000"), message)
    }

    /// Stage completion, logged at info level under an `I0xx` code
    pub fn success(code: Code, message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, code, message)
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Debug, Code::new("D000"), message)
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_context(mut self, key: &str, value: impl Into<String>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    /// Suggested fix, if the code registry carries one
    pub fn help(&self) -> Option<&'static str> {
        codes::get_error_metadata(self.code.as_str()).map(|meta| meta.recommended_action)
    }

    /// One JSON object per event for structured output
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl fmt::Display for LogEvent {
    /// `[WARN] W100 - message (lines 12-15)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} - {}", self.level, self.code, self.message)?;
        if let Some(span) = &self.span {
            write!(f, " ({})", span)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        assert_eq!("error".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert_eq!("WARN".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!(" info ".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("3".parse::<LogLevel>(), Ok(LogLevel::Debug));
        assert!("verbose".parse::<LogLevel>().is_err());
        assert!(LogLevel::Error < LogLevel::Debug);
    }

    #[test]
    fn test_display_includes_line_range() {
        let event = LogEvent::error(codes::file_format::UNTERMINATED_SECTION, "Missing END")
            .with_span(Span::lines(12, 15));

        assert_eq!(
            event.to_string(),
            "[ERROR] E023 - Missing END (lines 12-15)"
        );
        assert_eq!(event.category(), "FileFormat");
    }

    #[test]
    fn test_warning_metadata() {
        let event = LogEvent::warning(
            codes::resolution::DANGLING_SUBSYSTEM_REFERENCE,
            "DP subsystem 1 is not declared",
        );

        assert!(event.is_warning());
        assert_eq!(event.category(), "Resolution");
        assert!(event.help().is_some());
    }

    #[test]
    fn test_json_output() {
        let event = LogEvent::error(codes::section_format::UNKNOWN_RACK, "Rack 3 is not declared")
            .with_span(Span::lines(40, 44))
            .with_context("rack", "3");

        let value: serde_json::Value = serde_json::from_str(&event.to_json().unwrap()).unwrap();
        assert_eq!(value["level"], "error");
        assert_eq!(value["code"], "E050");
        assert_eq!(value["context"]["rack"], "3");
        assert_eq!(value["span"]["start"]["line"], 40);
        assert!(value["timestamp"].is_string());
    }
}
