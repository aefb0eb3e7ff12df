//! Log events emitted by the scanner, the classifier and the file processor

use super::codes::{self, Code};
use crate::utils::Location;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
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

/// Placeholder codes for events that carry no registered code
mod generic {
    use super::Code;

    pub const WARNING: Code = Code::new("W000");
    pub const INFO: Code = Code::new("I000");
    pub const DEBUG: Code = Code::new("D000");
}

#[derive(Debug, Clone)]
pub struct LogEvent {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub code: Code,
    pub message: String,
    /// Source position the event refers to, for lexical errors
    pub location: Option<Location>,
    /// Key/value context, ordered by key
    pub context: BTreeMap<String, String>,
}

impl LogEvent {
    fn at_level(level: LogLevel, code: Code, message: &str) -> Self {
        Self {
            timestamp: SystemTime::now(),
            level,
            code,
            message: message.to_string(),
            location: None,
            context: BTreeMap::new(),
        }
    }

    pub fn error(error_code: Code, message: &str) -> Self {
        Self::at_level(LogLevel::Error, error_code, message)
    }

    pub fn warning(message: &str) -> Self {
        Self::at_level(LogLevel::Warning, generic::WARNING, message)
    }

    pub fn info(message: &str) -> Self {
        Self::at_level(LogLevel::Info, generic::INFO, message)
    }

    /// Info event carrying a success code such as `TOKENIZATION_COMPLETE`
    pub fn success(success_code: Code, message: &str) -> Self {
        Self::at_level(LogLevel::Info, success_code, message)
    }

    pub fn debug(message: &str) -> Self {
        Self::at_level(LogLevel::Debug, generic::DEBUG, message)
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_context(mut self, key: &str, value: &str) -> Self {
        self.context.insert(key.to_string(), value.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == LogLevel::Error
    }

    pub fn is_warning(&self) -> bool {
        self.level == LogLevel::Warning
    }

    pub fn is_info(&self) -> bool {
        self.level == LogLevel::Info
    }

    pub fn requires_halt(&self) -> bool {
        codes::requires_halt(self.code.as_str())
    }

    pub fn severity(&self) -> &'static str {
        codes::get_severity(self.code.as_str()).as_str()
    }

    pub fn category(&self) -> &'static str {
        codes::get_category(self.code.as_str())
    }

    pub fn description(&self) -> &'static str {
        codes::get_description(self.code.as_str())
    }

    pub fn recommended_action(&self) -> &'static str {
        codes::get_action(self.code.as_str())
    }

    pub fn is_recoverable(&self) -> bool {
        codes::is_recoverable(self.code.as_str())
    }

    /// One-line form: `[ERROR] E021 - message at 3:14`
    pub fn format(&self) -> String {
        match self.location {
            Some(location) => format!(
                "[{}] {} - {} at {}",
                self.level.as_str(),
                self.code,
                self.message,
                location
            ),
            None => format!("[{}] {} - {}", self.level.as_str(), self.code, self.message),
        }
    }

    /// JSON object on a single line for structured logging
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        let timestamp = self
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();

        let metadata = self.is_error().then(|| ErrorDetails {
            recoverable: self.is_recoverable(),
            requires_halt: self.requires_halt(),
            description: self.description(),
            recommended_action: self.recommended_action(),
        });

        serde_json::to_string(&JsonEvent {
            timestamp,
            level: self.level.as_str(),
            code: self.code.as_str(),
            message: &self.message,
            category: self.category(),
            severity: self.severity(),
            location: self.location,
            error_metadata: metadata,
            context: &self.context,
        })
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    timestamp: u64,
    level: &'static str,
    code: &'static str,
    message: &'a str,
    category: &'static str,
    severity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_metadata: Option<ErrorDetails>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    context: &'a BTreeMap<String, String>,
}

#[derive(Serialize)]
struct ErrorDetails {
    recoverable: bool,
    requires_halt: bool,
    description: &'static str,
    recommended_action: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_event_creation() {
        let event = LogEvent::error(codes::file_processing::FILE_NOT_FOUND, "File not found");

        assert!(event.is_error());
        assert_eq!(event.code.as_str(), "E005");
        assert_eq!(event.category(), "FileProcessing");
    }

    #[test]
    fn test_generic_codes() {
        assert_eq!(LogEvent::warning("w").code.as_str(), "W000");
        assert_eq!(LogEvent::info("i").code.as_str(), "I000");
        assert_eq!(LogEvent::debug("d").level, LogLevel::Debug);

        let success = LogEvent::success(codes::success::TOKENIZATION_COMPLETE, "Tokenized");
        assert!(success.is_info());
        assert_eq!(success.code.as_str(), "I020");
    }

    #[test]
    fn test_event_formatting_with_location() {
        let event = LogEvent::error(codes::lexical::UNTERMINATED_STRING, "End of File reached")
            .with_location(Location::new(3, 14));

        assert_eq!(event.format(), "[ERROR] E021 - End of File reached at 3:14");
    }

    #[test]
    fn test_event_metadata() {
        let event = LogEvent::error(codes::system::INTERNAL_ERROR, "System failure");

        assert_eq!(event.severity(), "Critical");
        assert!(!event.is_recoverable());
        assert!(event.requires_halt());
    }

    #[test]
    fn test_json_formatting() {
        let event = LogEvent::error(codes::lexical::INVALID_DATE, "Invalid date time")
            .with_location(Location::new(1, 9))
            .with_context("file", "Module1.vb");

        let json: serde_json::Value = serde_json::from_str(&event.format_json().unwrap()).unwrap();
        assert_eq!(json["level"], "ERROR");
        assert_eq!(json["code"], "E030");
        assert_eq!(json["location"]["line"], 1);
        assert_eq!(json["context"]["file"], "Module1.vb");
        assert!(json["error_metadata"]["recoverable"].is_boolean());

        let info = LogEvent::info("plain").format_json().unwrap();
        assert!(!info.contains("error_metadata"));
        assert!(!info.contains("context"));
    }
}
