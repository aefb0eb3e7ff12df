//! Log sinks and the level-filtering service in front of them

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use std::sync::{Arc, Mutex, MutexGuard};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

pub struct LoggingService {
    logger: Arc<dyn Logger>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(logger: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self { logger, min_level }
    }

    /// Sink chosen from the logging preferences: JSON lines when structured
    /// logging is on, plain text when console logging is on, nothing otherwise
    pub fn from_preferences() -> Self {
        let logger: Arc<dyn Logger> = if config::use_structured_logging() {
            Arc::new(StreamLogger::json())
        } else if config::use_console_logging() {
            Arc::new(StreamLogger::text())
        } else {
            Arc::new(NullLogger)
        };

        Self::new(logger, config::get_min_log_level())
    }

    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn log_event(&self, event: LogEvent) {
        if self.should_log(event.level) {
            self.logger.log(&event);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamFormat {
    Text,
    Json,
}

/// Writes errors to stderr and everything else to stdout
pub struct StreamLogger {
    format: StreamFormat,
}

impl StreamLogger {
    pub fn text() -> Self {
        Self { format: StreamFormat::Text }
    }

    pub fn json() -> Self {
        Self { format: StreamFormat::Json }
    }

    pub fn format(&self) -> StreamFormat {
        self.format
    }

    fn render(&self, event: &LogEvent) -> String {
        match self.format {
            StreamFormat::Text => event.format(),
            StreamFormat::Json => event.format_json().unwrap_or_else(|_| event.format()),
        }
    }
}

impl Logger for StreamLogger {
    fn log(&self, event: &LogEvent) {
        let line = self.render(event);
        if event.is_error() {
            eprintln!("{}", line);
        } else {
            println!("{}", line);
        }
    }
}

pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _event: &LogEvent) {}
}

/// Keeps the most recent events, up to the log buffer size
#[derive(Default)]
pub struct MemoryLogger {
    events: Mutex<Vec<LogEvent>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.lock().clone()
    }

    pub fn has_code(&self, code: Code) -> bool {
        self.lock().iter().any(|e| e.code == code)
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.lock();
        let capacity = config::get_error_buffer_size();
        if events.len() >= capacity {
            let excess = events.len() + 1 - capacity;
            events.drain(..excess);
        }
        events.push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::Location;

    #[test]
    fn test_service_filters_by_level() {
        let memory = Arc::new(MemoryLogger::new());
        let service = LoggingService::new(memory.clone(), LogLevel::Warning);

        service.log_event(LogEvent::debug("frame pushed"));
        service.log_event(LogEvent::success(codes::success::TOKENIZATION_COMPLETE, "Tokenized"));
        service.log_event(LogEvent::warning("Token limit reached"));
        service.log_event(
            LogEvent::error(codes::lexical::UNTERMINATED_STRING, "End of File reached")
                .with_location(Location::new(4, 12)),
        );

        let events = memory.events();
        assert_eq!(events.len(), 2);
        assert!(memory.has_code(codes::lexical::UNTERMINATED_STRING));
        assert!(!memory.has_code(codes::success::TOKENIZATION_COMPLETE));
        assert_eq!(events[1].location, Some(Location::new(4, 12)));
    }

    #[test]
    fn test_memory_logger_keeps_newest() {
        let memory = MemoryLogger::new();
        let capacity = config::get_error_buffer_size();

        for n in 0..capacity + 3 {
            memory.log(&LogEvent::info(&n.to_string()));
        }

        let events = memory.events();
        assert_eq!(events.len(), capacity);
        assert_eq!(events[0].message, "3");
    }

    #[test]
    fn test_stream_renderings() {
        let event = LogEvent::error(codes::lexical::INVALID_DATE, "Invalid date time")
            .with_location(Location::new(2, 5));

        assert_eq!(StreamLogger::text().render(&event), "[ERROR] E030 - Invalid date time at 2:5");

        let json = StreamLogger::json().render(&event);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["code"], "E030");
        assert_eq!(StreamLogger::json().format(), StreamFormat::Json);

        NullLogger.log(&event);
    }
}
