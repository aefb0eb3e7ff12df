// RUNTIME PREFERENCES (User Experience)

use crate::config::constants::DEFAULT_COMMENT_TAGS;
use crate::logging::events::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexerPreferences {
    /// Words that turn a comment into a tag comment (`' TODO: ...`)
    pub comment_tags: Vec<String>,

    /// Whether classifier grammar mismatches are reported as errors
    /// instead of debug events
    pub report_classifier_errors: bool,

    /// Whether to count tokens per kind while tokenizing
    pub collect_detailed_metrics: bool,
}

impl Default for LexerPreferences {
    fn default() -> Self {
        Self {
            comment_tags: env::var("VBL_LEXER_COMMENT_TAGS")
                .ok()
                .map(|v| parse_tag_list(&v))
                .unwrap_or_else(|| DEFAULT_COMMENT_TAGS.iter().map(|t| t.to_string()).collect()),
            report_classifier_errors: env::var("VBL_LEXER_REPORT_CLASSIFIER_ERRORS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            collect_detailed_metrics: env::var("VBL_LEXER_DETAILED_METRICS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingPreferences {
    /// Whether to use structured JSON logging (user preference)
    pub use_structured_logging: bool,

    /// Whether to enable console output (user preference)
    pub enable_console_logging: bool,

    /// User preferred minimum log level
    pub min_log_level: LogLevel,

    /// Whether to include performance metrics in logs
    pub log_performance_events: bool,

    /// Whether to enable cargo-style error reporting
    pub enable_cargo_style_output: bool,

    /// Whether to include file context in log messages
    pub include_file_context: bool,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env::var("VBL_LOGGING_USE_STRUCTURED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            enable_console_logging: env::var("VBL_LOGGING_ENABLE_CONSOLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            min_log_level: env::var("VBL_LOGGING_MIN_LEVEL")
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Info),
            log_performance_events: env::var("VBL_LOGGING_LOG_PERFORMANCE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            enable_cargo_style_output: env::var("VBL_LOGGING_CARGO_STYLE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            include_file_context: env::var("VBL_LOGGING_INCLUDE_FILE_CONTEXT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
        }
    }
}

/// Parse log level from string (used for environment variables)
pub fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// Split a comma separated tag list, dropping empty entries
fn parse_tag_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub lexer: LexerPreferences,
    pub logging: LoggingPreferences,
}

impl RuntimeConfig {
    /// Parse preferences from TOML text; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| format!("Invalid preferences: {}", e))
    }

    /// Load preferences from a TOML file
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content)
    }
}

/// Environment variable names for configuration
pub mod env_vars {
    // Lexer
    pub const LEXER_COMMENT_TAGS: &str = "VBL_LEXER_COMMENT_TAGS";
    pub const LEXER_REPORT_CLASSIFIER_ERRORS: &str = "VBL_LEXER_REPORT_CLASSIFIER_ERRORS";
    pub const LEXER_DETAILED_METRICS: &str = "VBL_LEXER_DETAILED_METRICS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "VBL_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "VBL_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "VBL_LOGGING_MIN_LEVEL";
    pub const LOGGING_LOG_PERFORMANCE: &str = "VBL_LOGGING_LOG_PERFORMANCE";
    pub const LOGGING_CARGO_STYLE: &str = "VBL_LOGGING_CARGO_STYLE";
    pub const LOGGING_INCLUDE_FILE_CONTEXT: &str = "VBL_LOGGING_INCLUDE_FILE_CONTEXT";
}
