//! Global logging for the VB lexer
//!
//! Logging is inert until [`init_global_logging`] runs: the macros check for
//! a global service and do nothing without one, so the library can be used
//! without any setup. Errors raised while a file context is set are also
//! recorded per file in the [`ErrorCollector`] for the cargo-style summary.

pub mod codes;
pub mod collector;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use collector::{ErrorCollector, FileProcessingContext, ProcessingSummary};
pub use events::{LogEvent, LogLevel};
pub use service::{Logger, LoggingService, MemoryLogger, NullLogger, StreamFormat, StreamLogger};

// ============================================================================
// GLOBAL STATE
// ============================================================================

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();
static GLOBAL_ERROR_COLLECTOR: OnceLock<Arc<ErrorCollector>> = OnceLock::new();

thread_local! {
    static FILE_CONTEXT: RefCell<Option<FileProcessingContext>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Initialize the global logger from the current logging preferences
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let logging_service = Arc::new(LoggingService::from_preferences());
    install(logging_service.clone())?;

    for code in [
        codes::system::INTERNAL_ERROR,
        codes::file_processing::FILE_NOT_FOUND,
        codes::lexical::INVALID_CHARACTER,
        codes::classifier::UNEXPECTED_TOKEN,
    ] {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Missing metadata for error code: {}", code));
        }
    }

    logging_service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Initialize with a caller-supplied service, e.g. one backed by a [`MemoryLogger`]
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    install(service)
}

fn install(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized")?;

    GLOBAL_ERROR_COLLECTOR
        .set(Arc::new(ErrorCollector::new()))
        .map_err(|_| "Global error collector already initialized")?;

    Ok(())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some() && GLOBAL_ERROR_COLLECTOR.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

pub fn try_get_global_error_collector() -> Option<&'static ErrorCollector> {
    GLOBAL_ERROR_COLLECTOR.get().map(|collector| collector.as_ref())
}

// ============================================================================
// FILE CONTEXT MANAGEMENT
// ============================================================================

/// Set the file being lexed on the current thread
pub fn set_file_context(file_path: PathBuf, file_id: usize) {
    let context = FileProcessingContext::new(file_path, file_id);

    if let Some(collector) = try_get_global_error_collector() {
        collector.open_file(&context);
    }

    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = Some(context);
    });
}

pub fn clear_file_context() {
    FILE_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = None;
    });
}

/// Run `f` with the file context set, clearing it afterwards
pub fn with_file_context<F, R>(file_path: PathBuf, file_id: usize, f: F) -> R
where
    F: FnOnce() -> R,
{
    set_file_context(file_path, file_id);
    let result = f();
    clear_file_context();
    result
}

pub fn get_current_file_context() -> Option<FileProcessingContext> {
    FILE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

// ============================================================================
// MACRO SUPPORT FUNCTIONS
// ============================================================================

/// Builds an event with the given context pairs, the current file (when
/// enabled) and the message cut to the configured length
fn build_event(mut event: LogEvent, context: Vec<(&str, &str)>) -> LogEvent {
    let max_length = config::get_max_log_message_length();
    if event.message.chars().count() > max_length {
        event.message = event.message.chars().take(max_length).collect();
    }

    let keep_performance = config::log_performance_events();
    for (key, value) in context {
        if key == "duration_ms" && !keep_performance {
            continue;
        }
        event = event.with_context(key, value);
    }

    if config::include_file_context() {
        if let Some(file_ctx) = get_current_file_context() {
            event = event
                .with_context("file", &file_ctx.file_path.display().to_string())
                .with_context("file_id", &file_ctx.file_id.to_string());
        }
    }

    event
}

/// Used by `log_error!`; the event is also recorded for the current file
pub fn log_error_with_context(
    code: Code,
    message: &str,
    location: Option<crate::utils::Location>,
    context: Vec<(&str, &str)>,
) {
    let mut event = build_event(LogEvent::error(code, message), context);
    if let Some(location) = location {
        event = event.with_location(location);
    }

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event.clone());
    }

    if let (Some(file_ctx), Some(collector)) = (get_current_file_context(), try_get_global_error_collector()) {
        collector.record_event(&file_ctx.file_path, event);
    }
}

/// Used by `log_success!`
pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(build_event(LogEvent::success(code, message), context));
    }
}

/// Used by `log_info!`
pub fn log_info_with_context(message: &str, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(build_event(LogEvent::info(message), context));
    }
}

/// Used by `log_warning!`; warnings count towards the per-file summary
pub fn log_warning_with_context(message: &str, context: Vec<(&str, &str)>) {
    let event = build_event(LogEvent::warning(message), context);

    if let Some(logger) = try_get_global_logger() {
        logger.log_event(event.clone());
    }

    if let (Some(file_ctx), Some(collector)) = (get_current_file_context(), try_get_global_error_collector()) {
        collector.record_event(&file_ctx.file_path, event);
    }
}

/// Used by `log_debug!`, which checks the level before formatting
pub fn log_debug_with_context(message: &str, context: Vec<(&str, &str)>) {
    if let Some(logger) = try_get_global_logger() {
        logger.log_event(build_event(LogEvent::debug(message), context));
    }
}

// ============================================================================
// SUMMARIES
// ============================================================================

pub fn get_processing_summary() -> ProcessingSummary {
    try_get_global_error_collector()
        .map(ErrorCollector::summary)
        .unwrap_or_default()
}

/// Print collected errors grouped by file, unless cargo-style output is
/// disabled in the preferences
pub fn print_cargo_style_summary() {
    if !config::use_cargo_style_output() {
        return;
    }
    if let Some(collector) = try_get_global_error_collector() {
        print!("{}", collector.render());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_logging_initialization() {
        if is_initialized() {
            return;
        }

        assert!(init_global_logging().is_ok());
        assert!(is_initialized());
        assert!(init_global_logging().is_err());
    }

    #[test]
    fn test_file_context_management() {
        let file_path = PathBuf::from("Module1.vb");

        assert!(get_current_file_context().is_none());

        set_file_context(file_path.clone(), 1);
        assert_eq!(get_current_file_context().map(|c| c.file_path), Some(file_path));

        clear_file_context();
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_with_file_context() {
        let file_path = PathBuf::from("Module1.vb");

        let result = with_file_context(file_path.clone(), 2, || {
            assert_eq!(get_current_file_context().map(|c| c.file_id), Some(2));
            42
        });

        assert_eq!(result, 42);
        assert!(get_current_file_context().is_none());
    }

    #[test]
    fn test_build_event_adds_file_and_truncates() {
        let long = "x".repeat(config::get_max_log_message_length() + 10);

        let event = with_file_context(PathBuf::from("Form1.vb"), 3, || {
            build_event(
                LogEvent::error(codes::lexical::INVALID_CHARACTER, &long),
                vec![("char", "\u{a7}")],
            )
        });

        assert_eq!(event.message.chars().count(), config::get_max_log_message_length());
        assert_eq!(event.context.get("char").map(String::as_str), Some("\u{a7}"));
        if config::include_file_context() {
            assert_eq!(event.context.get("file").map(String::as_str), Some("Form1.vb"));
        }
    }

    #[test]
    fn test_uninitialized_logging_is_silent() {
        log_error_with_context(codes::system::INTERNAL_ERROR, "dropped", None, vec![]);
        log_info_with_context("dropped", vec![("k", "v")]);
        let _ = get_processing_summary();
    }
}
