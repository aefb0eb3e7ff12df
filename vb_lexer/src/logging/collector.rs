//! Per-file errors and warnings gathered while lexing, rendered in the
//! style of rustc diagnostics once every file is done

use super::events::LogEvent;
use crate::config::compile_time::logging::MAX_LOG_EVENTS_PER_FILE;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// The file currently being lexed on a thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProcessingContext {
    pub file_path: PathBuf,
    pub file_id: usize,
}

impl FileProcessingContext {
    pub fn new(file_path: PathBuf, file_id: usize) -> Self {
        Self { file_path, file_id }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    pub files: usize,
    pub clean_files: usize,
    pub failed_files: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl ProcessingSummary {
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }
}

#[derive(Debug, Default)]
struct FileEvents {
    events: Vec<LogEvent>,
    /// Events past `MAX_LOG_EVENTS_PER_FILE`
    dropped: usize,
}

impl FileEvents {
    fn errors(&self) -> impl Iterator<Item = &LogEvent> {
        self.events.iter().filter(|e| e.is_error())
    }

    fn warnings(&self) -> impl Iterator<Item = &LogEvent> {
        self.events.iter().filter(|e| e.is_warning())
    }
}

#[derive(Debug, Default)]
pub struct ErrorCollector {
    files: Mutex<BTreeMap<PathBuf, FileEvents>>,
}

impl ErrorCollector {
    pub fn new() -> Self {
        Self::default()
    }

    fn files(&self) -> MutexGuard<'_, BTreeMap<PathBuf, FileEvents>> {
        self.files.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a file so it is counted even if it stays clean
    pub fn open_file(&self, context: &FileProcessingContext) {
        self.files().entry(context.file_path.clone()).or_default();
    }

    pub fn record_event(&self, file_path: &Path, event: LogEvent) {
        let mut files = self.files();
        let file = files.entry(file_path.to_path_buf()).or_default();
        if file.events.len() < MAX_LOG_EVENTS_PER_FILE {
            file.events.push(event);
        } else {
            file.dropped += 1;
        }
    }

    pub fn events_for(&self, file_path: &Path) -> Vec<LogEvent> {
        self.files()
            .get(file_path)
            .map(|file| file.events.clone())
            .unwrap_or_default()
    }

    pub fn summary(&self) -> ProcessingSummary {
        let files = self.files();
        let mut summary = ProcessingSummary {
            files: files.len(),
            ..Default::default()
        };

        for file in files.values() {
            let errors = file.errors().count();
            summary.errors += errors;
            summary.warnings += file.warnings().count();
            if errors > 0 {
                summary.failed_files += 1;
            } else {
                summary.clean_files += 1;
            }
        }
        summary
    }

    /// Every recorded error and warning, grouped by file:
    ///
    /// ```text
    /// error[E021]: End of File reached before String terminated
    ///   --> Form1.vb:7:3
    ///   = help: Close the string with a double quote
    /// ```
    pub fn render(&self) -> String {
        let mut out = String::new();

        for (path, file) in self.files().iter() {
            for event in file.errors() {
                let _ = writeln!(out, "error[{}]: {}", event.code, event.message);
                render_details(&mut out, path, event);
                let action = event.recommended_action();
                if action != "No specific action available" {
                    let _ = writeln!(out, "  = help: {}", action);
                }
                out.push('\n');
            }
            for event in file.warnings() {
                let _ = writeln!(out, "warning: {}", event.message);
                render_details(&mut out, path, event);
                out.push('\n');
            }
            if file.dropped > 0 {
                let _ = writeln!(out, "note: {} more event(s) in {} not shown\n", file.dropped, path.display());
            }
        }

        let summary = self.summary();
        if summary.errors > 0 || summary.warnings > 0 {
            let _ = writeln!(
                out,
                "{} error(s) and {} warning(s) in {} of {} file(s)",
                summary.errors,
                summary.warnings,
                summary.failed_files,
                summary.files
            );
        }
        out
    }
}

fn render_details(out: &mut String, path: &Path, event: &LogEvent) {
    match event.location {
        Some(location) => {
            let _ = writeln!(out, "  --> {}:{}", path.display(), location);
        }
        None => {
            let _ = writeln!(out, "  --> {}", path.display());
        }
    }
    for (key, value) in &event.context {
        if key != "file" && key != "file_id" {
            let _ = writeln!(out, "  = {}: {}", key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::codes;
    use crate::utils::Location;

    #[test]
    fn test_clean_files_are_counted() {
        let collector = ErrorCollector::new();
        collector.open_file(&FileProcessingContext::new(PathBuf::from("Clean.vb"), 0));
        collector.record_event(
            Path::new("Broken.vb"),
            LogEvent::error(codes::lexical::INVALID_CHARACTER, "Unknown char"),
        );
        collector.record_event(Path::new("Broken.vb"), LogEvent::warning("Token limit reached"));

        let summary = collector.summary();
        assert_eq!(
            summary,
            ProcessingSummary {
                files: 2,
                clean_files: 1,
                failed_files: 1,
                errors: 1,
                warnings: 1,
            }
        );
        assert!(summary.has_errors());
        assert_eq!(collector.events_for(Path::new("Broken.vb")).len(), 2);
        assert!(collector.events_for(Path::new("Clean.vb")).is_empty());
    }

    #[test]
    fn test_per_file_event_limit() {
        let collector = ErrorCollector::new();
        let path = Path::new("Noisy.vb");

        for _ in 0..MAX_LOG_EVENTS_PER_FILE + 5 {
            collector.record_event(path, LogEvent::error(codes::lexical::INVALID_CHARACTER, "Unknown char"));
        }

        assert_eq!(collector.events_for(path).len(), MAX_LOG_EVENTS_PER_FILE);
        assert!(collector.render().contains("note: 5 more event(s) in Noisy.vb not shown"));
    }

    #[test]
    fn test_render_points_at_location() {
        let collector = ErrorCollector::new();
        collector.record_event(
            Path::new("Form1.vb"),
            LogEvent::error(codes::lexical::UNTERMINATED_STRING, "End of File reached")
                .with_location(Location::new(7, 3))
                .with_context("file", "Form1.vb")
                .with_context("text", "\"abc"),
        );

        let output = collector.render();
        assert!(output.starts_with("error[E021]: End of File reached\n  --> Form1.vb:7:3\n"));
        assert!(output.contains("  = text: \"abc\n"));
        assert!(!output.contains("= file:"));
        assert!(output.ends_with("1 error(s) and 0 warning(s) in 1 of 1 file(s)\n"));
    }

    #[test]
    fn test_empty_collector_renders_nothing() {
        assert!(ErrorCollector::new().render().is_empty());
    }
}
