//! Source location tracking
//!
//! Tokens and diagnostics carry 1-based line/column locations. A column
//! counts characters, not bytes, so multi-byte text does not skew positions.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A 1-based line/column position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// Line 1, column 1
    pub fn start() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start (inclusive) and end (exclusive) locations of a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        debug_assert!(start <= end, "Span start must not be after end");
        Self { start, end }
    }

    /// Check if this span contains a location
    pub fn contains(&self, location: Location) -> bool {
        location >= self.start && location < self.end
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_line() {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// Line index over a source text for rendering diagnostics
#[derive(Debug, Clone)]
pub struct SourceMap<'a> {
    lines: Vec<&'a str>,
}

impl<'a> SourceMap<'a> {
    pub fn new(source: &'a str) -> Self {
        let lines = source
            .split('\n')
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        Self { lines }
    }

    /// Get a line of text by line number (1-based)
    pub fn get_line(&self, line_num: u32) -> Option<&'a str> {
        let index = (line_num as usize).checked_sub(1)?;
        self.lines.get(index).copied()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Format an error message with the offending line and a caret under the
    /// reported column
    pub fn format_error(&self, location: Location, message: &str) -> String {
        let mut result = format!("Error: {}\n  --> {}\n", message, location);

        if let Some(line) = self.get_line(location.line) {
            let line_num_str = location.line.to_string();
            let padding = " ".repeat(line_num_str.len());

            result.push_str(&format!("   {} |\n", padding));
            result.push_str(&format!("{} | {}\n", line_num_str, line));
            result.push_str(&format!(
                "   {} | {}^\n",
                padding,
                " ".repeat(location.column.saturating_sub(1) as usize)
            ));
        }

        result
    }
}
