//! Shared primitive types used by the scanner, the classifier and the CLI.

pub mod span;

pub use span::{Location, SourceMap, Span};
