//! VB lexer with a lookahead expression classifier
//!
//! The [`lexical::Scanner`] produces tokens one at a time. Before each token
//! it asks a [`classifier::LookaheadClassifier`] whether an XML literal may
//! start at the current position, and the classifier in turn is informed of
//! every token the scanner yields.

// Internal modules
pub mod classifier;
pub mod config;
pub mod file_processor;
pub mod lexical;
#[macro_use]
pub mod logging;
pub mod tokens;
pub mod utils;

// Re-export key types for library consumers
pub use classifier::{ClassifierError, ClassifierFlags, ExpressionClassifier, LookaheadClassifier};
pub use lexical::{tokenize, tokenize_with_preferences, Diagnostic, Scanner, TokenizeResult};
pub use tokens::{Keyword, Token, TokenKind};
pub use utils::Location;
