//! Lexical analysis for VB source text
//!
//! [`Scanner`] turns source text into [`Token`]s on demand, steered by the
//! expression classifier so that `<` is lexed as XML markup only where an
//! XML literal may start. [`tokenize`] drives a scanner to the end of input
//! and collects tokens, diagnostics, trivia and metrics in one
//! [`TokenizeResult`].
//!
//! Lexical errors never stop tokenization. Every error becomes a
//! [`Diagnostic`] and is mirrored to the global error collector.

pub mod error;
pub mod metrics;
pub mod numbers;
pub mod reader;
pub mod scanner;
pub mod special;
pub mod xml;

use std::time::Instant;

use serde::Serialize;

use crate::classifier::ClassifierError;
use crate::config::compile_time::lexical::*;
use crate::config::LexerPreferences;
use crate::logging::codes;
use crate::tokens::{Token, TokenKind};
use crate::utils::Location;
use crate::{log_debug, log_performance, log_success, log_warning};

pub use error::{Diagnostic, ScanError};
pub use metrics::LexicalMetrics;
pub use reader::SourceReader;
pub use scanner::{default_date, parse_date, Scanner};
pub use special::{Comment, CommentKind, Directive, Special, SpecialTracker, TagComment};
pub use xml::XmlModeFrame;

/// Everything produced by one tokenization run
#[derive(Debug, Clone, Serialize)]
pub struct TokenizeResult {
    /// Tokens in source order, always ending with `Eol`, `Eof`
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
    pub specials: Vec<Special>,
    pub tag_comments: Vec<TagComment>,
    pub classifier_errors: Vec<ClassifierError>,
    pub metrics: LexicalMetrics,
}

impl TokenizeResult {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// Token kinds, for quick comparisons
    pub fn kinds(&self) -> Vec<TokenKind> {
        self.tokens.iter().map(|t| t.kind).collect()
    }
}

/// Tokenizes `source` with preferences taken from the environment
pub fn tokenize(source: &str) -> TokenizeResult {
    tokenize_with_preferences(source, &LexerPreferences::default())
}

pub fn tokenize_with_preferences(source: &str, preferences: &LexerPreferences) -> TokenizeResult {
    let started = Instant::now();
    let detailed = preferences.collect_detailed_metrics;
    let mut scanner = Scanner::with_preferences(source, preferences);
    let mut metrics = LexicalMetrics::default();
    let mut tokens: Vec<Token> = Vec::new();

    log_debug!("Starting tokenization",
        "char_count" => source.chars().count(),
        "max_tokens_allowed" => MAX_TOKEN_COUNT
    );

    loop {
        if tokens.len() >= MAX_TOKEN_COUNT {
            let location = tokens.last().map_or(Location::start(), |t| t.end);
            scanner.report(location, ScanError::TooManyTokens { count: tokens.len() });
            log_warning!("Token limit reached, remaining input skipped", "location" => location);
            close_stream(&mut tokens, &mut metrics, location, detailed);
            break;
        }

        let token = scanner.next_token();
        metrics.record_token(&token, detailed);
        let done = token.is_eof();
        tokens.push(token);
        if done {
            break;
        }
    }

    let classifier_errors = scanner.classifier_errors().to_vec();
    let (diagnostics, tracker) = scanner.into_parts();
    metrics.comment_count = tracker.comments().count();
    metrics.directive_count = tracker.directives().count();
    metrics.diagnostic_count = diagnostics.len();
    metrics.classifier_error_count = classifier_errors.len();
    let (specials, tag_comments) = tracker.into_parts();

    log_performance!(codes::success::TOKENIZATION_COMPLETE,
        "Tokenization completed",
        duration = started.elapsed(),
        "token_count" => tokens.len(),
        "keywords" => metrics.keyword_tokens,
        "identifiers" => metrics.identifier_tokens,
        "literals" => metrics.literal_tokens,
        "comments" => metrics.comment_count,
        "diagnostics" => diagnostics.len()
    );

    if diagnostics.is_empty() {
        log_success!(codes::success::LEXICAL_VALIDATION_PASSED,
            "No lexical errors found",
            "lines" => metrics.line_count
        );
    }

    log_success!(codes::success::CLASSIFICATION_COMPLETE,
        "Expression classification completed",
        "classifier_errors" => classifier_errors.len(),
        "xml_tokens" => metrics.xml_tokens
    );

    TokenizeResult {
        tokens,
        diagnostics,
        specials,
        tag_comments,
        classifier_errors,
        metrics,
    }
}

/// Ends a stream cut short by the token limit with `Eol`, `Eof`
fn close_stream(tokens: &mut Vec<Token>, metrics: &mut LexicalMetrics, location: Location, detailed: bool) {
    let mut closing = Vec::with_capacity(2);
    if tokens.last().map(|t| t.kind) != Some(TokenKind::Eol) {
        closing.push(Token::symbol(TokenKind::Eol, location, location));
    }
    closing.push(Token::symbol(TokenKind::Eof, location, location));
    for token in closing {
        metrics.record_token(&token, detailed);
        tokens.push(token);
    }
}

// ============================================================================
// MODULE INITIALIZATION AND VALIDATION
// ============================================================================

/// Checks that every code the lexer and classifier emit is registered and
/// that the compiled limits are usable
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let emitted = [
        codes::lexical::INVALID_CHARACTER,
        codes::lexical::UNTERMINATED_STRING,
        codes::lexical::INVALID_NUMBER,
        codes::lexical::IDENTIFIER_TOO_LONG,
        codes::lexical::STRING_TOO_LARGE,
        codes::lexical::UNTERMINATED_ESCAPED_IDENTIFIER,
        codes::lexical::COMMENT_TOO_LONG,
        codes::lexical::TOO_MANY_TOKENS,
        codes::lexical::NEWLINE_IN_STRING,
        codes::lexical::INVALID_CHARACTER_LITERAL,
        codes::lexical::INVALID_DATE,
        codes::lexical::NEWLINE_IN_DATE,
        codes::lexical::UNTERMINATED_DATE,
        codes::lexical::DIGIT_EXPECTED,
        codes::lexical::INVALID_TYPE_CHARACTER,
        codes::lexical::INTEGER_LITERAL_TOO_LONG,
        codes::lexical::NUMBER_OVERFLOW,
        codes::lexical::IDENTIFIER_EXPECTED,
        codes::lexical::INVALID_LINE_CONTINUATION,
        codes::lexical::MALFORMED_XML_SECTION,
        codes::classifier::UNEXPECTED_TOKEN,
        codes::classifier::LIMIT_EXCEEDED,
    ];

    for code in &emitted {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!("Lexical error code {} not found in metadata registry", code));
        }
    }

    if MAX_STRING_SIZE == 0 || MAX_IDENTIFIER_LENGTH == 0 || MAX_COMMENT_LENGTH == 0 || MAX_TOKEN_COUNT == 0 {
        return Err("Lexical limits must be non-zero".to_string());
    }

    log_debug!("Lexical limits initialized",
        "max_string_size" => MAX_STRING_SIZE,
        "max_identifier_length" => MAX_IDENTIFIER_LENGTH,
        "max_comment_length" => MAX_COMMENT_LENGTH,
        "max_token_count" => MAX_TOKEN_COUNT
    );

    Ok(())
}

/// Compile-time lexical limits, for reporting
#[derive(Debug, Clone, Serialize)]
pub struct LexicalLimits {
    pub max_string_size: usize,
    pub max_identifier_length: usize,
    pub max_comment_length: usize,
    pub max_token_count: usize,
}

pub fn get_lexical_limits() -> LexicalLimits {
    LexicalLimits {
        max_string_size: MAX_STRING_SIZE,
        max_identifier_length: MAX_IDENTIFIER_LENGTH,
        max_comment_length: MAX_COMMENT_LENGTH,
        max_token_count: MAX_TOKEN_COUNT,
    }
}
