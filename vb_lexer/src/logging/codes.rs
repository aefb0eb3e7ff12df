//! Consolidated error codes and classification system
//!
//! Single source of truth for all codes the lexer emits and their metadata.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// What the caller does after an event carrying the code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handling {
    /// Lexing resumes after the offending text
    Continue,
    /// The current input is abandoned
    Halt,
}

#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub handling: Handling,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

const fn row(
    code: &'static str,
    category: &'static str,
    severity: Severity,
    handling: Handling,
    description: &'static str,
    recommended_action: &'static str,
) -> ErrorMetadata {
    ErrorMetadata {
        code,
        category,
        severity,
        handling,
        description,
        recommended_action,
    }
}

// ============================================================================
// CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
    pub const CONFIGURATION_ERROR: Code = Code::new("ERR003");
}

/// File processing error codes
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const INVALID_EXTENSION: Code = Code::new("E006");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const EMPTY_FILE: Code = Code::new("E008");
    pub const PERMISSION_DENIED: Code = Code::new("E009");
    pub const INVALID_ENCODING: Code = Code::new("E010");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const IDENTIFIER_TOO_LONG: Code = Code::new("E023");
    pub const STRING_TOO_LARGE: Code = Code::new("E024");
    pub const UNTERMINATED_ESCAPED_IDENTIFIER: Code = Code::new("E025");
    pub const COMMENT_TOO_LONG: Code = Code::new("E026");
    pub const TOO_MANY_TOKENS: Code = Code::new("E027");
    pub const NEWLINE_IN_STRING: Code = Code::new("E028");
    pub const INVALID_CHARACTER_LITERAL: Code = Code::new("E029");
    pub const INVALID_DATE: Code = Code::new("E030");
    pub const NEWLINE_IN_DATE: Code = Code::new("E031");
    pub const UNTERMINATED_DATE: Code = Code::new("E032");
    pub const DIGIT_EXPECTED: Code = Code::new("E033");
    pub const INVALID_TYPE_CHARACTER: Code = Code::new("E034");
    pub const INTEGER_LITERAL_TOO_LONG: Code = Code::new("E035");
    pub const NUMBER_OVERFLOW: Code = Code::new("E036");
    pub const IDENTIFIER_EXPECTED: Code = Code::new("E037");
    pub const INVALID_LINE_CONTINUATION: Code = Code::new("E038");
    pub const MALFORMED_XML_SECTION: Code = Code::new("E039");
}

/// Expression classifier codes
pub mod classifier {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E045");
    pub const LIMIT_EXCEEDED: Code = Code::new("E046");
}

/// Success codes (informational, non-error)
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");

    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const FILE_VALIDATION_PASSED: Code = Code::new("I007");

    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const LEXICAL_VALIDATION_PASSED: Code = Code::new("I021");

    pub const CLASSIFICATION_COMPLETE: Code = Code::new("I045");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

use Handling::{Continue, Halt};
use Severity::{Critical, Low, Medium};

const METADATA: &[ErrorMetadata] = &[
    // System
    row("ERR001", "System", Critical, Halt, "Critical internal system error", "File a bug report with the input that triggered it"),
    row("ERR002", "System", Critical, Halt, "System initialization failure", "Check system configuration and dependencies"),
    row("ERR003", "System", Critical, Halt, "Invalid runtime configuration", "Fix the preferences file or VBL_* environment variables"),
    // File processing
    row("E005", "FileProcessing", Medium, Halt, "File not found at specified path", "Check file path and ensure file exists"),
    row("E006", "FileProcessing", Low, Continue, "File does not have .vb extension", "Rename file with .vb extension or verify file type"),
    row("E007", "FileProcessing", Medium, Halt, "File exceeds maximum size limit", "Reduce file size or increase processing limits"),
    row("E008", "FileProcessing", Low, Continue, "File is empty", "Provide a file with content or check file integrity"),
    row("E009", "FileProcessing", Medium, Halt, "Permission denied accessing file", "Check file permissions and user access rights"),
    row("E010", "FileProcessing", Medium, Halt, "Invalid UTF-8 encoding in file", "Convert file to UTF-8 encoding"),
    row("E011", "FileProcessing", Medium, Halt, "I/O error during file operation", "Check disk space, permissions and file system integrity"),
    row("E012", "FileProcessing", Medium, Halt, "Invalid file path provided", "Provide a valid file path"),
    // Lexical
    row("E020", "Lexical", Medium, Continue, "Character cannot start any token", "Remove the character or move it into a string or comment"),
    row("E021", "Lexical", Medium, Continue, "End of file reached inside a string literal", "Add the closing quote"),
    row("E022", "Lexical", Low, Continue, "Number literal cannot be parsed", "Fix the digits or the type character"),
    row("E023", "Lexical", Low, Continue, "Identifier exceeds maximum allowed length", "Shorten the identifier"),
    row("E024", "Lexical", Medium, Continue, "String literal exceeds maximum size limit", "Split the string into smaller parts"),
    row("E025", "Lexical", Medium, Continue, "Escaped identifier is missing its closing bracket", "Add ']' after the identifier"),
    row("E026", "Lexical", Low, Continue, "Comment exceeds maximum length", "Shorten the comment"),
    row("E027", "Lexical", Medium, Halt, "Token count exceeds maximum limit", "Split the source file"),
    row("E028", "Lexical", Medium, Continue, "Line break inside a string literal", "Close the string before the end of the line"),
    row("E029", "Lexical", Low, Continue, "Character literal must contain exactly one character", "Use a string literal or a single character"),
    row("E030", "Lexical", Low, Continue, "Date literal cannot be parsed", "Use the #M/d/yyyy h:mm:ss tt# form"),
    row("E031", "Lexical", Medium, Continue, "Line break inside a date literal", "Close the date literal before the end of the line"),
    row("E032", "Lexical", Medium, Continue, "End of file reached inside a date literal", "Add the closing '#'"),
    row("E033", "Lexical", Low, Continue, "Digit expected after a radix prefix", "Add digits after &H or &O"),
    row("E034", "Lexical", Low, Continue, "Unsigned type character not followed by S, I or L", "Use US, UI or UL"),
    row("E035", "Lexical", Low, Continue, "Integer literal has too many digits", "Use a Decimal or Double literal"),
    row("E036", "Lexical", Low, Continue, "Number literal overflows its type", "Use a wider type character"),
    row("E037", "Lexical", Medium, Continue, "Identifier expected", "Add an identifier after '['"),
    row("E038", "Lexical", Low, Continue, "Line continuation not followed by a line break", "Remove characters after '_'"),
    row("E039", "Lexical", Medium, Continue, "Malformed XML comment, CDATA or processing instruction", "Terminate the XML section"),
    // Classifier
    row("E045", "Classifier", Low, Continue, "Token does not fit the expected grammar", "Check the statement; lexing continues with a best guess"),
    row("E046", "Classifier", Medium, Continue, "Classifier depth or step limit exceeded", "Simplify deeply nested expressions"),
    // Success
    row("I001", "Success", Low, Continue, "Operation completed successfully", "Continue"),
    row("I004", "Success", Low, Continue, "System initialization completed", "Continue"),
    row("I006", "Success", Low, Continue, "File read and validated", "Continue to tokenization"),
    row("I007", "Success", Low, Continue, "File validation passed", "Continue"),
    row("I020", "Success", Low, Continue, "Tokenization completed", "Consume the token stream"),
    row("I021", "Success", Low, Continue, "No lexical errors found", "Continue"),
    row("I045", "Success", Low, Continue, "Classifier reached end of input", "Continue"),
];

static ERROR_REGISTRY: OnceLock<HashMap<&'static str, &'static ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, &'static ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| METADATA.iter().map(|m| (m.code, m)).collect())
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code).copied()
}

/// Get error severity from error code
pub fn get_severity(code: &str) -> Severity {
    get_error_metadata(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_metadata(code)
        .map_or(true, |metadata| metadata.handling == Handling::Continue)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_metadata(code)
        .is_some_and(|metadata| metadata.handling == Handling::Halt)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_metadata(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_constant_is_registered() {
        let constants = [
            system::INTERNAL_ERROR,
            system::INITIALIZATION_FAILURE,
            system::CONFIGURATION_ERROR,
            file_processing::FILE_NOT_FOUND,
            file_processing::INVALID_EXTENSION,
            file_processing::FILE_TOO_LARGE,
            file_processing::EMPTY_FILE,
            file_processing::PERMISSION_DENIED,
            file_processing::INVALID_ENCODING,
            file_processing::IO_ERROR,
            file_processing::INVALID_PATH,
            lexical::INVALID_CHARACTER,
            lexical::UNTERMINATED_STRING,
            lexical::INVALID_NUMBER,
            lexical::IDENTIFIER_TOO_LONG,
            lexical::STRING_TOO_LARGE,
            lexical::UNTERMINATED_ESCAPED_IDENTIFIER,
            lexical::COMMENT_TOO_LONG,
            lexical::TOO_MANY_TOKENS,
            lexical::NEWLINE_IN_STRING,
            lexical::INVALID_CHARACTER_LITERAL,
            lexical::INVALID_DATE,
            lexical::NEWLINE_IN_DATE,
            lexical::UNTERMINATED_DATE,
            lexical::DIGIT_EXPECTED,
            lexical::INVALID_TYPE_CHARACTER,
            lexical::INTEGER_LITERAL_TOO_LONG,
            lexical::NUMBER_OVERFLOW,
            lexical::IDENTIFIER_EXPECTED,
            lexical::INVALID_LINE_CONTINUATION,
            lexical::MALFORMED_XML_SECTION,
            classifier::UNEXPECTED_TOKEN,
            classifier::LIMIT_EXCEEDED,
            success::OPERATION_COMPLETED_SUCCESSFULLY,
            success::SYSTEM_INITIALIZATION_COMPLETED,
            success::FILE_PROCESSING_SUCCESS,
            success::FILE_VALIDATION_PASSED,
            success::TOKENIZATION_COMPLETE,
            success::LEXICAL_VALIDATION_PASSED,
            success::CLASSIFICATION_COMPLETE,
        ];

        for code in constants {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "{} has no metadata",
                code
            );
        }
        assert_eq!(constants.len(), METADATA.len());
    }

    #[test]
    fn test_lexical_errors_are_recoverable() {
        assert!(is_recoverable("E021"));
        assert_eq!(get_error_metadata("E021").map(|m| m.handling), Some(Handling::Continue));
        assert!(!requires_halt("E021"));
        assert_eq!(get_category("E030"), "Lexical");
    }

    #[test]
    fn test_unknown_code_defaults() {
        assert_eq!(get_category("Z999"), "Unknown");
        assert_eq!(get_severity("Z999"), Severity::Medium);
        assert_eq!(get_description("Z999"), "Unknown error");
    }

    #[test]
    fn test_system_errors_halt() {
        assert!(requires_halt(system::INTERNAL_ERROR.as_str()));
        assert_eq!(get_severity("ERR001"), Severity::Critical);
    }
}
