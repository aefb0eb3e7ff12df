//! Scanner diagnostics

use crate::config::compile_time::lexical::*;
use crate::logging::{codes, Code};
use crate::utils::Location;
use serde::Serialize;

/// Everything the scanner can complain about. Scanning never stops on an
/// error; each one is recorded and a best-effort token is produced.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScanError {
    #[error("Unknown char({character}) which can't be read")]
    UnknownCharacter { character: char },

    #[error("End of File reached before String terminated")]
    UnterminatedString,

    #[error("No return allowed inside String literal")]
    NewlineInString,

    #[error("Chars can only have Length 1")]
    InvalidCharacterLiteral,

    #[error("Invalid date time '{text}'")]
    InvalidDate { text: String },

    #[error("No return allowed inside Date literal")]
    NewlineInDate,

    #[error("End of File reached before Date literal terminated")]
    UnterminatedDate,

    #[error("Identifier expected")]
    IdentifierExpected,

    #[error("']' expected")]
    UnterminatedEscapedIdentifier,

    #[error("Identifier too long: {length} characters (max {MAX_IDENTIFIER_LENGTH})")]
    IdentifierTooLong { length: usize },

    #[error("String too large: {size} characters (max {MAX_STRING_SIZE})")]
    StringTooLarge { size: usize },

    #[error("Comment too long: {length} characters (max {MAX_COMMENT_LENGTH})")]
    CommentTooLong { length: usize },

    #[error("Too many tokens: {count} (max {MAX_TOKEN_COUNT})")]
    TooManyTokens { count: usize },

    #[error("digit expected")]
    DigitExpected,

    #[error("Invalid type character: {suffix}")]
    InvalidTypeCharacter { suffix: String },

    #[error("{text} is not a parseable number")]
    InvalidNumber { text: String },

    #[error("{text} is too long for an integer literal")]
    IntegerTooLong { text: String },

    #[error("{text} is outside the range of its type")]
    NumberOverflow { text: String },

    #[error("No EOF expected after _")]
    EofAfterLineContinuation,

    #[error("Return expected")]
    ReturnExpected,

    #[error("Malformed XML comment or CDATA section")]
    MalformedXmlSection,

    #[error("End of File reached before XML comment or CDATA section terminated")]
    UnterminatedXmlSection,
}

impl ScanError {
    pub fn error_code(&self) -> Code {
        match self {
            ScanError::UnknownCharacter { .. } => codes::lexical::INVALID_CHARACTER,
            ScanError::UnterminatedString => codes::lexical::UNTERMINATED_STRING,
            ScanError::NewlineInString => codes::lexical::NEWLINE_IN_STRING,
            ScanError::InvalidCharacterLiteral => codes::lexical::INVALID_CHARACTER_LITERAL,
            ScanError::InvalidDate { .. } => codes::lexical::INVALID_DATE,
            ScanError::NewlineInDate => codes::lexical::NEWLINE_IN_DATE,
            ScanError::UnterminatedDate => codes::lexical::UNTERMINATED_DATE,
            ScanError::IdentifierExpected => codes::lexical::IDENTIFIER_EXPECTED,
            ScanError::UnterminatedEscapedIdentifier => {
                codes::lexical::UNTERMINATED_ESCAPED_IDENTIFIER
            }
            ScanError::IdentifierTooLong { .. } => codes::lexical::IDENTIFIER_TOO_LONG,
            ScanError::StringTooLarge { .. } => codes::lexical::STRING_TOO_LARGE,
            ScanError::CommentTooLong { .. } => codes::lexical::COMMENT_TOO_LONG,
            ScanError::TooManyTokens { .. } => codes::lexical::TOO_MANY_TOKENS,
            ScanError::DigitExpected => codes::lexical::DIGIT_EXPECTED,
            ScanError::InvalidTypeCharacter { .. } => codes::lexical::INVALID_TYPE_CHARACTER,
            ScanError::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            ScanError::IntegerTooLong { .. } => codes::lexical::INTEGER_LITERAL_TOO_LONG,
            ScanError::NumberOverflow { .. } => codes::lexical::NUMBER_OVERFLOW,
            ScanError::EofAfterLineContinuation | ScanError::ReturnExpected => {
                codes::lexical::INVALID_LINE_CONTINUATION
            }
            ScanError::MalformedXmlSection | ScanError::UnterminatedXmlSection => {
                codes::lexical::MALFORMED_XML_SECTION
            }
        }
    }
}

/// A located scanner error
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub location: Location,
    pub error: ScanError,
}

impl Diagnostic {
    pub fn new(location: Location, error: ScanError) -> Self {
        Self { location, error }
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn code(&self) -> Code {
        self.error.error_code()
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.location, self.error)
    }
}

impl Serialize for Diagnostic {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("Diagnostic", 3)?;
        state.serialize_field("location", &self.location)?;
        state.serialize_field("code", self.code().as_str())?;
        state.serialize_field("message", &self.message())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            ScanError::UnknownCharacter { character: '§' }.to_string(),
            "Unknown char(§) which can't be read"
        );
        assert_eq!(
            ScanError::InvalidTypeCharacter { suffix: "UX".into() }.to_string(),
            "Invalid type character: UX"
        );
        assert_eq!(ScanError::ReturnExpected.to_string(), "Return expected");
    }

    #[test]
    fn test_every_error_has_registered_code() {
        let errors = [
            ScanError::UnknownCharacter { character: '$' },
            ScanError::UnterminatedString,
            ScanError::NewlineInString,
            ScanError::InvalidCharacterLiteral,
            ScanError::InvalidDate { text: "13/45/2000".into() },
            ScanError::NewlineInDate,
            ScanError::UnterminatedDate,
            ScanError::IdentifierExpected,
            ScanError::UnterminatedEscapedIdentifier,
            ScanError::IdentifierTooLong { length: 2000 },
            ScanError::StringTooLarge { size: 1 },
            ScanError::CommentTooLong { length: 1 },
            ScanError::TooManyTokens { count: 1 },
            ScanError::DigitExpected,
            ScanError::InvalidTypeCharacter { suffix: "U".into() },
            ScanError::InvalidNumber { text: "1e".into() },
            ScanError::IntegerTooLong { text: "1".into() },
            ScanError::NumberOverflow { text: "1".into() },
            ScanError::EofAfterLineContinuation,
            ScanError::ReturnExpected,
            ScanError::MalformedXmlSection,
            ScanError::UnterminatedXmlSection,
        ];

        for error in errors {
            let code = error.error_code();
            assert!(
                codes::get_error_metadata(code.as_str()).is_some(),
                "{} has no metadata",
                code.as_str()
            );
            assert_eq!(codes::get_category(code.as_str()), "Lexical");
        }
    }

    #[test]
    fn test_diagnostic_json() {
        let diagnostic = Diagnostic::new(Location::new(3, 9), ScanError::UnterminatedString);
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["code"], "E021");
        assert_eq!(json["location"]["line"], 3);
        assert_eq!(diagnostic.to_string(), "3:9: End of File reached before String terminated");
    }
}
