//! Fixed lexical constants of the language.
//!
//! These are properties of the language itself rather than tunable limits;
//! limits live in the generated `compile_time` module.

/// Type characters that may terminate an identifier.
pub const IDENTIFIER_TYPE_CHARACTERS: &[char] = &['%', '&', '@', '!', '#', '$'];

/// Characters that open a comment in addition to the `REM` keyword.
pub const COMMENT_QUOTES: &[char] = &['\'', '\u{2018}', '\u{2019}'];

/// Quotes that must follow the opening quote for a documentation comment.
pub const DOCUMENTATION_MARKER_LENGTH: usize = 2;

/// Marker following `<!` that opens an XML comment.
pub const XML_COMMENT_OPEN: &str = "--";

/// Marker following `<!` that opens a CDATA section.
pub const XML_CDATA_OPEN: &str = "[CDATA[";

/// Closing markers, each followed by `>`.
pub const XML_COMMENT_CLOSE: &str = "--";
pub const XML_CDATA_CLOSE: &str = "]]";

/// Tags extracted from comments when no preference overrides them.
pub const DEFAULT_COMMENT_TAGS: &[&str] = &["TODO", "FIXME", "HACK", "UNDONE"];

/// Hexadecimal digits accepted after `&H`.
pub const HEX_DIGITS: &str = "0123456789ABCDEF";

/// Octal digits accepted after `&O`.
pub const OCTAL_DIGITS: &str = "01234567";

pub fn is_comment_quote(ch: char) -> bool {
    COMMENT_QUOTES.contains(&ch)
}

pub fn is_type_character(ch: char) -> bool {
    IDENTIFIER_TYPE_CHARACTERS.contains(&ch)
}
