//! Token kinds produced by the scanner

use super::keywords::Keyword;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    // Structure
    Eof,
    Eol,
    Identifier,

    // Literals
    LiteralInteger,
    LiteralString,
    LiteralCharacter,
    LiteralDecimal,
    LiteralSingle,
    LiteralDouble,
    LiteralDate,

    // XML literal markup
    XmlOpenTag,
    XmlCloseTag,
    XmlOpenEndTag,
    XmlCloseTagEmptyElement,
    XmlStartInlineVB,
    XmlEndInlineVB,
    XmlContent,
    XmlComment,
    XmlCData,
    XmlProcessingInstructionStart,
    XmlProcessingInstructionEnd,

    // Punctuation
    Dot,
    Comma,
    Colon,
    ExclamationMark,
    QuestionMark,
    OpenParenthesis,
    CloseParenthesis,
    OpenCurlyBrace,
    CloseCurlyBrace,

    // Operators
    Plus,
    Minus,
    Times,
    Div,
    DivInteger,
    ConcatString,
    Power,
    Assign,
    LessThan,
    GreaterThan,
    LessEqual,
    GreaterEqual,
    NotEqual,
    ShiftLeft,
    ShiftRight,
    PlusAssign,
    MinusAssign,
    TimesAssign,
    DivAssign,
    DivIntegerAssign,
    ConcatStringAssign,
    PowerAssign,
    ShiftLeftAssign,
    ShiftRightAssign,
    ColonAssign,
    DotAt,
    TripleDot,

    Keyword(Keyword),
}

impl TokenKind {
    /// Fixed spelling of punctuation and operators, keyword spelling for
    /// keywords, `None` for everything whose text varies.
    pub const fn symbol(self) -> Option<&'static str> {
        let text = match self {
            Self::Dot => ".",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::ExclamationMark => "!",
            Self::QuestionMark => "?",
            Self::OpenParenthesis => "(",
            Self::CloseParenthesis => ")",
            Self::OpenCurlyBrace => "{",
            Self::CloseCurlyBrace => "}",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Times => "*",
            Self::Div => "/",
            Self::DivInteger => "\\",
            Self::ConcatString => "&",
            Self::Power => "^",
            Self::Assign => "=",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::NotEqual => "<>",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::PlusAssign => "+=",
            Self::MinusAssign => "-=",
            Self::TimesAssign => "*=",
            Self::DivAssign => "/=",
            Self::DivIntegerAssign => "\\=",
            Self::ConcatStringAssign => "&=",
            Self::PowerAssign => "^=",
            Self::ShiftLeftAssign => "<<=",
            Self::ShiftRightAssign => ">>=",
            Self::ColonAssign => ":=",
            Self::DotAt => ".@",
            Self::TripleDot => "...",
            Self::XmlOpenTag => "<",
            Self::XmlCloseTag => ">",
            Self::XmlOpenEndTag => "</",
            Self::XmlCloseTagEmptyElement => "/>",
            Self::XmlStartInlineVB => "<%=",
            Self::XmlEndInlineVB => "%>",
            Self::XmlProcessingInstructionStart => "<?",
            Self::XmlProcessingInstructionEnd => "?>",
            Self::Keyword(kw) => kw.as_str(),
            _ => return None,
        };
        Some(text)
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            Self::LiteralInteger
                | Self::LiteralString
                | Self::LiteralCharacter
                | Self::LiteralDecimal
                | Self::LiteralSingle
                | Self::LiteralDouble
                | Self::LiteralDate
        )
    }

    pub const fn is_xml(self) -> bool {
        matches!(
            self,
            Self::XmlOpenTag
                | Self::XmlCloseTag
                | Self::XmlOpenEndTag
                | Self::XmlCloseTagEmptyElement
                | Self::XmlStartInlineVB
                | Self::XmlEndInlineVB
                | Self::XmlContent
                | Self::XmlComment
                | Self::XmlCData
                | Self::XmlProcessingInstructionStart
                | Self::XmlProcessingInstructionEnd
        )
    }

    /// Binary operators after which an expression continues, possibly on
    /// the next line
    pub const fn is_binary_operator(self) -> bool {
        matches!(
            self,
            Self::Plus
                | Self::Minus
                | Self::Times
                | Self::Div
                | Self::DivInteger
                | Self::ConcatString
                | Self::Power
                | Self::Assign
                | Self::LessThan
                | Self::GreaterThan
                | Self::LessEqual
                | Self::GreaterEqual
                | Self::NotEqual
                | Self::ShiftLeft
                | Self::ShiftRight
                | Self::Keyword(Keyword::Mod)
                | Self::Keyword(Keyword::And)
                | Self::Keyword(Keyword::AndAlso)
                | Self::Keyword(Keyword::Or)
                | Self::Keyword(Keyword::OrElse)
                | Self::Keyword(Keyword::Xor)
                | Self::Keyword(Keyword::Is)
                | Self::Keyword(Keyword::IsNot)
                | Self::Keyword(Keyword::Like)
        )
    }

    pub const fn is_compound_assignment(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::PlusAssign
                | Self::MinusAssign
                | Self::TimesAssign
                | Self::DivAssign
                | Self::DivIntegerAssign
                | Self::ConcatStringAssign
                | Self::PowerAssign
                | Self::ShiftLeftAssign
                | Self::ShiftRightAssign
        )
    }

    /// Statement terminators: end of line, `:` and end of file
    pub const fn is_terminator(self) -> bool {
        matches!(self, Self::Eol | Self::Colon | Self::Eof)
    }

    pub fn keyword(self) -> Option<Keyword> {
        match self {
            Self::Keyword(kw) => Some(kw),
            _ => None,
        }
    }
}

impl From<Keyword> for TokenKind {
    fn from(kw: Keyword) -> Self {
        Self::Keyword(kw)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword(kw) => write!(f, "Keyword({})", kw),
            other => write!(f, "{:?}", other),
        }
    }
}
