//! Token model for the VB lexer
//!
//! A [`Token`] pairs a [`TokenKind`] with its source span, the raw text as
//! written and, for literals, the decoded [`LiteralValue`] and the
//! [`LiteralFormat`] it was written in.
//!
//! Keywords live in a closed [`Keyword`] enumeration wrapped by
//! `TokenKind::Keyword`. Lookup is case-insensitive, so `dim`, `Dim` and
//! `DIM` all produce `TokenKind::Keyword(Keyword::Dim)`. Contextual keywords
//! such as `From` or `Key` are still lexed as keywords; whether they act as
//! names is decided by the consumer.
//!
//! ## Token groups
//!
//! - **Structure**: `Eol` ends every logical line, `Eof` ends the stream.
//! - **Literals**: integer, decimal, single, double, string, character and
//!   date literals.
//! - **XML markup**: tags, embedded-expression brackets, content, comments,
//!   CDATA and processing instructions inside XML literals.
//! - **Operators and punctuation**, including the compound assignment forms.

pub mod keywords;
pub mod kind;
pub mod token;

pub use keywords::Keyword;
pub use kind::TokenKind;
pub use token::{Decimal, DecimalOverflow, LiteralFormat, LiteralValue, Token};
