//! Side-channel output of the scanner: comments, preprocessor directives,
//! blank lines and tag comments. None of these become tokens.

use crate::utils::{Location, Span};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommentKind {
    SingleLine,
    /// Introduced by three quotes (`'''`)
    Documentation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub kind: CommentKind,
    /// Text after the introducing quote(s), line end excluded
    pub text: String,
    /// True when nothing but whitespace precedes the comment on its line
    pub starts_line: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Directive {
    /// Directive name including the `#`, e.g. `#Region`
    pub name: String,
    pub argument: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Special {
    Comment(Comment),
    Directive(Directive),
    BlankLine(Location),
}

impl Special {
    pub fn location(&self) -> Location {
        match self {
            Special::Comment(c) => c.span.start,
            Special::Directive(d) => d.span.start,
            Special::BlankLine(l) => *l,
        }
    }
}

/// A comment containing one of the configured tag words (`TODO` and the
/// like)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagComment {
    pub tag: String,
    /// Text following the tag word up to the end of the line
    pub text: String,
    pub starts_line: bool,
    pub span: Span,
}

/// Collects specials in source order
#[derive(Debug, Default, Clone)]
pub struct SpecialTracker {
    specials: Vec<Special>,
    tag_comments: Vec<TagComment>,
}

impl SpecialTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.specials.push(Special::Comment(comment));
    }

    pub fn add_directive(&mut self, directive: Directive) {
        self.specials.push(Special::Directive(directive));
    }

    pub fn add_blank_line(&mut self, location: Location) {
        self.specials.push(Special::BlankLine(location));
    }

    pub fn add_tag_comment(&mut self, tag_comment: TagComment) {
        self.tag_comments.push(tag_comment);
    }

    pub fn specials(&self) -> &[Special] {
        &self.specials
    }

    pub fn tag_comments(&self) -> &[TagComment] {
        &self.tag_comments
    }

    pub fn comments(&self) -> impl Iterator<Item = &Comment> {
        self.specials.iter().filter_map(|s| match s {
            Special::Comment(c) => Some(c),
            _ => None,
        })
    }

    pub fn directives(&self) -> impl Iterator<Item = &Directive> {
        self.specials.iter().filter_map(|s| match s {
            Special::Directive(d) => Some(d),
            _ => None,
        })
    }

    pub fn into_parts(self) -> (Vec<Special>, Vec<TagComment>) {
        (self.specials, self.tag_comments)
    }
}
