//! Token statistics gathered while tokenizing

use std::collections::BTreeMap;

use serde::Serialize;

use crate::tokens::{Token, TokenKind};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LexicalMetrics {
    pub total_tokens: usize,
    pub keyword_tokens: usize,
    pub identifier_tokens: usize,
    pub literal_tokens: usize,
    pub operator_tokens: usize,
    pub xml_tokens: usize,
    pub line_count: usize,
    pub max_identifier_length: usize,
    pub max_string_length: usize,
    pub comment_count: usize,
    pub directive_count: usize,
    pub diagnostic_count: usize,
    pub classifier_error_count: usize,

    /// Per-kind counts, filled only when detailed metrics are enabled
    pub kind_counts: BTreeMap<String, usize>,
}

impl LexicalMetrics {
    pub(crate) fn record_token(&mut self, token: &Token, detailed: bool) {
        self.total_tokens += 1;

        match token.kind {
            TokenKind::Keyword(_) => self.keyword_tokens += 1,
            TokenKind::Identifier => {
                self.identifier_tokens += 1;
                self.max_identifier_length = self.max_identifier_length.max(token.text.chars().count());
            }
            TokenKind::Eol => self.line_count += 1,
            TokenKind::LiteralString => {
                self.literal_tokens += 1;
                self.max_string_length = self.max_string_length.max(token.text.chars().count());
            }
            kind if kind.is_literal() => self.literal_tokens += 1,
            kind if kind.is_xml() => self.xml_tokens += 1,
            kind if kind.is_binary_operator() || kind.is_compound_assignment() => self.operator_tokens += 1,
            _ => {}
        }

        if detailed {
            *self.kind_counts.entry(kind_name(token.kind)).or_insert(0) += 1;
        }
    }

    /// Share of tokens that are keywords, in percent
    pub fn keyword_ratio(&self) -> f64 {
        if self.total_tokens == 0 {
            0.0
        } else {
            self.keyword_tokens as f64 * 100.0 / self.total_tokens as f64
        }
    }
}

fn kind_name(kind: TokenKind) -> String {
    match kind {
        TokenKind::Keyword(keyword) => keyword.as_str().to_string(),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Keyword;
    use crate::utils::Location;

    fn token(kind: TokenKind, text: &str) -> Token {
        Token::new(kind, Location::new(1, 1), Location::new(1, 1), text)
    }

    #[test]
    fn test_counts_by_group() {
        let mut metrics = LexicalMetrics::default();
        for t in [
            token(TokenKind::Keyword(Keyword::Dim), "Dim"),
            token(TokenKind::Identifier, "total"),
            token(TokenKind::Assign, "="),
            token(TokenKind::LiteralString, "\"abc\""),
            token(TokenKind::Eol, ""),
        ] {
            metrics.record_token(&t, false);
        }

        assert_eq!(metrics.total_tokens, 5);
        assert_eq!(metrics.keyword_tokens, 1);
        assert_eq!(metrics.identifier_tokens, 1);
        assert_eq!(metrics.operator_tokens, 1);
        assert_eq!(metrics.literal_tokens, 1);
        assert_eq!(metrics.line_count, 1);
        assert_eq!(metrics.max_identifier_length, 5);
        assert_eq!(metrics.max_string_length, 5);
        assert!(metrics.kind_counts.is_empty());
        assert!((metrics.keyword_ratio() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_detailed_kind_counts() {
        let mut metrics = LexicalMetrics::default();
        metrics.record_token(&token(TokenKind::Keyword(Keyword::Dim), "dim"), true);
        metrics.record_token(&token(TokenKind::Keyword(Keyword::Dim), "DIM"), true);
        metrics.record_token(&token(TokenKind::XmlOpenTag, "<"), true);

        assert_eq!(metrics.kind_counts.get("Dim"), Some(&2));
        assert_eq!(metrics.kind_counts.get("XmlOpenTag"), Some(&1));
        assert_eq!(metrics.xml_tokens, 1);
    }
}
