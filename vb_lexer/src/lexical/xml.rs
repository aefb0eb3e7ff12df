//! XML literal sub-lexer
//!
//! Once `<` has been accepted as the start of an XML literal the scanner
//! switches to XML mode and lexes markup, names, attribute strings and
//! content until the outermost element is closed. Embedded expressions
//! (`<%= ... %>`) drop back to standard mode; the enclosing literal's state
//! waits on a stack of [`XmlModeFrame`]s.

use super::error::ScanError;
use super::reader::{is_line_end, is_xml_name_char, is_xml_whitespace};
use super::scanner::Scanner;
use crate::classifier::LookaheadClassifier;
use crate::config::constants::{XML_CDATA_CLOSE, XML_CDATA_OPEN, XML_COMMENT_CLOSE, XML_COMMENT_OPEN};
use crate::tokens::{LiteralFormat, LiteralValue, Token, TokenKind};
use crate::utils::Location;

/// State of one XML literal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct XmlModeFrame {
    /// Open element depth. Starts at -1 for member access (`x.<name>`) and
    /// `Imports <xmlns...>` so that the single tag closes the literal.
    pub level: i32,
    pub in_xml_tag: bool,
    pub in_xml_close_tag: bool,
    pub was_comment: bool,
    pub was_processing_instruction: bool,
}

impl XmlModeFrame {
    pub fn new(single_tag: bool) -> Self {
        Self {
            level: if single_tag { -1 } else { 0 },
            ..Self::default()
        }
    }

    /// True when the literal has nothing left open
    pub fn is_complete(&self) -> bool {
        self.level <= 0
            && !self.in_xml_tag
            && !self.in_xml_close_tag
            && !self.was_comment
            && !self.was_processing_instruction
    }

    fn close_markup(&mut self) {
        self.in_xml_tag = false;
        self.in_xml_close_tag = false;
        self.was_comment = false;
        self.was_processing_instruction = false;
    }
}

impl<C: LookaheadClassifier> Scanner<C> {
    /// Opens a new XML literal at a `<` read in standard mode
    pub(super) fn enter_xml_mode(&mut self, start: Location) -> Token {
        let mut frame = XmlModeFrame::new(self.flags.imports_or_access_start);
        self.in_xml_mode = true;
        let token = self.markup_after_open_angle(&mut frame, start);
        self.xml_stack.push(frame);
        token
    }

    /// Runs before each XML-mode token. When the innermost literal is
    /// complete, XML mode is left unless a comment or CDATA section follows
    /// (after whitespace), which still belongs to the literal.
    pub(super) fn leave_xml_mode_or_read_trailing(&mut self) -> Option<Token> {
        let frame = *self.xml_stack.last()?;
        if !frame.is_complete() {
            return None;
        }

        let mut offset = 0;
        while self.reader.peek_at(offset).is_some_and(is_xml_whitespace) {
            offset += 1;
        }
        if self.reader.peek_at(offset) == Some('<') && self.reader.peek_at(offset + 1) == Some('!') {
            for _ in 0..offset {
                self.reader.read();
            }
            let start = self.reader.location();
            self.reader.read();
            self.reader.read();
            return Some(self.comment_or_cdata(start));
        }

        self.xml_stack.pop();
        self.in_xml_mode = false;
        None
    }

    /// Lexes one XML-mode token whose first character `ch` was consumed
    pub(super) fn lex_xml(&mut self, ch: char, start: Location) -> Option<Token> {
        let Some(mut frame) = self.xml_stack.pop() else {
            self.in_xml_mode = false;
            return Some(Token::new(TokenKind::XmlContent, start, self.reader.location(), ch));
        };
        let token = self.lex_xml_in_frame(&mut frame, ch, start);
        self.xml_stack.push(frame);
        token
    }

    fn lex_xml_in_frame(&mut self, frame: &mut XmlModeFrame, ch: char, start: Location) -> Option<Token> {
        if ch == '<' {
            return Some(self.markup_after_open_angle(frame, start));
        }
        if !frame.in_xml_tag && !frame.in_xml_close_tag {
            return Some(self.content(ch, start));
        }

        let token = match ch {
            '/' if self.reader.eat('>') => {
                frame.in_xml_tag = false;
                frame.level -= 1;
                Token::symbol(TokenKind::XmlCloseTagEmptyElement, start, self.reader.location())
            }
            '?' if self.reader.eat('>') => {
                frame.in_xml_tag = false;
                frame.was_processing_instruction = true;
                Token::symbol(TokenKind::XmlProcessingInstructionEnd, start, self.reader.location())
            }
            '>' => {
                if frame.in_xml_close_tag {
                    frame.level -= 1;
                }
                frame.close_markup();
                Token::symbol(TokenKind::XmlCloseTag, start, self.reader.location())
            }
            '=' => Token::symbol(TokenKind::Assign, start, self.reader.location()),
            '"' | '\'' => self.attribute_string(ch, start),
            c if is_xml_whitespace(c) => return None,
            c => {
                let name = self.xml_name(c);
                Token::new(TokenKind::Identifier, start, self.reader.location(), name)
            }
        };
        Some(token)
    }

    /// Markup starting with `<`, the `<` already consumed
    fn markup_after_open_angle(&mut self, frame: &mut XmlModeFrame, start: Location) -> Token {
        if self.reader.eat('/') {
            frame.in_xml_close_tag = true;
            return Token::symbol(TokenKind::XmlOpenEndTag, start, self.reader.location());
        }
        if self.reader.eat_str("%=") {
            self.in_xml_mode = false;
            return Token::symbol(TokenKind::XmlStartInlineVB, start, self.reader.location());
        }
        if self.reader.eat('?') {
            frame.in_xml_tag = true;
            return Token::symbol(TokenKind::XmlProcessingInstructionStart, start, self.reader.location());
        }
        if self.reader.eat('!') {
            let token = self.comment_or_cdata(start);
            frame.was_comment = token.kind == TokenKind::XmlComment;
            return token;
        }

        frame.level += 1;
        frame.in_xml_tag = true;
        frame.was_comment = false;
        frame.was_processing_instruction = false;
        Token::symbol(TokenKind::XmlOpenTag, start, self.reader.location())
    }

    /// `<!--...-->` or `<![CDATA[...]]>`, `<!` already consumed. The token
    /// text is the section body without its markers.
    fn comment_or_cdata(&mut self, start: Location) -> Token {
        let (kind, close) = if self.reader.eat_str(XML_COMMENT_OPEN) {
            (TokenKind::XmlComment, XML_COMMENT_CLOSE)
        } else if self.reader.eat_str(XML_CDATA_OPEN) {
            (TokenKind::XmlCData, XML_CDATA_CLOSE)
        } else {
            self.report(start, ScanError::MalformedXmlSection);
            let mut text = String::new();
            self.reader.read_while(&mut text, |c| c != '>');
            self.reader.eat('>');
            return Token::new(TokenKind::XmlComment, start, self.reader.location(), text);
        };

        let mut text = String::new();
        loop {
            let Some(ch) = self.reader.read() else {
                self.report(self.reader.location(), ScanError::UnterminatedXmlSection);
                return Token::new(kind, start, self.reader.location(), text);
            };
            text.push(ch);
            if text.ends_with(close) && self.reader.peek_is('>') {
                text.truncate(text.len() - close.len());
                self.reader.read();
                return Token::new(kind, start, self.reader.location(), text);
            }
        }
    }

    /// Character data up to the next `<`
    fn content(&mut self, first: char, start: Location) -> Token {
        let mut text = String::from(first);
        self.reader.read_while(&mut text, |c| c != '<');
        Token::new(TokenKind::XmlContent, start, self.reader.location(), text)
    }

    /// Attribute value in single or double quotes
    fn attribute_string(&mut self, quote: char, start: Location) -> Token {
        let mut value = String::new();
        loop {
            let here = self.reader.location();
            match self.reader.read() {
                None => {
                    self.report(here, ScanError::UnterminatedString);
                    break;
                }
                Some(c) if c == quote => break,
                Some(c) if is_line_end(c) => {
                    self.report(here, ScanError::NewlineInString);
                    value.push(c);
                }
                Some(c) => value.push(c),
            }
        }

        Token::literal(
            TokenKind::LiteralString,
            start,
            self.reader.location(),
            self.raw_text(),
            LiteralValue::String(value),
            LiteralFormat::StringLiteral,
        )
    }

    pub(super) fn xml_name(&mut self, first: char) -> String {
        let mut name = String::from(first);
        self.reader.read_while(&mut name, is_xml_name_char);
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{ClassifierError, ClassifierFlags};
    use crate::config::runtime::LexerPreferences;
    use crate::lexical::ScanError;
    use assert_matches::assert_matches;

    struct AlwaysXml;

    impl LookaheadClassifier for AlwaysXml {
        fn inform(&mut self, _token: Option<&Token>) -> ClassifierFlags {
            ClassifierFlags {
                potential_xml_start: true,
                ..ClassifierFlags::default()
            }
        }

        fn errors(&self) -> &[ClassifierError] {
            &[]
        }
    }

    struct MemberAccess;

    impl LookaheadClassifier for MemberAccess {
        fn inform(&mut self, _token: Option<&Token>) -> ClassifierFlags {
            ClassifierFlags {
                imports_or_access_start: true,
                ..ClassifierFlags::default()
            }
        }

        fn errors(&self) -> &[ClassifierError] {
            &[]
        }
    }

    fn lex_all<C: LookaheadClassifier>(source: &str, classifier: C) -> (Vec<Token>, Scanner<C>) {
        let mut scanner = Scanner::with_classifier(source, classifier, &LexerPreferences::default());
        let tokens = scanner.by_ref().collect();
        (tokens, scanner)
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_element_with_attributes_and_content() {
        use TokenKind::*;
        let (tokens, scanner) = lex_all("<a x='1' y=\"two\">hi there</a>", AlwaysXml);
        assert_eq!(
            kinds(&tokens),
            vec![
                XmlOpenTag, Identifier, Identifier, Assign, LiteralString, Identifier, Assign,
                LiteralString, XmlCloseTag, XmlContent, XmlOpenEndTag, Identifier, XmlCloseTag,
                Eol, Eof
            ]
        );
        assert_eq!(tokens[4].value, LiteralValue::String("1".into()));
        assert_eq!(tokens[4].text, "'1'");
        assert_eq!(tokens[9].text, "hi there");
        assert!(scanner.diagnostics().is_empty());
    }

    #[test]
    fn test_qualified_names() {
        let (tokens, _) = lex_all("<ns:item-one/>", AlwaysXml);
        assert_eq!(tokens[1].text, "ns:item-one");
        assert_eq!(tokens[2].kind, TokenKind::XmlCloseTagEmptyElement);
    }

    #[test]
    fn test_literal_ends_after_outer_element() {
        use TokenKind::*;
        let (tokens, _) = lex_all("<a/> + 1", AlwaysXml);
        assert_eq!(
            kinds(&tokens),
            vec![XmlOpenTag, Identifier, XmlCloseTagEmptyElement, Plus, LiteralInteger, Eol, Eof]
        );
    }

    #[test]
    fn test_comment_and_cdata_sections() {
        let (tokens, scanner) = lex_all("<a><!-- note --><![CDATA[x < y]]></a>", AlwaysXml);
        assert_eq!(tokens[3].kind, TokenKind::XmlComment);
        assert_eq!(tokens[3].text, " note ");
        assert_eq!(tokens[4].kind, TokenKind::XmlCData);
        assert_eq!(tokens[4].text, "x < y");
        assert!(scanner.diagnostics().is_empty());
    }

    #[test]
    fn test_trailing_comment_belongs_to_literal() {
        use TokenKind::*;
        let (tokens, _) = lex_all("<a/>\n  <!-- after -->\nx", AlwaysXml);
        assert_eq!(
            kinds(&tokens),
            vec![
                XmlOpenTag, Identifier, XmlCloseTagEmptyElement, XmlComment, Eol, Identifier, Eol,
                Eof
            ]
        );
    }

    #[test]
    fn test_prolog_then_root_element() {
        use TokenKind::*;
        let (tokens, _) = lex_all("<?xml version=\"1.0\"?><!-- c --><r/> x", AlwaysXml);
        assert_eq!(
            kinds(&tokens),
            vec![
                XmlProcessingInstructionStart, Identifier, Identifier, Assign, LiteralString,
                XmlProcessingInstructionEnd, XmlComment, XmlOpenTag, Identifier,
                XmlCloseTagEmptyElement, Identifier, Eol, Eof
            ]
        );
    }

    #[test]
    fn test_member_access_reads_single_tag() {
        use TokenKind::*;
        let (tokens, _) = lex_all("<child> + 1", MemberAccess);
        assert_eq!(
            kinds(&tokens),
            vec![XmlOpenTag, Identifier, XmlCloseTag, Plus, LiteralInteger, Eol, Eof]
        );
    }

    #[test]
    fn test_malformed_section() {
        let (tokens, scanner) = lex_all("<a><!DOCTYPE a></a>", AlwaysXml);
        assert_eq!(tokens[3].kind, TokenKind::XmlComment);
        assert_matches!(scanner.diagnostics()[0].error, ScanError::MalformedXmlSection);
    }

    #[test]
    fn test_unterminated_section() {
        let (_, scanner) = lex_all("<a><!-- open", AlwaysXml);
        assert_matches!(scanner.diagnostics()[0].error, ScanError::UnterminatedXmlSection);
    }

    #[test]
    fn test_frame_completion() {
        let mut frame = XmlModeFrame::new(false);
        assert!(frame.is_complete());
        frame.level = 1;
        assert!(!frame.is_complete());
        frame.level = 0;
        frame.was_comment = true;
        assert!(!frame.is_complete());
        assert_eq!(XmlModeFrame::new(true).level, -1);
    }
}
