//! Pull-based scanner
//!
//! The scanner lexes one token at a time. Every produced token is fed to a
//! [`LookaheadClassifier`] whose answer decides how the *next* token is
//! lexed: whether `<` opens an XML literal and whether a name is read as an
//! XML name. XML literals are lexed by a sub-lexer kept in `xml.rs`.

use super::error::{Diagnostic, ScanError};
use super::numbers;
use super::reader::{is_identifier_char, is_line_end, is_whitespace, SourceReader};
use super::special::{Comment, CommentKind, Directive, Special, SpecialTracker, TagComment};
use super::xml::XmlModeFrame;
use crate::classifier::{ClassifierError, ClassifierFlags, ExpressionClassifier, LookaheadClassifier};
use crate::config::compile_time::lexical::*;
use crate::config::compile_time::xml::MAX_XML_NESTING;
use crate::config::constants::{is_comment_quote, is_type_character, DOCUMENTATION_MARKER_LENGTH};
use crate::config::runtime::LexerPreferences;
use crate::tokens::{Keyword, LiteralFormat, LiteralValue, Token, TokenKind};
use crate::utils::{Location, Span};
use crate::{log_debug, log_error};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::VecDeque;

/// Date/time layouts accepted inside `#...#`, most specific first
const DATE_TIME_FORMATS: &[&str] = &[
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %I %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%Y-%m-%d"];

const TIME_FORMATS: &[&str] = &["%I:%M:%S %p", "%I:%M %p", "%I %p", "%H:%M:%S", "%H:%M"];

pub struct Scanner<C: LookaheadClassifier = ExpressionClassifier> {
    pub(super) reader: SourceReader,
    classifier: C,
    pub(super) flags: ClassifierFlags,
    specials: SpecialTracker,
    diagnostics: Vec<Diagnostic>,
    comment_tags: Vec<String>,
    report_classifier_errors: bool,
    classifier_errors_seen: usize,

    /// Raw tokens lexed ahead of their turn, not yet classified
    deferred: VecDeque<Token>,
    /// Classified tokens handed out by `peek` but not yet by `next_token`
    lookahead: VecDeque<Token>,
    current: Option<Token>,
    previous_kind: Option<TokenKind>,
    last_produced: Option<TokenKind>,
    eof: Option<Token>,

    /// Character index where the token being lexed starts
    token_start: usize,
    /// True while nothing but whitespace has been seen on the current line
    line_end: bool,
    pub(super) in_xml_mode: bool,
    pub(super) xml_stack: Vec<XmlModeFrame>,
}

impl Scanner<ExpressionClassifier> {
    pub fn new(source: &str) -> Self {
        Self::with_preferences(source, &LexerPreferences::default())
    }

    pub fn with_preferences(source: &str, preferences: &LexerPreferences) -> Self {
        Scanner::with_classifier(source, ExpressionClassifier::new(), preferences)
    }
}

impl<C: LookaheadClassifier> Scanner<C> {
    pub fn with_classifier(source: &str, mut classifier: C, preferences: &LexerPreferences) -> Self {
        let flags = classifier.inform(None);
        Self {
            reader: SourceReader::new(source),
            classifier,
            flags,
            specials: SpecialTracker::new(),
            diagnostics: Vec::new(),
            comment_tags: preferences.comment_tags.clone(),
            report_classifier_errors: preferences.report_classifier_errors,
            classifier_errors_seen: 0,
            deferred: VecDeque::new(),
            lookahead: VecDeque::new(),
            current: None,
            previous_kind: None,
            last_produced: None,
            eof: None,
            token_start: 0,
            line_end: true,
            in_xml_mode: false,
            xml_stack: Vec::new(),
        }
    }

    /// Advances to the next token. Once the end is reached every call
    /// returns the same `Eof` token.
    pub fn next_token(&mut self) -> Token {
        let token = match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.produce(),
        };
        self.previous_kind = self.current.as_ref().map(|t| t.kind);
        self.current = Some(token.clone());
        token
    }

    /// The token the next call to `next_token` will return
    pub fn peek(&mut self) -> &Token {
        let token = match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.produce(),
        };
        self.lookahead.push_front(token);
        &self.lookahead[0]
    }

    /// The token most recently returned by `next_token`
    pub fn current(&self) -> Option<&Token> {
        self.current.as_ref()
    }

    /// Skips tokens until `End <target>` has been consumed or input ends.
    /// Returns the token following the skipped block.
    pub fn skip_current_block(&mut self, target: Keyword) -> Token {
        let target = TokenKind::Keyword(target);
        let end = TokenKind::Keyword(Keyword::End);
        loop {
            let token = self.next_token();
            if token.is_eof() {
                return token;
            }
            if token.kind == target && self.previous_kind == Some(end) {
                return self.next_token();
            }
        }
    }

    pub fn flags(&self) -> ClassifierFlags {
        self.flags
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn specials(&self) -> &[Special] {
        self.specials.specials()
    }

    pub fn tag_comments(&self) -> &[TagComment] {
        self.specials.tag_comments()
    }

    pub fn special_tracker(&self) -> &SpecialTracker {
        &self.specials
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn classifier_errors(&self) -> &[ClassifierError] {
        self.classifier.errors()
    }

    pub fn into_parts(self) -> (Vec<Diagnostic>, SpecialTracker) {
        (self.diagnostics, self.specials)
    }

    /// Records a diagnostic and mirrors it to the logging system
    pub(super) fn report(&mut self, location: Location, error: ScanError) {
        let diagnostic = Diagnostic::new(location, error);
        log_error!(diagnostic.code(), &diagnostic.message(), location = location);
        self.diagnostics.push(diagnostic);
    }

    fn produce(&mut self) -> Token {
        if let Some(eof) = &self.eof {
            return eof.clone();
        }

        let token = match self.deferred.pop_front() {
            Some(token) => token,
            None => self.lex(),
        };

        self.classifier.inform(Some(&token));
        self.flags = self.classifier.inform(None);
        self.mirror_classifier_errors();

        self.last_produced = Some(token.kind);
        if token.is_eof() {
            self.eof = Some(token.clone());
        }
        token
    }

    fn mirror_classifier_errors(&mut self) {
        let errors = self.classifier.errors();
        for error in errors.iter().skip(self.classifier_errors_seen) {
            let message = error.to_string();
            if self.report_classifier_errors {
                log_error!(error.code(), &message, location = error.location);
            } else {
                log_debug!(&message, "location" => error.location);
            }
        }
        self.classifier_errors_seen = errors.len();
    }

    fn lex(&mut self) -> Token {
        loop {
            if self.in_xml_mode {
                if let Some(token) = self.leave_xml_mode_or_read_trailing() {
                    self.line_end = false;
                    return token;
                }
            }

            self.token_start = self.reader.position();
            let start = self.reader.location();
            let Some(ch) = self.reader.peek() else {
                return self.end_of_input(start);
            };

            let token = if self.in_xml_mode {
                self.reader.read();
                self.lex_xml(ch, start)
            } else if self.starts_number(ch) {
                Some(self.number())
            } else {
                self.reader.read();
                self.lex_standard(ch, start)
            };

            if let Some(token) = token {
                if token.kind != TokenKind::Eol {
                    self.line_end = false;
                }
                return token;
            }
        }
    }

    /// An `Eol` is synthesized before `Eof` unless the last token was one
    fn end_of_input(&mut self, at: Location) -> Token {
        if self.last_produced != Some(TokenKind::Eol) {
            self.line_end = true;
            return Token::new(TokenKind::Eol, at, at, "");
        }
        Token::new(TokenKind::Eof, at, at, "")
    }

    /// Source text of the token being lexed
    pub(super) fn raw_text(&self) -> String {
        self.reader.slice(self.token_start, self.reader.position())
    }

    fn symbol(&self, kind: TokenKind, start: Location) -> Token {
        Token::symbol(kind, start, self.reader.location())
    }

    fn starts_number(&self, ch: char) -> bool {
        match ch {
            '0'..='9' => true,
            '&' => self.reader.peek_at(1).is_some_and(|c| matches!(c, 'H' | 'h' | 'O' | 'o')),
            '.' => self.reader.peek_at(1).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    fn lex_standard(&mut self, ch: char, start: Location) -> Option<Token> {
        if is_whitespace(ch) {
            if self.reader.finish_line_end(ch) {
                if self.line_end {
                    self.specials.add_blank_line(start);
                } else {
                    self.line_end = true;
                    return Some(Token::new(TokenKind::Eol, start, self.reader.location(), ""));
                }
            }
            return None;
        }

        match ch {
            '_' => self.line_continuation(start),
            '#' => self.hash(start),
            '[' => Some(self.escaped_identifier(start)),
            '"' => Some(self.string(start)),
            c if is_comment_quote(c) => self.comment(start, true),
            c if c.is_alphabetic() => self.word(c, start),
            '%' if self.reader.peek_is('>') => {
                self.reader.read();
                self.in_xml_mode = !self.xml_stack.is_empty();
                Some(self.symbol(TokenKind::XmlEndInlineVB, start))
            }
            '<' if self.xml_may_start() => Some(self.enter_xml_mode(start)),
            c => match self.operator(c, start) {
                Some(token) => Some(token),
                None => {
                    self.report(start, ScanError::UnknownCharacter { character: c });
                    None
                }
            },
        }
    }

    fn xml_may_start(&self) -> bool {
        if !(self.flags.potential_xml_start || self.flags.imports_or_access_start) {
            return false;
        }
        if self.xml_stack.len() >= MAX_XML_NESTING {
            log_debug!("XML nesting limit reached, '<' read as operator", "depth" => self.xml_stack.len());
            return false;
        }
        true
    }

    fn number(&mut self) -> Token {
        let scan = numbers::scan_number(&mut self.reader);
        for diagnostic in scan.errors {
            self.report(diagnostic.location, diagnostic.error);
        }
        if let Some(dot) = scan.trailing_dot {
            self.deferred.push_back(dot);
        }
        scan.token
    }

    /// `_` either continues the line or starts an identifier
    fn line_continuation(&mut self, start: Location) -> Option<Token> {
        match self.reader.peek() {
            None => {
                self.report(self.reader.location(), ScanError::EofAfterLineContinuation);
                return None;
            }
            Some(c) if !is_whitespace(c) => return Some(self.identifier('_', start)),
            Some(_) => {}
        }

        loop {
            let Some(ch) = self.reader.peek() else {
                self.report(self.reader.location(), ScanError::EofAfterLineContinuation);
                return None;
            };
            if !is_whitespace(ch) {
                // The character is lexed normally on the next round
                self.report(self.reader.location(), ScanError::ReturnExpected);
                return None;
            }
            self.reader.read();
            if self.reader.finish_line_end(ch) {
                return None;
            }
        }
    }

    /// `#` opens a date literal when a digit follows, otherwise a
    /// preprocessor directive
    fn hash(&mut self, start: Location) -> Option<Token> {
        while self.reader.peek_matches(|c| is_whitespace(c) && !is_line_end(c)) {
            self.reader.read();
        }

        if self.reader.peek_matches(|c| c.is_ascii_digit()) {
            return Some(self.date(start));
        }

        let mut name = String::from("#");
        self.reader.read_while(&mut name, is_identifier_char);
        let argument = self.reader.read_to_end_of_line();
        let argument = argument.trim().to_string();
        let end = Location::new(
            start.line,
            start.column + (name.chars().count() + argument.chars().count()) as u32,
        );
        self.specials.add_directive(Directive {
            name,
            argument,
            span: Span::new(start, end),
        });

        if self.line_end {
            return None;
        }
        self.line_end = true;
        Some(Token::new(TokenKind::Eol, end, self.reader.location(), ""))
    }

    fn date(&mut self, start: Location) -> Token {
        let mut text = String::new();
        loop {
            let here = self.reader.location();
            match self.reader.read() {
                None => {
                    self.report(here, ScanError::UnterminatedDate);
                    break;
                }
                Some('#') => break,
                Some(c) if self.reader.finish_line_end(c) => {
                    self.report(here, ScanError::NewlineInDate);
                }
                Some(c) => text.push(c),
            }
        }

        let value = match parse_date(&text) {
            Some(value) => value,
            None => {
                self.report(start, ScanError::InvalidDate { text: text.trim().to_string() });
                default_date()
            }
        };

        Token::literal(
            TokenKind::LiteralDate,
            start,
            self.reader.location(),
            self.raw_text(),
            LiteralValue::Date(value),
            LiteralFormat::DateTimeLiteral,
        )
    }

    fn escaped_identifier(&mut self, start: Location) -> Token {
        match self.reader.peek() {
            Some(c) if is_identifier_char(c) => {}
            _ => self.report(self.reader.location(), ScanError::IdentifierExpected),
        }

        let mut name = String::new();
        self.reader.read_while(&mut name, is_identifier_char);
        if !self.reader.eat(']') {
            self.report(self.reader.location(), ScanError::UnterminatedEscapedIdentifier);
        }
        self.check_identifier_length(start, &name);
        Token::new(TokenKind::Identifier, start, self.reader.location(), name)
    }

    /// A word starting with a letter: keyword, `REM` comment or identifier
    fn word(&mut self, first: char, start: Location) -> Option<Token> {
        if self.flags.read_xml_identifier {
            return Some(self.identifier(first, start));
        }

        let mut text = String::from(first);
        self.reader.read_while(&mut text, is_identifier_char);

        match self.type_character() {
            Some(type_char) => text.push(type_char),
            None => {
                if let Some(keyword) = Keyword::from_str(&text) {
                    if keyword == Keyword::Rem {
                        return self.comment(start, false);
                    }
                    return Some(Token::new(
                        TokenKind::Keyword(keyword),
                        start,
                        self.reader.location(),
                        text,
                    ));
                }
            }
        }

        self.check_identifier_length(start, &text);
        Some(Token::new(TokenKind::Identifier, start, self.reader.location(), text))
    }

    /// Reads the rest of an identifier whose first character was consumed.
    /// Reads an XML name when the classifier asks for one.
    fn identifier(&mut self, first: char, start: Location) -> Token {
        if self.flags.read_xml_identifier {
            self.flags.read_xml_identifier = false;
            let name = self.xml_name(first);
            return Token::new(TokenKind::Identifier, start, self.reader.location(), name);
        }

        let mut text = String::from(first);
        self.reader.read_while(&mut text, is_identifier_char);
        if let Some(type_char) = self.type_character() {
            text.push(type_char);
        }
        self.check_identifier_length(start, &text);
        Token::new(TokenKind::Identifier, start, self.reader.location(), text)
    }

    /// Consumes a trailing type character. A `!` followed by a name start is
    /// dictionary access instead; it is consumed and queued as its own token.
    fn type_character(&mut self) -> Option<char> {
        let ch = self.reader.peek().filter(|c| is_type_character(*c))?;
        let next = self.reader.peek_at(1);

        if ch == '%' && next == Some('>') {
            return None;
        }
        if ch == '!' && next.is_some_and(|c| c == '_' || c == '[' || c.is_alphabetic()) {
            let at = self.reader.location();
            self.reader.read();
            self.deferred
                .push_back(Token::symbol(TokenKind::ExclamationMark, at, self.reader.location()));
            return None;
        }

        self.reader.read();
        Some(ch)
    }

    fn check_identifier_length(&mut self, start: Location, name: &str) {
        let length = name.chars().count();
        if length > MAX_IDENTIFIER_LENGTH {
            self.report(start, ScanError::IdentifierTooLong { length });
        }
    }

    /// Reads a comment whose introducer (quote or `REM`) was consumed. The
    /// comment becomes a special; an `Eol` is returned when the line had
    /// tokens before it.
    fn comment(&mut self, start: Location, quoted: bool) -> Option<Token> {
        let starts_line = self.line_end;
        let mut kind = CommentKind::SingleLine;
        let mut missing_quotes = if quoted { DOCUMENTATION_MARKER_LENGTH } else { 0 };
        let mut text = String::new();
        let mut word = String::new();
        let mut word_start = start;
        let mut tag: Option<(String, Location, String)> = None;
        let mut line_break = None;

        loop {
            let here = self.reader.location();
            let Some(ch) = self.reader.read() else { break };
            if self.reader.finish_line_end(ch) {
                line_break = Some(here);
                break;
            }

            text.push(ch);
            if missing_quotes > 0 {
                if is_comment_quote(ch) {
                    missing_quotes -= 1;
                    if missing_quotes == 0 {
                        kind = CommentKind::Documentation;
                        text.clear();
                    }
                } else {
                    missing_quotes = 0;
                }
            }

            if let Some((_, _, tag_text)) = tag.as_mut() {
                tag_text.push(ch);
            } else if ch.is_alphabetic() {
                if word.is_empty() {
                    word_start = here;
                }
                word.push(ch);
            } else if self.is_comment_tag(&word) {
                tag = Some((std::mem::take(&mut word), word_start, ch.to_string()));
            } else {
                word.clear();
            }
        }

        let end = line_break.unwrap_or_else(|| self.reader.location());
        if tag.is_none() && self.is_comment_tag(&word) {
            tag = Some((word, word_start, String::new()));
        }
        if let Some((tag, tag_start, tag_text)) = tag {
            self.specials.add_tag_comment(TagComment {
                tag,
                text: tag_text,
                starts_line,
                span: Span::new(tag_start, end),
            });
        }

        let length = text.chars().count();
        if length > MAX_COMMENT_LENGTH {
            self.report(start, ScanError::CommentTooLong { length });
        }
        self.specials.add_comment(Comment {
            kind,
            text,
            starts_line,
            span: Span::new(start, end),
        });

        if self.line_end {
            return None;
        }
        self.line_end = true;
        Some(Token::new(TokenKind::Eol, end, self.reader.location(), ""))
    }

    fn is_comment_tag(&self, word: &str) -> bool {
        !word.is_empty() && self.comment_tags.iter().any(|tag| tag == word)
    }

    /// String literal, or a character literal when `c` follows the closing
    /// quote. `""` inside the literal stands for one quote.
    fn string(&mut self, start: Location) -> Token {
        let mut value = String::new();
        let mut terminated = false;
        loop {
            let here = self.reader.location();
            match self.reader.read() {
                None => break,
                Some('"') => {
                    if !self.reader.eat('"') {
                        terminated = true;
                        break;
                    }
                    value.push('"');
                }
                Some(c) if self.reader.finish_line_end(c) => {
                    self.report(here, ScanError::NewlineInString);
                }
                Some(c) => value.push(c),
            }
        }

        if !terminated {
            self.report(self.reader.location(), ScanError::UnterminatedString);
        }
        let size = value.chars().count();
        if size > MAX_STRING_SIZE {
            self.report(start, ScanError::StringTooLarge { size });
        }

        if terminated && self.reader.peek_matches(|c| c == 'c' || c == 'C') {
            self.reader.read();
            let mut chars = value.chars();
            let ch = match (chars.next(), chars.next()) {
                (Some(ch), None) => ch,
                (first, _) => {
                    self.report(start, ScanError::InvalidCharacterLiteral);
                    first.unwrap_or('\0')
                }
            };
            return Token::literal(
                TokenKind::LiteralCharacter,
                start,
                self.reader.location(),
                self.raw_text(),
                LiteralValue::Char(ch),
                LiteralFormat::CharLiteral,
            );
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

    /// Operators and punctuation, longest match first. `None` for a
    /// character that starts no token.
    fn operator(&mut self, ch: char, start: Location) -> Option<Token> {
        use TokenKind::*;

        let kind = match ch {
            '+' => self.with_assign(Plus, PlusAssign),
            '-' => self.with_assign(Minus, MinusAssign),
            '*' => self.with_assign(Times, TimesAssign),
            '/' => self.with_assign(Div, DivAssign),
            '\\' => self.with_assign(DivInteger, DivIntegerAssign),
            '&' => self.with_assign(ConcatString, ConcatStringAssign),
            '^' => self.with_assign(Power, PowerAssign),
            ':' => self.with_assign(Colon, ColonAssign),
            '=' => Assign,
            '<' => {
                if self.reader.eat('>') {
                    NotEqual
                } else if self.reader.eat('=') {
                    LessEqual
                } else if self.reader.eat('<') {
                    self.with_assign(ShiftLeft, ShiftLeftAssign)
                } else {
                    LessThan
                }
            }
            '>' => {
                if self.reader.eat('=') {
                    GreaterEqual
                } else if self.reader.eat('>') {
                    self.with_assign(ShiftRight, ShiftRightAssign)
                } else {
                    GreaterThan
                }
            }
            '.' => {
                if self.reader.eat('@') {
                    DotAt
                } else if self.reader.peek_is('.') && self.reader.peek_at(1) == Some('.') {
                    self.reader.read();
                    self.reader.read();
                    TripleDot
                } else {
                    Dot
                }
            }
            ',' => Comma,
            '!' => ExclamationMark,
            '?' => QuestionMark,
            '(' => OpenParenthesis,
            ')' => CloseParenthesis,
            '{' => OpenCurlyBrace,
            '}' => CloseCurlyBrace,
            _ => return None,
        };
        Some(self.symbol(kind, start))
    }

    fn with_assign(&mut self, plain: TokenKind, assign: TokenKind) -> TokenKind {
        if self.reader.eat('=') {
            assign
        } else {
            plain
        }
    }
}

impl<C: LookaheadClassifier> Iterator for Scanner<C> {
    type Item = Token;

    /// Yields every token up to and including `Eof`
    fn next(&mut self) -> Option<Token> {
        if self.current.as_ref().is_some_and(Token::is_eof) {
            return None;
        }
        Some(self.next_token())
    }
}

/// Parses the inside of a date literal. A time without a date gets the
/// date 0001-01-01, a date without a time gets midnight.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();

    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .or_else(|| {
            TIME_FORMATS
                .iter()
                .find_map(|format| NaiveTime::parse_from_str(text, format).ok())
                .map(|time| default_date().date().and_time(time))
        })
}

/// 0001-01-01 00:00:00, the value of a date literal that failed to parse
pub fn default_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .map(|date| date.and_time(NaiveTime::MIN))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    // `use TokenKind::*` shadows the `Keyword` type with the variant
    use crate::tokens::Keyword as Kw;

    /// Classifier answering the same flags for every token
    struct FixedFlags(ClassifierFlags);

    impl LookaheadClassifier for FixedFlags {
        fn inform(&mut self, _token: Option<&Token>) -> ClassifierFlags {
            self.0
        }

        fn errors(&self) -> &[ClassifierError] {
            &[]
        }
    }

    fn preferences() -> LexerPreferences {
        LexerPreferences {
            comment_tags: vec!["TODO".into(), "HACK".into()],
            report_classifier_errors: false,
            collect_detailed_metrics: false,
        }
    }

    fn scanner(source: &str) -> Scanner {
        Scanner::with_preferences(source, &preferences())
    }

    fn fixed(source: &str, potential_xml_start: bool) -> Scanner<FixedFlags> {
        let flags = ClassifierFlags {
            potential_xml_start,
            ..ClassifierFlags::default()
        };
        Scanner::with_classifier(source, FixedFlags(flags), &preferences())
    }

    fn kinds<C: LookaheadClassifier>(scanner: Scanner<C>) -> Vec<TokenKind> {
        scanner.map(|t| t.kind).collect()
    }

    fn kw(keyword: Keyword) -> TokenKind {
        TokenKind::Keyword(keyword)
    }

    #[test]
    fn test_empty_input_yields_eol_then_repeating_eof() {
        let mut scanner = scanner("");
        assert_eq!(scanner.next_token().kind, TokenKind::Eol);
        let eof = scanner.next_token();
        assert!(eof.is_eof());
        assert_eq!(scanner.next_token(), eof);
        assert_eq!(scanner.next_token(), eof);
    }

    #[test]
    fn test_single_eol_before_eof() {
        use TokenKind::*;
        assert_eq!(kinds(scanner("x\n")), vec![Identifier, Eol, Eof]);
        assert_eq!(kinds(scanner("x")), vec![Identifier, Eol, Eof]);
    }

    #[test]
    fn test_line_continuation_joins_lines() {
        use TokenKind::*;
        let tokens: Vec<Token> = scanner("Dim x = 5 _\n  + 1\n").collect();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![kw(Kw::Dim), Identifier, Assign, LiteralInteger, Plus, LiteralInteger, Eol, Eof]
        );
        assert_eq!(tokens[5].start, Location::new(2, 5));
    }

    #[test]
    fn test_line_continuation_errors() {
        let mut at_end = scanner("x _");
        let kinds: Vec<TokenKind> = at_end.by_ref().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Identifier, TokenKind::Eol, TokenKind::Eof]);
        assert_matches!(at_end.diagnostics()[0].error, ScanError::EofAfterLineContinuation);

        let mut trailing = scanner("a _ b\n");
        let texts: Vec<String> = trailing.by_ref().map(|t| t.text).collect();
        assert_eq!(texts[..2], ["a".to_string(), "b".to_string()]);
        assert_matches!(trailing.diagnostics()[0].error, ScanError::ReturnExpected);
    }

    #[test]
    fn test_underscore_identifier() {
        let token = scanner("_value").next_token();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.text, "_value");
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let tokens: Vec<Token> = scanner("dim DIM Dim").collect();
        assert!(tokens[..3].iter().all(|t| t.kind == kw(Keyword::Dim)));
        assert_eq!(tokens[1].text, "DIM");
    }

    #[test]
    fn test_escaped_identifier() {
        let mut scanner = scanner("[Dim] = 1");
        let token = scanner.next_token();
        assert_eq!(token.kind, TokenKind::Identifier);
        assert_eq!(token.text, "Dim");
        assert!(scanner.diagnostics().is_empty());

        let mut unterminated = super::tests::scanner("[Dim = 1");
        unterminated.next_token();
        assert_matches!(
            unterminated.diagnostics()[0].error,
            ScanError::UnterminatedEscapedIdentifier
        );
    }

    #[test]
    fn test_type_characters_and_dictionary_access() {
        use TokenKind::*;
        let tokens: Vec<Token> = scanner("name$ = a!b").collect();
        assert_eq!(tokens[0].text, "name$");
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![Identifier, Assign, Identifier, ExclamationMark, Identifier, Eol, Eof]
        );
        assert_eq!(tokens[2].text, "a");
        assert_eq!(tokens[4].text, "b");

        let single: Vec<Token> = scanner("x! ").collect();
        assert_eq!(single[0].text, "x!");
    }

    #[test]
    fn test_less_than_is_operator_without_xml_flag() {
        use TokenKind::*;
        assert_eq!(
            kinds(fixed("a < b <= c <> d << 2 <<= 1", false)),
            vec![
                Identifier, LessThan, Identifier, LessEqual, Identifier, NotEqual, Identifier,
                ShiftLeft, LiteralInteger, ShiftLeftAssign, LiteralInteger, Eol, Eof
            ]
        );
    }

    #[test]
    fn test_xml_literal_with_embedded_expression() {
        use TokenKind::*;
        let tokens: Vec<Token> = fixed("<x><%= y %></x>", true).collect();
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                XmlOpenTag, Identifier, XmlCloseTag, XmlStartInlineVB, Identifier,
                XmlEndInlineVB, XmlOpenEndTag, Identifier, XmlCloseTag, Eol, Eof
            ]
        );
        assert_eq!(tokens[1].text, "x");
        assert_eq!(tokens[4].text, "y");
    }

    #[test]
    fn test_xml_literal_after_assignment() {
        use TokenKind::*;
        let kinds = kinds(scanner("Dim a = <x><%= y %></x>\n"));
        assert_eq!(
            kinds,
            vec![
                kw(Kw::Dim), Identifier, Assign, XmlOpenTag, Identifier, XmlCloseTag,
                XmlStartInlineVB, Identifier, XmlEndInlineVB, XmlOpenEndTag, Identifier,
                XmlCloseTag, Eol, Eof
            ]
        );
    }

    #[test]
    fn test_comparison_is_not_xml() {
        use TokenKind::*;
        let kinds = kinds(scanner("If a < b Then\n"));
        assert_eq!(
            kinds,
            vec![kw(Kw::If), Identifier, LessThan, Identifier, kw(Kw::Then), Eol, Eof]
        );
    }

    #[test]
    fn test_comments_and_documentation() {
        let mut scanner = scanner("''' <summary>\nx = 1 ' trailing\nREM old style\n");
        let kinds: Vec<TokenKind> = scanner.by_ref().map(|t| t.kind).collect();
        assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Eol).count(), 1);

        let comments: Vec<&Comment> = scanner.special_tracker().comments().collect();
        assert_eq!(comments.len(), 3);
        assert_eq!(comments[0].kind, CommentKind::Documentation);
        assert_eq!(comments[0].text, " <summary>");
        assert!(comments[0].starts_line);
        assert_eq!(comments[1].kind, CommentKind::SingleLine);
        assert_eq!(comments[1].text, " trailing");
        assert!(!comments[1].starts_line);
        assert_eq!(comments[2].text, " old style");
    }

    #[test]
    fn test_tag_comments() {
        let mut scanner = scanner("' TODO: fix this\n' HACK\n' todo lower\n");
        scanner.by_ref().for_each(drop);
        let tags = scanner.tag_comments();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].tag, "TODO");
        assert_eq!(tags[0].text, ": fix this");
        assert_eq!(tags[0].span.start, Location::new(1, 3));
        assert_eq!(tags[1].tag, "HACK");
        assert_eq!(tags[1].text, "");
    }

    #[test]
    fn test_directives_and_blank_lines() {
        let mut scanner = scanner("#Region \"Setup\"\n\nx\n");
        let kinds: Vec<TokenKind> = scanner.by_ref().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Identifier, TokenKind::Eol, TokenKind::Eof]);

        let specials = scanner.specials();
        assert_matches!(
            &specials[0],
            Special::Directive(d) if d.name == "#Region" && d.argument == "\"Setup\""
        );
        assert_matches!(specials[1], Special::BlankLine(l) if l == Location::new(2, 1));
    }

    #[test]
    fn test_string_and_character_literals() {
        let tokens: Vec<Token> = scanner(r#""say ""hi""" "x"c"#).collect();
        assert_eq!(tokens[0].value, LiteralValue::String("say \"hi\"".into()));
        assert_eq!(tokens[0].text, r#""say ""hi""""#);
        assert_eq!(tokens[1].kind, TokenKind::LiteralCharacter);
        assert_eq!(tokens[1].value, LiteralValue::Char('x'));
    }

    #[test]
    fn test_string_errors() {
        let mut long_char = scanner(r#""ab"c"#);
        long_char.next_token();
        assert_matches!(long_char.diagnostics()[0].error, ScanError::InvalidCharacterLiteral);

        let mut open = scanner("\"abc");
        let token = open.next_token();
        assert_eq!(token.value, LiteralValue::String("abc".into()));
        assert_matches!(open.diagnostics()[0].error, ScanError::UnterminatedString);
    }

    #[test]
    fn test_date_literals() {
        let tokens: Vec<Token> = scanner("#1/2/2003# #12:30:00 PM# #2003-01-02 13:45:00#").collect();
        assert_eq!(
            tokens[0].value,
            LiteralValue::Date(parse_date("1/2/2003").unwrap())
        );
        assert_matches!(tokens[0].value, LiteralValue::Date(d) if d.to_string() == "2003-01-02 00:00:00");
        assert_matches!(tokens[1].value, LiteralValue::Date(d) if d.to_string() == "0001-01-01 12:30:00");
        assert_matches!(tokens[2].value, LiteralValue::Date(d) if d.to_string() == "2003-01-02 13:45:00");
        assert_eq!(tokens[0].format, LiteralFormat::DateTimeLiteral);
    }

    #[test]
    fn test_invalid_date_falls_back() {
        let mut scanner = scanner("#13/45/2000#");
        let token = scanner.next_token();
        assert_eq!(token.value, LiteralValue::Date(default_date()));
        assert_matches!(&scanner.diagnostics()[0].error, ScanError::InvalidDate { text } if text == "13/45/2000");
    }

    #[test]
    fn test_integer_followed_by_member_access() {
        use TokenKind::*;
        assert_eq!(
            kinds(scanner("5.ToString")),
            vec![LiteralInteger, Dot, Identifier, Eol, Eof]
        );
    }

    #[test]
    fn test_operators() {
        use TokenKind::*;
        assert_eq!(
            kinds(fixed("+= -= *= /= \\= &= ^= := .@ ... >>= >= ? {}", false)),
            vec![
                PlusAssign, MinusAssign, TimesAssign, DivAssign, DivIntegerAssign,
                ConcatStringAssign, PowerAssign, ColonAssign, DotAt, TripleDot,
                ShiftRightAssign, GreaterEqual, QuestionMark, OpenCurlyBrace, CloseCurlyBrace,
                Eol, Eof
            ]
        );
    }

    #[test]
    fn test_unknown_character_is_skipped() {
        let mut scanner = scanner("a § b");
        let texts: Vec<String> = scanner.by_ref().map(|t| t.text).collect();
        assert_eq!(texts[..2], ["a".to_string(), "b".to_string()]);
        assert_matches!(
            scanner.diagnostics()[0].error,
            ScanError::UnknownCharacter { character: '§' }
        );
        assert_eq!(scanner.diagnostics()[0].location, Location::new(1, 3));
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut scanner = scanner("a b");
        assert_eq!(scanner.peek().text, "a");
        assert_eq!(scanner.peek().text, "a");
        assert_eq!(scanner.next_token().text, "a");
        assert_eq!(scanner.current().map(|t| t.text.as_str()), Some("a"));
        assert_eq!(scanner.next_token().text, "b");
    }

    #[test]
    fn test_skip_current_block() {
        let source = "Sub A()\n  If x Then\n  End If\nEnd Sub\nDim y\n";
        let mut scanner = scanner(source);
        assert_eq!(scanner.next_token().kind, kw(Keyword::Sub));
        let after = scanner.skip_current_block(Keyword::Sub);
        assert_eq!(after.kind, TokenKind::Eol);
        assert_eq!(scanner.next_token().kind, kw(Keyword::Dim));

        let mut unterminated = super::tests::scanner("Sub A()\n");
        assert!(unterminated.skip_current_block(Keyword::Sub).is_eof());
    }

    #[test]
    fn test_literal_text_reparses_to_same_value() {
        let source = "&H1F 12.5@ 3.25R \"a\"\"b\" #1/2/2003# 42L";
        let tokens: Vec<Token> = scanner(source).filter(|t| t.kind.is_literal()).collect();
        assert_eq!(tokens.len(), 6);
        for token in tokens {
            let again = super::tests::scanner(&token.text).next_token();
            assert_eq!(again.value, token.value, "{}", token.text);
            assert_eq!(again.kind, token.kind);
        }
    }

    #[test]
    fn test_locations() {
        let tokens: Vec<Token> = scanner("Dim x\r\n  y = 1").collect();
        assert_eq!(tokens[0].start, Location::new(1, 1));
        assert_eq!(tokens[0].end, Location::new(1, 4));
        assert_eq!(tokens[3].start, Location::new(2, 3));
    }
}
