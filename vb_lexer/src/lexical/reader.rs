//! Character reader with line/column tracking and bounded lookahead

use crate::utils::Location;

/// Reads source text one character at a time.
///
/// `\n`, `\r\n` and a lone `\r` each advance the line once. Columns count
/// characters.
#[derive(Debug, Clone)]
pub struct SourceReader {
    chars: Vec<char>,
    position: usize,
    line: u32,
    column: u32,
}

impl SourceReader {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Location of the next character to be read
    pub fn location(&self) -> Location {
        Location::new(self.line, self.column)
    }

    /// Character index of the next character to be read
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.chars.len()
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    /// Character `k` places after the next one; `peek_at(0) == peek()`
    pub fn peek_at(&self, k: usize) -> Option<char> {
        self.chars.get(self.position + k).copied()
    }

    pub fn peek_is(&self, expected: char) -> bool {
        self.peek() == Some(expected)
    }

    pub fn peek_matches(&self, predicate: impl Fn(char) -> bool) -> bool {
        self.peek().is_some_and(predicate)
    }

    pub fn read(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.position += 1;

        match ch {
            '\n' => self.new_line(),
            // The line advances on the '\n' of a "\r\n" pair
            '\r' if self.peek() != Some('\n') => self.new_line(),
            _ => self.column += 1,
        }
        Some(ch)
    }

    fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    /// Reads the next character if it equals `expected`
    pub fn eat(&mut self, expected: char) -> bool {
        if self.peek_is(expected) {
            self.read();
            true
        } else {
            false
        }
    }

    /// Reads `expected` if the upcoming characters spell it exactly
    pub fn eat_str(&mut self, expected: &str) -> bool {
        let matches = expected
            .chars()
            .enumerate()
            .all(|(k, ch)| self.peek_at(k) == Some(ch));
        if matches {
            for _ in expected.chars() {
                self.read();
            }
        }
        matches
    }

    /// Reads characters while `predicate` holds, appending them to `buffer`
    pub fn read_while(&mut self, buffer: &mut String, predicate: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !predicate(ch) {
                break;
            }
            buffer.push(ch);
            self.read();
        }
    }

    /// Completes a line end whose first character `ch` was just read.
    /// Returns false if `ch` does not start a line end.
    pub fn finish_line_end(&mut self, ch: char) -> bool {
        match ch {
            '\r' => {
                self.eat('\n');
                true
            }
            '\n' => true,
            _ => false,
        }
    }

    /// Reads up to and including the next line end. The line end is not
    /// part of the returned text.
    pub fn read_to_end_of_line(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.read() {
            if self.finish_line_end(ch) {
                break;
            }
            text.push(ch);
        }
        text
    }

    /// Source text between two character positions
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.chars.len());
        let start = start.min(end);
        self.chars[start..end].iter().collect()
    }
}

pub fn is_line_end(ch: char) -> bool {
    ch == '\n' || ch == '\r'
}

/// Whitespace as the scanner sees it, line ends included
pub fn is_whitespace(ch: char) -> bool {
    ch.is_whitespace()
}

/// Whitespace characters allowed between XML markup
pub fn is_xml_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

pub fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Characters allowed after the first character of an XML name. `:` is
/// accepted so qualified names read as one identifier.
pub fn is_xml_name_char(ch: char) -> bool {
    ch.is_alphanumeric()
        || matches!(ch, '_' | '-' | '.' | ':' | '\u{B7}')
        || ('\u{0300}'..='\u{036F}').contains(&ch)
        || ('\u{203F}'..='\u{2040}').contains(&ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locations_across_line_ends() {
        let mut reader = SourceReader::new("ab\r\nc\rd\ne");
        let mut seen = Vec::new();
        while !reader.is_eof() {
            let location = reader.location();
            let ch = reader.read().unwrap();
            if !is_line_end(ch) {
                seen.push((ch, location));
            }
        }

        assert_eq!(
            seen,
            vec![
                ('a', Location::new(1, 1)),
                ('b', Location::new(1, 2)),
                ('c', Location::new(2, 1)),
                ('d', Location::new(3, 1)),
                ('e', Location::new(4, 1)),
            ]
        );
    }

    #[test]
    fn test_line_end_resets_column() {
        let mut reader = SourceReader::new("Dim\nx");
        reader.read_while(&mut String::new(), |c| c.is_alphabetic());
        assert_eq!(reader.location(), Location::new(1, 4));

        assert_eq!(reader.read(), Some('\n'));
        assert_eq!(reader.location(), Location::new(2, 1));
    }

    #[test]
    fn test_peek_past_end() {
        let reader = SourceReader::new("xy");
        assert_eq!(reader.peek_at(1), Some('y'));
        assert_eq!(reader.peek_at(2), None);
        assert_eq!(reader.peek_at(100), None);
    }

    #[test]
    fn test_read_to_end_of_line_consumes_break() {
        let mut reader = SourceReader::new(" rest of line\r\nnext");
        assert_eq!(reader.read_to_end_of_line(), " rest of line");
        assert_eq!(reader.location(), Location::new(2, 1));
        assert_eq!(reader.peek(), Some('n'));
    }

    #[test]
    fn test_slice_and_eat() {
        let mut reader = SourceReader::new("&H1F");
        assert!(reader.eat('&'));
        assert!(!reader.eat('&'));
        let mut digits = String::new();
        reader.read();
        reader.read_while(&mut digits, |c| c.is_ascii_hexdigit());
        assert_eq!(digits, "1F");
        assert_eq!(reader.slice(0, reader.position()), "&H1F");
    }

    #[test]
    fn test_xml_name_chars() {
        assert!(is_xml_name_char(':'));
        assert!(is_xml_name_char('-'));
        assert!(!is_xml_name_char('>'));
        assert!(!is_xml_name_char('='));
    }
}
