//! Numeric literal scanning
//!
//! Handles decimal, `&H` hexadecimal and `&O` octal integers with their type
//! suffixes, and floating literals with fraction, exponent and `R`/`D`/`F`
//! suffixes.

use super::error::{Diagnostic, ScanError};
use super::reader::SourceReader;
use crate::tokens::{Decimal, LiteralFormat, LiteralValue, Token, TokenKind};
use crate::utils::Location;

/// Result of scanning one numeric literal
#[derive(Debug)]
pub struct NumberScan {
    pub token: Token,
    /// Dot read after an integer that turned out not to start a fraction
    pub trailing_dot: Option<Token>,
    pub errors: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    Decimal,
    Hexadecimal,
    Octal,
}

impl Base {
    fn format(self) -> LiteralFormat {
        match self {
            Base::Decimal => LiteralFormat::DecimalNumber,
            Base::Hexadecimal => LiteralFormat::HexadecimalNumber,
            Base::Octal => LiteralFormat::OctalNumber,
        }
    }

    fn accepts(self, ch: char) -> bool {
        match self {
            Base::Decimal => ch.is_ascii_digit(),
            Base::Hexadecimal => ch.is_ascii_hexdigit(),
            Base::Octal => ('0'..='7').contains(&ch),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntegerSuffix {
    Short,
    UShort,
    Integer,
    UInteger,
    Long,
    ULong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FloatSuffix {
    Double,
    Decimal,
    Single,
}

/// Scans a numeric literal. The reader must be positioned on a digit, on
/// `&` followed by `H`/`O`, or on `.` followed by a digit.
pub fn scan_number(reader: &mut SourceReader) -> NumberScan {
    let mut scanner = NumberScanner {
        start: reader.location(),
        start_position: reader.position(),
        reader,
        errors: Vec::new(),
    };
    let (token, trailing_dot) = scanner.scan();
    NumberScan {
        token,
        trailing_dot,
        errors: scanner.errors,
    }
}

struct NumberScanner<'r> {
    reader: &'r mut SourceReader,
    start: Location,
    start_position: usize,
    errors: Vec<Diagnostic>,
}

impl NumberScanner<'_> {
    fn scan(&mut self) -> (Token, Option<Token>) {
        if self.reader.eat('&') {
            let base = match self.reader.read() {
                Some('H' | 'h') => Base::Hexadecimal,
                _ => Base::Octal,
            };
            let mut digits = String::new();
            self.reader.read_while(&mut digits, |c| base.accepts(c));
            if digits.is_empty() {
                self.error(self.start, ScanError::DigitExpected);
                return (
                    self.token(TokenKind::LiteralInteger, LiteralValue::Int32(0), base.format()),
                    None,
                );
            }
            let suffix = self.integer_suffix();
            return (self.integer(&digits, base, suffix), None);
        }

        let mut integral = String::new();
        self.reader.read_while(&mut integral, |c| c.is_ascii_digit());

        let mut fraction = String::new();
        let mut is_float = false;

        if self.reader.peek_is('.') {
            let after_dot = self.reader.peek_at(1);
            if after_dot.is_some_and(|c| c.is_ascii_digit()) {
                self.reader.read();
                self.reader.read_while(&mut fraction, |c| c.is_ascii_digit());
                is_float = true;
            } else if !integral.is_empty() && !matches!(after_dot, Some('.' | '@')) {
                // `5.ToString()`: the dot belongs to member access
                let token = self.plain_integer(&integral);
                let dot_start = self.reader.location();
                self.reader.read();
                let dot = Token::symbol(TokenKind::Dot, dot_start, self.reader.location());
                return (token, Some(dot));
            }
        }

        let mut exponent = String::new();
        if self.reader.peek_matches(|c| c == 'e' || c == 'E') {
            let sign_length = usize::from(matches!(self.reader.peek_at(1), Some('+' | '-')));
            if self
                .reader
                .peek_at(1 + sign_length)
                .is_some_and(|c| c.is_ascii_digit())
            {
                self.reader.read();
                if sign_length == 1 {
                    if let Some(sign) = self.reader.read() {
                        exponent.push(sign);
                    }
                }
                self.reader.read_while(&mut exponent, |c| c.is_ascii_digit());
                is_float = true;
            }
        }

        let float_suffix = match self.reader.peek() {
            Some('R' | 'r' | '#') => Some(FloatSuffix::Double),
            Some('D' | 'd' | '@') => Some(FloatSuffix::Decimal),
            Some('F' | 'f' | '!') => Some(FloatSuffix::Single),
            _ => None,
        };
        if float_suffix.is_some() {
            self.reader.read();
        }

        if is_float || float_suffix.is_some() {
            let suffix = float_suffix.unwrap_or(FloatSuffix::Double);
            return (self.float(&integral, &fraction, &exponent, suffix), None);
        }

        let suffix = self.integer_suffix();
        (self.integer(&integral, Base::Decimal, suffix), None)
    }

    /// Reads an integer type suffix if one follows. Only genuine suffix
    /// characters are consumed.
    fn integer_suffix(&mut self) -> Option<IntegerSuffix> {
        let suffix = match self.reader.peek()? {
            'S' | 's' => IntegerSuffix::Short,
            'I' | 'i' => IntegerSuffix::Integer,
            // `%>` closes an embedded XML expression
            '%' if self.reader.peek_at(1) != Some('>') => IntegerSuffix::Integer,
            'L' | 'l' | '&' => IntegerSuffix::Long,
            'U' | 'u' => {
                let next = self.reader.peek_at(1);
                let unsigned = match next.map(|c| c.to_ascii_uppercase()) {
                    Some('S') => IntegerSuffix::UShort,
                    Some('I') => IntegerSuffix::UInteger,
                    Some('L') => IntegerSuffix::ULong,
                    _ => {
                        let location = self.reader.location();
                        self.reader.read();
                        let suffix = next.map(|c| format!("U{}", c)).unwrap_or_else(|| "U".into());
                        self.error(location, ScanError::InvalidTypeCharacter { suffix });
                        return None;
                    }
                };
                self.reader.read();
                unsigned
            }
            _ => return None,
        };
        self.reader.read();
        Some(suffix)
    }

    fn integer(&mut self, digits: &str, base: Base, suffix: Option<IntegerSuffix>) -> Token {
        let value = match (base, suffix) {
            (Base::Decimal, None) => return self.plain_integer(digits),
            (Base::Decimal, Some(suffix)) => decimal_integer(digits, suffix),
            (Base::Hexadecimal, suffix) => hex_integer(digits, suffix),
            (Base::Octal, suffix) => octal_integer(digits, suffix),
        };

        match value {
            Some(value) => self.token(TokenKind::LiteralInteger, value, base.format()),
            None => {
                let text = self.raw_text();
                self.error(self.start, ScanError::NumberOverflow { text });
                self.token(TokenKind::LiteralInteger, LiteralValue::Int32(0), LiteralFormat::None)
            }
        }
    }

    /// Unsuffixed decimal integer: Int32, widened to Int64 when needed
    fn plain_integer(&mut self, digits: &str) -> Token {
        let value = digits
            .parse::<i32>()
            .map(LiteralValue::Int32)
            .or_else(|_| digits.parse::<i64>().map(LiteralValue::Int64));

        match value {
            Ok(value) => self.token(TokenKind::LiteralInteger, value, LiteralFormat::DecimalNumber),
            Err(_) => {
                let text = digits.to_string();
                self.error(self.start, ScanError::IntegerTooLong { text });
                self.token(TokenKind::LiteralInteger, LiteralValue::Int32(0), LiteralFormat::None)
            }
        }
    }

    fn float(&mut self, integral: &str, fraction: &str, exponent: &str, suffix: FloatSuffix) -> Token {
        let mut text = if integral.is_empty() { "0".to_string() } else { integral.to_string() };
        if !fraction.is_empty() {
            text.push('.');
            text.push_str(fraction);
        }
        if !exponent.is_empty() {
            text.push('e');
            text.push_str(exponent);
        }

        let (kind, parsed, fallback) = match suffix {
            FloatSuffix::Double => (
                TokenKind::LiteralDouble,
                text.parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(LiteralValue::Double),
                LiteralValue::Double(0.0),
            ),
            FloatSuffix::Single => (
                TokenKind::LiteralSingle,
                text.parse::<f32>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .map(LiteralValue::Single),
                LiteralValue::Single(0.0),
            ),
            FloatSuffix::Decimal => {
                let value = match exponent.parse::<i32>() {
                    Ok(exp) => Decimal::from_parts(integral, fraction, exp).ok(),
                    Err(_) if exponent.is_empty() => Decimal::from_parts(integral, fraction, 0).ok(),
                    Err(_) => {
                        self.error(self.start, ScanError::InvalidNumber { text: text.clone() });
                        let fallback = LiteralValue::Decimal(Decimal::default());
                        return self.token(TokenKind::LiteralDecimal, fallback, LiteralFormat::DecimalNumber);
                    }
                };
                (
                    TokenKind::LiteralDecimal,
                    value.map(LiteralValue::Decimal),
                    LiteralValue::Decimal(Decimal::default()),
                )
            }
        };

        let value = parsed.unwrap_or_else(|| {
            self.error(self.start, ScanError::NumberOverflow { text });
            fallback
        });
        self.token(kind, value, LiteralFormat::DecimalNumber)
    }

    fn raw_text(&self) -> String {
        self.reader.slice(self.start_position, self.reader.position())
    }

    fn token(&self, kind: TokenKind, value: LiteralValue, format: LiteralFormat) -> Token {
        Token::literal(kind, self.start, self.reader.location(), self.raw_text(), value, format)
    }

    fn error(&mut self, location: Location, error: ScanError) {
        self.errors.push(Diagnostic::new(location, error));
    }
}

fn decimal_integer(digits: &str, suffix: IntegerSuffix) -> Option<LiteralValue> {
    let value = match suffix {
        IntegerSuffix::Short => LiteralValue::Int16(digits.parse().ok()?),
        IntegerSuffix::UShort => LiteralValue::UInt16(digits.parse().ok()?),
        IntegerSuffix::Integer => LiteralValue::Int32(digits.parse().ok()?),
        IntegerSuffix::UInteger => LiteralValue::UInt32(digits.parse().ok()?),
        IntegerSuffix::Long => LiteralValue::Int64(digits.parse().ok()?),
        IntegerSuffix::ULong => LiteralValue::UInt64(digits.parse().ok()?),
    };
    Some(value)
}

/// Hex digits are a bit pattern: they are parsed unsigned at the suffix
/// width and reinterpreted for signed types.
fn hex_integer(digits: &str, suffix: Option<IntegerSuffix>) -> Option<LiteralValue> {
    let value = match suffix {
        Some(IntegerSuffix::Short) => LiteralValue::Int16(u16::from_str_radix(digits, 16).ok()? as i16),
        Some(IntegerSuffix::UShort) => LiteralValue::UInt16(u16::from_str_radix(digits, 16).ok()?),
        Some(IntegerSuffix::Integer) => LiteralValue::Int32(u32::from_str_radix(digits, 16).ok()? as i32),
        Some(IntegerSuffix::UInteger) => LiteralValue::UInt32(u32::from_str_radix(digits, 16).ok()?),
        Some(IntegerSuffix::Long) => LiteralValue::Int64(u64::from_str_radix(digits, 16).ok()? as i64),
        Some(IntegerSuffix::ULong) => LiteralValue::UInt64(u64::from_str_radix(digits, 16).ok()?),
        None => unsuffixed(u64::from_str_radix(digits, 16).ok()?),
    };
    Some(value)
}

/// Octal values are accumulated at full width, then narrowed to the suffix
/// type with wrapping.
fn octal_integer(digits: &str, suffix: Option<IntegerSuffix>) -> Option<LiteralValue> {
    let mut number: u64 = 0;
    for ch in digits.chars() {
        let digit = u64::from(ch.to_digit(8)?);
        number = number.checked_mul(8)?.checked_add(digit)?;
    }

    let value = match suffix {
        Some(IntegerSuffix::Short) => LiteralValue::Int16(number as i16),
        Some(IntegerSuffix::UShort) => LiteralValue::UInt16(number as u16),
        Some(IntegerSuffix::Integer) => LiteralValue::Int32(number as i32),
        Some(IntegerSuffix::UInteger) => LiteralValue::UInt32(number as u32),
        Some(IntegerSuffix::Long) => LiteralValue::Int64(number as i64),
        Some(IntegerSuffix::ULong) => LiteralValue::UInt64(number),
        None => unsuffixed(number),
    };
    Some(value)
}

fn unsuffixed(number: u64) -> LiteralValue {
    if number <= u64::from(u32::MAX) {
        LiteralValue::Int32(number as u32 as i32)
    } else {
        LiteralValue::Int64(number as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn scan(source: &str) -> NumberScan {
        let mut reader = SourceReader::new(source);
        scan_number(&mut reader)
    }

    fn value(source: &str) -> LiteralValue {
        let result = scan(source);
        assert!(result.errors.is_empty(), "{}: {:?}", source, result.errors);
        result.token.value
    }

    #[test]
    fn test_hex_and_octal() {
        assert_eq!(value("&H10S"), LiteralValue::Int16(16));
        assert_eq!(value("&O17"), LiteralValue::Int32(15));
        assert_eq!(value("&HFFFF"), LiteralValue::Int32(65535));
        assert_eq!(value("&HFFFFFFFF"), LiteralValue::Int32(-1));
        assert_eq!(value("&H100000000"), LiteralValue::Int64(4294967296));
        assert_eq!(value("&HFFFFS"), LiteralValue::Int16(-1));
        assert_eq!(value("&hffUS"), LiteralValue::UInt16(255));
        assert_eq!(value("&O177777S"), LiteralValue::Int16(-1));
        assert_eq!(scan("&H1F").token.format, LiteralFormat::HexadecimalNumber);
        assert_eq!(scan("&O7").token.format, LiteralFormat::OctalNumber);
    }

    #[test]
    fn test_decimal_integers() {
        assert_eq!(value("42"), LiteralValue::Int32(42));
        assert_eq!(value("100000000000&"), LiteralValue::Int64(100000000000));
        assert_eq!(value("3000000000"), LiteralValue::Int64(3000000000));
        assert_eq!(value("7UI"), LiteralValue::UInt32(7));
        assert_eq!(value("7ul"), LiteralValue::UInt64(7));
        assert_eq!(value("12%"), LiteralValue::Int32(12));
        assert_eq!(value("9S"), LiteralValue::Int16(9));
    }

    #[test]
    fn test_floats() {
        assert_eq!(value("1.5E2"), LiteralValue::Double(150.0));
        assert_eq!(value(".5"), LiteralValue::Double(0.5));
        assert_eq!(value("2R"), LiteralValue::Double(2.0));
        assert_eq!(value("2.5F"), LiteralValue::Single(2.5));
        assert_eq!(value("1e-2"), LiteralValue::Double(0.01));
        assert_eq!(value("5D"), LiteralValue::Decimal(Decimal::from_integer(5)));
        assert_eq!(scan("1.25@").token.kind, TokenKind::LiteralDecimal);
        assert_eq!(scan("1.5E2").token.text, "1.5E2");
    }

    #[test]
    fn test_trailing_dot_is_member_access() {
        let result = scan("5.Equals");
        assert_eq!(result.token.value, LiteralValue::Int32(5));
        assert_eq!(result.token.text, "5");
        let dot = result.trailing_dot.expect("dot queued");
        assert_eq!(dot.kind, TokenKind::Dot);
        assert_eq!(dot.start, Location::new(1, 2));
    }

    #[test]
    fn test_suffix_only_consumed_when_genuine() {
        let mut reader = SourceReader::new("5%>");
        let result = scan_number(&mut reader);
        assert_eq!(result.token.text, "5");
        assert_eq!(reader.peek(), Some('%'));

        let mut reader = SourceReader::new("3Ex");
        let result = scan_number(&mut reader);
        assert_eq!(result.token.value, LiteralValue::Int32(3));
        assert_eq!(reader.peek(), Some('E'));
    }

    #[test]
    fn test_errors() {
        let result = scan("&H");
        assert_matches!(result.errors[0].error, ScanError::DigitExpected);

        let result = scan("5UX");
        assert_matches!(
            &result.errors[0].error,
            ScanError::InvalidTypeCharacter { suffix } if suffix == "UX"
        );
        assert_eq!(result.token.value, LiteralValue::Int32(5));

        let result = scan("99999999999999999999");
        assert_matches!(result.errors[0].error, ScanError::IntegerTooLong { .. });
        assert_eq!(result.token.value, LiteralValue::Int32(0));

        let result = scan("70000S");
        assert_matches!(result.errors[0].error, ScanError::NumberOverflow { .. });
        assert_eq!(result.token.value, LiteralValue::Int32(0));
        assert_eq!(result.token.format, LiteralFormat::None);

        let result = scan("&H10000S");
        assert_matches!(result.errors[0].error, ScanError::NumberOverflow { .. });

        let result = scan("1E999");
        assert_matches!(result.errors[0].error, ScanError::NumberOverflow { .. });
    }
}
