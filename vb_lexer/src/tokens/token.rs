//! Tokens and literal values
use super::kind::TokenKind;
use crate::utils::{Location, Span};
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How a literal was written in source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LiteralFormat {
    #[default]
    None,
    DecimalNumber,
    HexadecimalNumber,
    OctalNumber,
    StringLiteral,
    CharLiteral,
    DateTimeLiteral,
}

/// Decoded value of a literal token
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum LiteralValue {
    #[default]
    None,
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Single(f32),
    Double(f64),
    Decimal(Decimal),
    Date(NaiveDateTime),
    Char(char),
    String(String),
}

impl LiteralValue {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Integer values widened to i128, `None` for everything else
    pub fn as_integer(&self) -> Option<i128> {
        match *self {
            Self::Int16(v) => Some(v.into()),
            Self::UInt16(v) => Some(v.into()),
            Self::Int32(v) => Some(v.into()),
            Self::UInt32(v) => Some(v.into()),
            Self::Int64(v) => Some(v.into()),
            Self::UInt64(v) => Some(v.into()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Int16(v) => write!(f, "{}", v),
            Self::UInt16(v) => write!(f, "{}", v),
            Self::Int32(v) => write!(f, "{}", v),
            Self::UInt32(v) => write!(f, "{}", v),
            Self::Int64(v) => write!(f, "{}", v),
            Self::UInt64(v) => write!(f, "{}", v),
            Self::Single(v) => write!(f, "{}", v),
            Self::Double(v) => write!(f, "{}", v),
            Self::Decimal(v) => write!(f, "{}", v),
            Self::Date(v) => write!(f, "{}", v),
            Self::Char(v) => write!(f, "{:?}", v),
            Self::String(v) => write!(f, "{:?}", v),
        }
    }
}

/// 96-bit scaled decimal number
///
/// The value is `mantissa / 10^scale`. Trailing zeros are significant and
/// kept, so `1.50` and `1.5` compare unequal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Decimal {
    mantissa: i128,
    scale: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalOverflow;

impl fmt::Display for DecimalOverflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("value is outside the range of a decimal")
    }
}

impl std::error::Error for DecimalOverflow {}

impl Decimal {
    pub const MAX_MANTISSA: i128 = (1 << 96) - 1;
    pub const MAX_SCALE: u32 = 28;

    pub fn new(mantissa: i128, scale: u32) -> Result<Self, DecimalOverflow> {
        if mantissa.abs() > Self::MAX_MANTISSA || scale > Self::MAX_SCALE {
            return Err(DecimalOverflow);
        }
        Ok(Self { mantissa, scale })
    }

    pub fn from_integer(value: i64) -> Self {
        Self {
            mantissa: value.into(),
            scale: 0,
        }
    }

    pub fn mantissa(&self) -> i128 {
        self.mantissa
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn to_f64(&self) -> f64 {
        self.mantissa as f64 / 10f64.powi(self.scale as i32)
    }

    /// Builds a decimal from unsigned digit strings and a decimal exponent.
    /// Fraction digits beyond the maximum scale are rounded half away from
    /// zero.
    pub fn from_parts(integral: &str, fraction: &str, exponent: i32) -> Result<Self, DecimalOverflow> {
        let exponent = i64::from(exponent);
        let max_scale = i64::from(Self::MAX_SCALE);
        let mut mantissa: i128 = 0;
        let mut fraction_taken: i64 = 0;
        let mut round_up = false;

        let push = |mantissa: i128, ch: char| -> Result<i128, DecimalOverflow> {
            let digit = ch.to_digit(10).ok_or(DecimalOverflow)?;
            mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(digit.into()))
                .ok_or(DecimalOverflow)
        };

        for ch in integral.chars() {
            mantissa = push(mantissa, ch)?;
        }
        for ch in fraction.chars() {
            if fraction_taken + 1 - exponent > max_scale {
                round_up = ch.to_digit(10).ok_or(DecimalOverflow)? >= 5;
                break;
            }
            mantissa = push(mantissa, ch)?;
            fraction_taken += 1;
        }

        if round_up {
            mantissa += 1;
        }

        let mut scale = fraction_taken - exponent;
        while scale < 0 {
            mantissa = mantissa.checked_mul(10).ok_or(DecimalOverflow)?;
            scale += 1;
        }
        while scale > max_scale {
            // Only reachable with a large negative exponent
            let dropped = mantissa % 10;
            mantissa /= 10;
            if dropped >= 5 {
                mantissa += 1;
            }
            scale -= 1;
        }

        Self::new(mantissa, scale as u32)
    }
}

impl FromStr for Decimal {
    type Err = DecimalOverflow;

    /// Accepts `[-]digits[.digits][(E|e)[+|-]digits]`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (negative, body) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (number, exponent) = match body.find(['e', 'E']) {
            Some(pos) => {
                let exp = body[pos + 1..].parse::<i32>().map_err(|_| DecimalOverflow)?;
                (&body[..pos], exp)
            }
            None => (body, 0),
        };
        let (integral, fraction) = number.split_once('.').unwrap_or((number, ""));
        if integral.is_empty() && fraction.is_empty() {
            return Err(DecimalOverflow);
        }

        let value = Self::from_parts(integral, fraction, exponent)?;
        Ok(if negative {
            Self {
                mantissa: -value.mantissa,
                ..value
            }
        } else {
            value
        })
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.mantissa.unsigned_abs().to_string();
        let sign = if self.mantissa < 0 { "-" } else { "" };
        let scale = self.scale as usize;

        if scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (whole, frac) = padded.split_at(padded.len() - scale);
        write!(f, "{}{}.{}", sign, whole, frac)
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A lexed token. Never mutated once it has been handed out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub start: Location,
    pub end: Location,
    /// Source text as written
    pub text: String,
    pub value: LiteralValue,
    pub format: LiteralFormat,
}

impl Token {
    pub fn new(kind: TokenKind, start: Location, end: Location, text: impl Into<String>) -> Self {
        Self {
            kind,
            start,
            end,
            text: text.into(),
            value: LiteralValue::None,
            format: LiteralFormat::None,
        }
    }

    /// A token whose text is implied by its kind
    pub fn symbol(kind: TokenKind, start: Location, end: Location) -> Self {
        Self::new(kind, start, end, kind.symbol().unwrap_or_default())
    }

    pub fn literal(
        kind: TokenKind,
        start: Location,
        end: Location,
        text: impl Into<String>,
        value: LiteralValue,
        format: LiteralFormat,
    ) -> Self {
        Self {
            kind,
            start,
            end,
            text: text.into(),
            value,
            format,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.start, self.kind)?;
        match self.kind {
            TokenKind::Eol | TokenKind::Eof => Ok(()),
            _ => write!(f, " {:?}", self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::Keyword;

    #[test]
    fn test_decimal_parsing() {
        let d: Decimal = "1.50".parse().unwrap();
        assert_eq!((d.mantissa(), d.scale()), (150, 2));
        assert_eq!(d.to_string(), "1.50");

        let d: Decimal = "1.5E2".parse().unwrap();
        assert_eq!((d.mantissa(), d.scale()), (150, 0));

        let d: Decimal = "25e-3".parse().unwrap();
        assert_eq!(d.to_string(), "0.025");

        assert_eq!("-7".parse::<Decimal>().unwrap().to_string(), "-7");
        assert_eq!(Decimal::from_integer(5).to_string(), "5");
    }

    #[test]
    fn test_decimal_limits() {
        // 2^96 does not fit
        assert!("79228162514264337593543950336".parse::<Decimal>().is_err());
        assert!("79228162514264337593543950335".parse::<Decimal>().is_ok());
        assert!("abc".parse::<Decimal>().is_err());

        let rounded: Decimal = "0.00000000000000000000000000015".parse().unwrap();
        assert_eq!(rounded.scale(), Decimal::MAX_SCALE);
        assert_eq!(rounded.mantissa(), 2);
    }

    #[test]
    fn test_decimal_serializes_as_string() {
        let value = LiteralValue::Decimal("12.5".parse().unwrap());
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"type":"Decimal","value":"12.5"}"#);
        let back: LiteralValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_token_display() {
        let token = Token::symbol(
            TokenKind::Keyword(Keyword::Dim),
            Location::new(2, 5),
            Location::new(2, 8),
        );
        assert_eq!(token.text, "Dim");
        assert_eq!(token.to_string(), "2:5 Keyword(Dim) \"Dim\"");
        assert_eq!(token.span().to_string(), "2:5-8");

        let eol = Token::new(TokenKind::Eol, Location::new(2, 8), Location::new(3, 1), "");
        assert_eq!(eol.to_string(), "2:8 Eol");
    }

    #[test]
    fn test_integer_widening() {
        assert_eq!(LiteralValue::UInt64(u64::MAX).as_integer(), Some(u64::MAX as i128));
        assert_eq!(LiteralValue::Double(1.0).as_integer(), None);
        assert_eq!(LiteralValue::String("x".into()).as_str(), Some("x"));
    }
}
