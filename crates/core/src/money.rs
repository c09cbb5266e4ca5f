use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// A monetary magnitude rounded to two decimal places. Always non-negative
/// inside a `Transaction`; sign lives in `Direction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::from(cents) / Decimal::from(100))
    }

    pub fn to_cents(self) -> i64 {
        (self.0 * Decimal::from(100)).to_i64().unwrap_or(0)
    }

    pub fn from_decimal(decimal: Decimal) -> Self {
        Money(decimal.round_dp(2))
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

/// Parse a statement amount as it appears on paper: optional `£`/`GBP`,
/// thousands separators, accounting parentheses for negatives, a trailing
/// minus, or a trailing `CR`/`DR` marker. Returns a signed value where
/// negative means money out.
pub fn parse_signed_amount(s: &str) -> Option<Decimal> {
    let mut s = s.trim();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') {
        negative = true;
        s = &s[1..s.len() - 1];
    }

    s = s.trim();
    let mut marker_credit = false;
    let tail = if s.len() >= 2 && s.is_char_boundary(s.len() - 2) {
        &s[s.len() - 2..]
    } else {
        ""
    };
    if tail.eq_ignore_ascii_case("CR") {
        marker_credit = true;
        s = &s[..s.len() - 2];
    } else if tail.eq_ignore_ascii_case("DR") {
        negative = true;
        s = &s[..s.len() - 2];
    } else if s.len() > 1 && s.ends_with('-') {
        negative = true;
        s = &s[..s.len() - 1];
    }

    let cleaned: String = s
        .trim()
        .trim_start_matches("GBP")
        .chars()
        .filter(|c| !matches!(c, '£' | '$' | ',' | ' ' | '+'))
        .collect();

    let mut dec = Decimal::from_str(cleaned.trim()).ok()?;
    if negative && !marker_credit {
        dec = -dec;
    }
    Some(dec.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn money_round_trips_cents() {
        assert_eq!(Money::from_cents(1250).to_cents(), 1250);
        assert_eq!(Money::from_cents(1250).to_string(), "12.50");
    }

    #[test]
    fn money_display_two_decimals() {
        assert_eq!(Money::from_decimal(dec("7")).to_string(), "7.00");
        assert_eq!(Money::from_decimal(dec("1234.5")).to_string(), "1234.50");
    }

    #[test]
    fn parse_plain() {
        assert_eq!(parse_signed_amount("123.45"), Some(dec("123.45")));
        assert_eq!(parse_signed_amount("100"), Some(dec("100")));
    }

    #[test]
    fn parse_pound_sign_and_commas() {
        assert_eq!(parse_signed_amount("£1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_signed_amount("GBP 99.00"), Some(dec("99.00")));
    }

    #[test]
    fn parse_negative_forms() {
        assert_eq!(parse_signed_amount("-12.50"), Some(dec("-12.50")));
        assert_eq!(parse_signed_amount("(75.25)"), Some(dec("-75.25")));
        assert_eq!(parse_signed_amount("12.50-"), Some(dec("-12.50")));
    }

    #[test]
    fn parse_trailing_markers() {
        assert_eq!(parse_signed_amount("40.00 DR"), Some(dec("-40.00")));
        assert_eq!(parse_signed_amount("2500.00 CR"), Some(dec("2500.00")));
        assert_eq!(parse_signed_amount("2500.00CR"), Some(dec("2500.00")));
    }

    #[test]
    fn parse_leading_plus() {
        assert_eq!(parse_signed_amount("+15.00"), Some(dec("15.00")));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_signed_amount(""), None);
        assert_eq!(parse_signed_amount("abc"), None);
        assert_eq!(parse_signed_amount("£"), None);
    }
}
