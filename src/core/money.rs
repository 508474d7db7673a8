//! Money helpers - exact price parsing and cent arithmetic.
//!
//! Menu prices are stored as the text the admin typed (`"5.00"`, `"2.5"`). They are
//! only turned into numbers here, and always into integer cents, so sums like
//! `2.10 × 3` come out as exactly `6.30`.

use crate::errors::{Error, Result};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

/// Parses a price string into integer cents.
///
/// Amounts with more than two decimals are rounded half away from zero. Negative,
/// empty or non-numeric prices are rejected.
pub fn parse_price_cents(price: &str) -> Result<i64> {
    let invalid = || Error::InvalidPrice {
        price: price.to_string(),
    };
    let trimmed = price.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }
    let value = Decimal::from_str(trimmed).map_err(|_| invalid())?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(invalid());
    }
    let cents = value
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(invalid)?;
    cents.to_i64().ok_or_else(invalid)
}

/// Formats cents as a plain two-decimal amount, e.g. `1250` → `"12.50"`.
#[must_use]
pub fn format_cents(cents: i64) -> String {
    Decimal::new(cents, 2).to_string()
}

/// Converts cents into the floating display amount stored on orders.
#[must_use]
pub fn cents_to_amount(cents: i64) -> f64 {
    Decimal::new(cents, 2).to_f64().unwrap_or_default()
}

/// Unit price times quantity, in cents.
#[must_use]
pub fn line_total_cents(unit_cents: i64, quantity: u32) -> i64 {
    unit_cents.saturating_mul(i64::from(quantity))
}

/// Cleans a price typed into the admin form: keeps digits and the first dot.
///
/// Any later dots are dropped and the digits after them are kept, so `"1.2.3"`
/// becomes `"1.23"` and `"$4,50"` becomes `"450"`.
#[must_use]
pub fn sanitize_price_input(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match kept.split_once('.') {
        Some((whole, rest)) => format!("{whole}.{}", rest.replace('.', "")),
        None => kept,
    }
}

/// Sanitises an admin price and checks that it parses.
pub fn normalize_price(raw: &str) -> Result<String> {
    let cleaned = sanitize_price_input(raw);
    parse_price_cents(&cleaned)?;
    Ok(cleaned)
}

/// Accepts a price as either a JSON string or a JSON number, keeping its text.
pub fn deserialize_price<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum PriceValue {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match PriceValue::deserialize(deserializer)? {
        PriceValue::Text(text) => text,
        PriceValue::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_price_cents() {
        assert_eq!(parse_price_cents("5.00").unwrap(), 500);
        assert_eq!(parse_price_cents("2.5").unwrap(), 250);
        assert_eq!(parse_price_cents(" 12 ").unwrap(), 1200);
        assert_eq!(parse_price_cents("0.105").unwrap(), 11);
        assert_eq!(parse_price_cents("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        for bad in ["", "  ", "abc", "-1.00", "1,50"] {
            assert!(
                matches!(parse_price_cents(bad), Err(Error::InvalidPrice { .. })),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn test_cent_sums_are_exact() {
        let unit = parse_price_cents("2.10").unwrap();
        let total: i64 = (0..3).map(|_| line_total_cents(unit, 1)).sum();
        assert_eq!(format_cents(total), "6.30");
        assert_eq!(format_cents(line_total_cents(unit, 3)), "6.30");
        assert!((cents_to_amount(total) - 6.3).abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(1250), "12.50");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(0), "0.00");
    }

    #[test]
    fn test_sanitize_price_input() {
        assert_eq!(sanitize_price_input("1.2.3"), "1.23");
        assert_eq!(sanitize_price_input("$4,50"), "450");
        assert_eq!(sanitize_price_input("abc"), "");
        assert_eq!(sanitize_price_input("3.50"), "3.50");
        assert!(normalize_price("abc").is_err());
        assert_eq!(normalize_price(" 7.5 ").unwrap(), "7.5");
    }

    #[test]
    fn test_deserialize_price_accepts_string_or_number() {
        #[derive(Deserialize)]
        struct Payload {
            #[serde(deserialize_with = "deserialize_price")]
            price: String,
        }

        let text: Payload = serde_json::from_str(r#"{"price": "4.50"}"#).unwrap();
        let number: Payload = serde_json::from_str(r#"{"price": 4.5}"#).unwrap();
        assert_eq!(text.price, "4.50");
        assert_eq!(number.price, "4.5");
    }
}
