//! Cell value coercion shared by the standard and platform paths.
//!
//! Every function here is total: bad input becomes an `Err(message)` that the
//! caller turns into a field-level [`ImportError`](crate::ImportError) and a
//! default value.

use std::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use storeloom_core::{CurrencyCode, Price};
use url::Url;

/// Characters removed from a price cell before it is parsed.
const PRICE_NOISE: &[char] = &['$', '€', '£', '¥', '₹', '₩', '₫', ',', ' ', '\u{a0}'];

/// Values accepted as "true" (compared case-insensitively).
const TRUTHY: &[&str] = &["true", "yes", "1", "y"];

/// Values accepted as an explicit "false" (compared case-insensitively).
const FALSY: &[&str] = &["false", "no", "0", "n"];

/// Parse a price cell into the smallest currency unit.
///
/// An empty cell is a price of zero. Currency symbols, thousands separators and
/// spaces are stripped first, so `"$1,234.56"` is `123456` in USD.
///
/// # Errors
///
/// Returns a message when the stripped text is not a decimal number, is
/// negative, or overflows.
pub fn parse_price(raw: &str, currency: CurrencyCode) -> Result<i64, String> {
    let stripped: String = raw.chars().filter(|c| !PRICE_NOISE.contains(c)).collect();
    if stripped.is_empty() {
        return Ok(0);
    }

    let amount = Decimal::from_str(&stripped).map_err(|_| format!("Invalid price: {raw}"))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(format!("Price cannot be negative: {raw}"));
    }

    Price::new(amount, currency)
        .to_minor_units()
        .map_err(|e| e.to_string())
}

/// Parse an optional price cell; empty means absent.
///
/// # Errors
///
/// Same as [`parse_price`].
pub fn parse_optional_price(raw: &str, currency: CurrencyCode) -> Result<Option<i64>, String> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    parse_price(raw, currency).map(Some)
}

/// Lenient boolean: anything outside the truthy set is `false`.
#[must_use]
pub fn parse_bool(raw: &str) -> bool {
    let value = raw.trim();
    TRUTHY.iter().any(|t| value.eq_ignore_ascii_case(t))
}

/// Tri-state boolean: `None` when the cell is empty or not a recognised flag.
#[must_use]
pub fn parse_flag(raw: &str) -> Option<bool> {
    let value = raw.trim();
    if TRUTHY.iter().any(|t| value.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSY.iter().any(|f| value.eq_ignore_ascii_case(f)) {
        Some(false)
    } else {
        None
    }
}

/// Parse a non-negative stock count; empty means absent.
///
/// # Errors
///
/// Returns a message when the cell is not a whole number or is negative.
pub fn parse_count(raw: &str) -> Result<Option<u32>, String> {
    let value = raw.trim().replace(',', "");
    if value.is_empty() {
        return Ok(None);
    }
    let parsed = parse_whole_number(&value).ok_or_else(|| format!("Invalid number: {raw}"))?;
    u32::try_from(parsed)
        .map(Some)
        .map_err(|_| format!("Inventory count out of range: {raw}"))
}

/// Parse a signed stock quantity as exported by platforms that allow
/// overselling; empty means absent.
///
/// # Errors
///
/// Returns a message when the cell is not a whole number.
pub fn parse_quantity(raw: &str) -> Result<Option<i64>, String> {
    let value = raw.trim().replace(',', "");
    if value.is_empty() {
        return Ok(None);
    }
    parse_whole_number(&value)
        .map(Some)
        .ok_or_else(|| format!("Invalid inventory quantity: {raw}"))
}

/// Accept `"12"` and spreadsheet-style `"12.0"`, but not `"12.5"`.
fn parse_whole_number(value: &str) -> Option<i64> {
    if let Ok(n) = value.parse::<i64>() {
        return Some(n);
    }
    let decimal = Decimal::from_str(value).ok()?;
    if decimal.fract().is_zero() {
        decimal.trunc().to_i64()
    } else {
        None
    }
}

/// Validate one image reference as an absolute URL.
///
/// # Errors
///
/// Returns a message when the text is not an absolute URL with a host.
pub fn validate_url(raw: &str) -> Result<String, String> {
    let value = raw.trim();
    match Url::parse(value) {
        Ok(url) if url.has_host() => Ok(value.to_string()),
        _ => Err(format!("Invalid image URL: {value}")),
    }
}

/// Split a comma-separated cell into trimmed, non-empty items.
pub fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}
