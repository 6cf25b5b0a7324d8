//! Type-safe price representation using decimal arithmetic.
//!
//! Prices arrive from spreadsheets in the currency's standard unit ("19.99")
//! and are stored in the smallest currency unit (1999 cents). Zero-decimal
//! currencies such as JPY have no subunit, so their standard unit *is* the
//! smallest unit.

use core::fmt;
use core::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Errors that can occur when converting a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount does not fit in the smallest-unit integer range.
    #[error("price {amount} is out of range")]
    Overflow {
        /// The offending amount in standard units.
        amount: Decimal,
    },
}

/// A price with currency information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in the currency's standard unit (e.g., dollars, not cents).
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency_code: CurrencyCode,
}

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal, currency_code: CurrencyCode) -> Self {
        Self {
            amount,
            currency_code,
        }
    }

    /// Create a price from an amount in the smallest currency unit.
    #[must_use]
    pub fn from_minor_units(minor: i64, currency_code: CurrencyCode) -> Self {
        Self {
            amount: Decimal::new(minor, currency_code.decimal_places()),
            currency_code,
        }
    }

    /// Convert to the smallest currency unit (cents for USD, yen for JPY).
    ///
    /// Sub-unit remainders are rounded half away from zero, so `0.005 USD`
    /// becomes `1`.
    ///
    /// # Errors
    ///
    /// Returns [`PriceError::Overflow`] if the result does not fit in an `i64`.
    pub fn to_minor_units(&self) -> Result<i64, PriceError> {
        let overflow = || PriceError::Overflow {
            amount: self.amount,
        };
        let factor = Decimal::from(self.currency_code.minor_unit_factor());
        self.amount
            .checked_mul(factor)
            .ok_or_else(overflow)?
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(overflow)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = self.currency_code.decimal_places() as usize;
        write!(
            f,
            "{:.places$} {}",
            self.amount,
            self.currency_code.code()
        )
    }
}

/// Error returned when a currency code is not recognised.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown currency code: {0}")]
pub struct UnknownCurrency(pub String);

/// ISO 4217 currency codes a store can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    #[default]
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    NZD,
    CHF,
    SEK,
    INR,
    MXN,
    BRL,
    JPY,
    KRW,
    VND,
    CLP,
    ISK,
}

impl CurrencyCode {
    /// The three-letter ISO code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::USD => "USD",
            Self::EUR => "EUR",
            Self::GBP => "GBP",
            Self::CAD => "CAD",
            Self::AUD => "AUD",
            Self::NZD => "NZD",
            Self::CHF => "CHF",
            Self::SEK => "SEK",
            Self::INR => "INR",
            Self::MXN => "MXN",
            Self::BRL => "BRL",
            Self::JPY => "JPY",
            Self::KRW => "KRW",
            Self::VND => "VND",
            Self::CLP => "CLP",
            Self::ISK => "ISK",
        }
    }

    /// Whether the currency has no fractional subunit.
    #[must_use]
    pub const fn is_zero_decimal(self) -> bool {
        matches!(
            self,
            Self::JPY | Self::KRW | Self::VND | Self::CLP | Self::ISK
        )
    }

    /// Number of decimal places in the standard unit.
    #[must_use]
    pub const fn decimal_places(self) -> u32 {
        if self.is_zero_decimal() { 0 } else { 2 }
    }

    /// Multiplier from the standard unit to the smallest unit.
    #[must_use]
    pub const fn minor_unit_factor(self) -> i64 {
        if self.is_zero_decimal() { 1 } else { 100 }
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for CurrencyCode {
    type Err = UnknownCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = match s.trim().to_ascii_uppercase().as_str() {
            "USD" => Self::USD,
            "EUR" => Self::EUR,
            "GBP" => Self::GBP,
            "CAD" => Self::CAD,
            "AUD" => Self::AUD,
            "NZD" => Self::NZD,
            "CHF" => Self::CHF,
            "SEK" => Self::SEK,
            "INR" => Self::INR,
            "MXN" => Self::MXN,
            "BRL" => Self::BRL,
            "JPY" => Self::JPY,
            "KRW" => Self::KRW,
            "VND" => Self::VND,
            "CLP" => Self::CLP,
            "ISK" => Self::ISK,
            _ => return Err(UnknownCurrency(s.to_string())),
        };
        Ok(code)
    }
}
