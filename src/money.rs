//! Money Module
//!
//! Currency-aware amounts stored as exact integer minor units.
//!
//! ## Representation
//! - Internally an [`Amount`] is a [`Currency`] plus an `i64` count of minor units
//!   (cents for USD). The scale factor is `10^exponent` where the exponent comes from
//!   the currency table below.
//! - On the wire and in logs an amount is the canonical string `"USD 125.00"`.
//!   Parsing also accepts a bare decimal (`"125.00"`), which is read as USD.
//!
//! ## Usage
//! ```rust
//! use paygate::money::Amount;
//!
//! let amount: Amount = "USD 125.00".parse().unwrap();
//! assert_eq!(amount.minor_units(), 12_500);
//! assert_eq!(amount.to_string(), "USD 125.00");
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Money conversion errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Precision overflow: provided {provided} decimals, max allowed {max}")]
    PrecisionOverflow { provided: u32, max: u32 },

    #[error("Amount must not be negative")]
    Negative,

    #[error("Amount too large, would overflow")]
    Overflow,

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
}

// ============================================================================
// Currency
// ============================================================================

/// ISO 4217 currency code (always upper-case)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Currency(String);

impl Currency {
    pub const USD: &'static str = "USD";

    pub fn usd() -> Self {
        Self(Self::USD.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of minor-unit digits for this currency
    pub fn exponent(&self) -> u32 {
        // Currency::from_str only admits codes present in the table
        minor_unit_exponent(&self.0).unwrap_or(2)
    }
}

fn minor_unit_exponent(code: &str) -> Option<u32> {
    match code {
        "USD" | "CAD" | "EUR" | "GBP" | "MXN" | "AUD" | "CHF" => Some(2),
        "JPY" | "KRW" => Some(0),
        "BHD" | "KWD" | "JOD" => Some(3),
        _ => None,
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        if minor_unit_exponent(&code).is_none() {
            return Err(MoneyError::UnsupportedCurrency(s.to_string()));
        }
        Ok(Self(code))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Amount
// ============================================================================

/// A currency-aware monetary amount held as integer minor units.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount {
    currency: Currency,
    value: i64,
}

impl Amount {
    /// Build an amount from minor units. Negative values are representable
    /// (rows read back from storage) and rejected by [`Amount::validate`].
    pub fn from_minor_units(currency: Currency, value: i64) -> Self {
        Self { currency, value }
    }

    pub fn usd(value: i64) -> Self {
        Self::from_minor_units(Currency::usd(), value)
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Value in minor units (e.g. cents)
    pub fn minor_units(&self) -> i64 {
        self.value
    }

    /// Exact decimal value in major units
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.value, self.currency.exponent())
    }

    pub fn validate(&self) -> Result<(), MoneyError> {
        if self.value < 0 {
            return Err(MoneyError::Negative);
        }
        minor_unit_exponent(self.currency.as_str())
            .map(|_| ())
            .ok_or_else(|| MoneyError::UnsupportedCurrency(self.currency.0.clone()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.currency, self.to_decimal())
    }
}

impl FromStr for Amount {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (currency, number) = match s.split_once(' ') {
            Some((code, rest)) => (code.parse::<Currency>()?, rest.trim()),
            None => (Currency::usd(), s),
        };
        let value = parse_minor_units(number, currency.exponent())?;
        Ok(Self { currency, value })
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Parse: decimal string → minor units
// ============================================================================

/// Convert a decimal string to minor units at the given exponent.
///
/// Rejects signs, scientific notation, `.5`/`5.` forms, and more fractional
/// digits than the currency allows (no silent truncation).
pub fn parse_minor_units(amount_str: &str, decimals: u32) -> Result<i64, MoneyError> {
    let amount_str = amount_str.trim();
    if amount_str.is_empty() {
        return Err(MoneyError::InvalidFormat("empty string".into()));
    }

    if amount_str.starts_with('-') {
        return Err(MoneyError::Negative);
    }
    if amount_str.starts_with('+') {
        return Err(MoneyError::InvalidFormat("+ prefix not allowed".into()));
    }

    let (whole, frac) = match amount_str.split_once('.') {
        None => (amount_str, ""),
        Some((w, f)) => {
            if w.is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing leading zero (e.g., use 0.5 instead of .5)".into(),
                ));
            }
            if f.is_empty() {
                return Err(MoneyError::InvalidFormat(
                    "missing fractional part (e.g., use 5.0 instead of 5.)".into(),
                ));
            }
            (w, f)
        }
    };

    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(MoneyError::InvalidFormat(format!(
            "invalid character in amount: {}",
            amount_str
        )));
    }

    if frac.len() > decimals as usize {
        return Err(MoneyError::PrecisionOverflow {
            provided: frac.len() as u32,
            max: decimals,
        });
    }

    let whole_num: i64 = whole.parse().map_err(|_| MoneyError::Overflow)?;
    let frac_num: i64 = if frac.is_empty() {
        0
    } else {
        format!("{:0<width$}", frac, width = decimals as usize)
            .parse()
            .map_err(|_| MoneyError::InvalidFormat("invalid fractional part".into()))?
    };

    whole_num
        .checked_mul(10i64.pow(decimals))
        .and_then(|v| v.checked_add(frac_num))
        .ok_or(MoneyError::Overflow)
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_currency() {
        let amount: Amount = "USD 125.00".parse().unwrap();
        assert_eq!(amount.minor_units(), 12_500);
        assert_eq!(amount.currency().as_str(), "USD");
    }

    #[test]
    fn test_parse_bare_decimal_defaults_to_usd() {
        let amount: Amount = "125.00".parse().unwrap();
        assert_eq!(amount, Amount::usd(12_500));

        let amount: Amount = "12.5".parse().unwrap();
        assert_eq!(amount.minor_units(), 1_250);

        let amount: Amount = "7".parse().unwrap();
        assert_eq!(amount.minor_units(), 700);
    }

    #[test]
    fn test_currency_is_case_insensitive() {
        let amount: Amount = "usd 1.01".parse().unwrap();
        assert_eq!(amount.to_string(), "USD 1.01");
    }

    #[test]
    fn test_zero_decimal_currency() {
        let amount: Amount = "JPY 500".parse().unwrap();
        assert_eq!(amount.minor_units(), 500);
        assert_eq!(amount.to_string(), "JPY 500");
        assert!(matches!(
            "JPY 500.5".parse::<Amount>(),
            Err(MoneyError::PrecisionOverflow { provided: 1, max: 0 })
        ));
    }

    #[test]
    fn test_display_keeps_scale() {
        assert_eq!(Amount::usd(12_500).to_string(), "USD 125.00");
        assert_eq!(Amount::usd(1).to_string(), "USD 0.01");
        assert_eq!(Amount::usd(0).to_string(), "USD 0.00");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(matches!("".parse::<Amount>(), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!("abc".parse::<Amount>(), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!(".5".parse::<Amount>(), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!("5.".parse::<Amount>(), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!("1e5".parse::<Amount>(), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!("1.2.3".parse::<Amount>(), Err(MoneyError::InvalidFormat(_))));
        assert!(matches!("-1.00".parse::<Amount>(), Err(MoneyError::Negative)));
        assert!(matches!(
            "XYZ 1.00".parse::<Amount>(),
            Err(MoneyError::UnsupportedCurrency(_))
        ));
        assert!(matches!(
            "1.001".parse::<Amount>(),
            Err(MoneyError::PrecisionOverflow { provided: 3, max: 2 })
        ));
        assert!(matches!(
            "99999999999999999999".parse::<Amount>(),
            Err(MoneyError::Overflow)
        ));
    }

    #[test]
    fn test_validate() {
        assert!(Amount::usd(0).validate().is_ok());
        assert!(Amount::usd(100).validate().is_ok());
        assert_eq!(Amount::usd(-1).validate(), Err(MoneyError::Negative));
    }

    #[test]
    fn test_serde_as_string() {
        let amount = Amount::usd(4_250);
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!(json, r#""USD 42.50""#);

        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(back, amount);

        assert!(serde_json::from_str::<Amount>("42.5").is_err());
    }
}
