//! Supported currency codes.
//!
//! The service supports a fixed set of ten ISO 4217 currencies. Every rate
//! is expressed relative to USD, so USD always carries a rate of exactly 1.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// ISO 4217 currency codes supported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CurrencyCode {
    /// US Dollar (base currency)
    Usd,
    /// Euro
    Eur,
    /// British Pound
    Gbp,
    /// Japanese Yen
    Jpy,
    /// Australian Dollar
    Aud,
    /// Canadian Dollar
    Cad,
    /// Swiss Franc
    Chf,
    /// Chinese Yuan
    Cny,
    /// Swedish Krona
    Sek,
    /// New Zealand Dollar
    Nzd,
}

/// Error returned when parsing an unsupported currency code.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unsupported currency: {0}")]
pub struct UnsupportedCurrency(pub String);

impl CurrencyCode {
    /// All supported currencies, in canonical order.
    pub const ALL: [Self; 10] = [
        Self::Usd,
        Self::Eur,
        Self::Gbp,
        Self::Jpy,
        Self::Aud,
        Self::Cad,
        Self::Chf,
        Self::Cny,
        Self::Sek,
        Self::Nzd,
    ];

    /// Returns the three-letter ISO 4217 code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Usd => "USD",
            Self::Eur => "EUR",
            Self::Gbp => "GBP",
            Self::Jpy => "JPY",
            Self::Aud => "AUD",
            Self::Cad => "CAD",
            Self::Chf => "CHF",
            Self::Cny => "CNY",
            Self::Sek => "SEK",
            Self::Nzd => "NZD",
        }
    }

    /// Returns the number of minor units (decimal places) for this currency.
    ///
    /// JPY has no minor unit; every other supported currency uses two.
    #[must_use]
    pub const fn minor_units(self) -> u32 {
        match self {
            Self::Jpy => 0,
            _ => 2,
        }
    }

    /// Returns true for the base currency (USD).
    #[must_use]
    pub const fn is_base(self) -> bool {
        matches!(self, Self::Usd)
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = UnsupportedCurrency;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "USD" => Ok(Self::Usd),
            "EUR" => Ok(Self::Eur),
            "GBP" => Ok(Self::Gbp),
            "JPY" => Ok(Self::Jpy),
            "AUD" => Ok(Self::Aud),
            "CAD" => Ok(Self::Cad),
            "CHF" => Ok(Self::Chf),
            "CNY" => Ok(Self::Cny),
            "SEK" => Ok(Self::Sek),
            "NZD" => Ok(Self::Nzd),
            _ => Err(UnsupportedCurrency(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_parse_all_supported() {
        for code in CurrencyCode::ALL {
            let parsed = CurrencyCode::from_str(code.as_str()).unwrap();
            assert_eq!(parsed, code);
        }
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(CurrencyCode::from_str("eur").unwrap(), CurrencyCode::Eur);
        assert_eq!(CurrencyCode::from_str("Jpy").unwrap(), CurrencyCode::Jpy);
    }

    #[test]
    fn test_parse_unsupported() {
        let err = CurrencyCode::from_str("XAU").unwrap_err();
        assert_eq!(err, UnsupportedCurrency("XAU".to_string()));
    }

    #[test]
    fn test_minor_units() {
        assert_eq!(CurrencyCode::Jpy.minor_units(), 0);
        assert_eq!(CurrencyCode::Usd.minor_units(), 2);
        assert_eq!(CurrencyCode::Sek.minor_units(), 2);
    }

    #[test]
    fn test_display_round_trips() {
        let code = CurrencyCode::Nzd;
        assert_eq!(CurrencyCode::from_str(&code.to_string()).unwrap(), code);
    }
}
