//! Currency conversion arithmetic.
//!
//! CRITICAL: Rounding strategy for multi-currency:
//! - Always round to the target currency's minor units
//! - Use banker's rounding (round half to even)
//! - Never use floating point; all arithmetic is `Decimal`

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use super::code::CurrencyCode;

/// Magnitude ceiling for amounts and conversion results (10^14).
///
/// Any input amount, intermediate product, or rounded result at or above
/// this magnitude fails with `AmountOverflow` rather than producing a
/// silently wrong value.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(276_447_232, 23_283, 0, false, 0);

/// Errors produced by the conversion calculator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    /// Currency code is outside the supported set.
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Amount or result exceeds the magnitude ceiling.
    #[error("amount exceeds the maximum supported magnitude of {MAX_AMOUNT}")]
    AmountOverflow,

    /// No rate available for a supported currency.
    #[error("no exchange rate available for {0}")]
    MissingRate(CurrencyCode),

    /// Rate table contains a non-positive rate.
    #[error("invalid exchange rate for {0}")]
    InvalidRate(CurrencyCode),
}

/// Outcome of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// Source currency.
    pub from: CurrencyCode,
    /// Target currency.
    pub to: CurrencyCode,
    /// Effective cross rate applied (`rate[to] / rate[from]`).
    pub rate: Decimal,
    /// Converted amount, rounded to the target currency's minor units.
    pub converted: Decimal,
}

/// Converts `amount` from one currency to another using USD-relative rates.
///
/// The rate table maps each currency to its rate against USD (1 USD =
/// `rates[c]` units of `c`), so the effective cross rate is
/// `rates[to] / rates[from]`. The result is rounded to the target
/// currency's minor units with banker's rounding (half to even) to avoid
/// systematic bias across many conversions.
///
/// This is a pure function; persistence is a caller responsibility.
///
/// # Errors
///
/// - `UnsupportedCurrency` if either code is outside the supported set.
/// - `AmountOverflow` if the input, intermediate product, or result is at
///   or above [`MAX_AMOUNT`] in magnitude.
/// - `MissingRate` / `InvalidRate` for absent or non-positive table entries.
pub fn convert(
    amount: Decimal,
    from: &str,
    to: &str,
    rates: &HashMap<CurrencyCode, Decimal>,
) -> Result<Conversion, ConversionError> {
    let from = CurrencyCode::from_str(from).map_err(|e| ConversionError::UnsupportedCurrency(e.0))?;
    let to = CurrencyCode::from_str(to).map_err(|e| ConversionError::UnsupportedCurrency(e.0))?;

    if amount.abs() >= MAX_AMOUNT {
        return Err(ConversionError::AmountOverflow);
    }

    let rate_from = lookup_rate(rates, from)?;
    let rate_to = lookup_rate(rates, to)?;

    let cross_rate = rate_to
        .checked_div(rate_from)
        .ok_or(ConversionError::AmountOverflow)?;

    let product = amount
        .checked_mul(cross_rate)
        .ok_or(ConversionError::AmountOverflow)?;

    let converted =
        product.round_dp_with_strategy(to.minor_units(), RoundingStrategy::MidpointNearestEven);

    if converted.abs() >= MAX_AMOUNT {
        return Err(ConversionError::AmountOverflow);
    }

    Ok(Conversion {
        from,
        to,
        rate: cross_rate,
        converted,
    })
}

fn lookup_rate(
    rates: &HashMap<CurrencyCode, Decimal>,
    code: CurrencyCode,
) -> Result<Decimal, ConversionError> {
    let rate = rates
        .get(&code)
        .copied()
        .ok_or(ConversionError::MissingRate(code))?;

    if rate <= Decimal::ZERO {
        return Err(ConversionError::InvalidRate(code));
    }

    Ok(rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    /// Development-realistic USD-relative rate table.
    fn test_rates() -> HashMap<CurrencyCode, Decimal> {
        HashMap::from([
            (CurrencyCode::Usd, dec!(1.0)),
            (CurrencyCode::Eur, dec!(0.92)),
            (CurrencyCode::Gbp, dec!(0.79)),
            (CurrencyCode::Jpy, dec!(147.50)),
            (CurrencyCode::Aud, dec!(1.52)),
            (CurrencyCode::Cad, dec!(1.36)),
            (CurrencyCode::Chf, dec!(0.88)),
            (CurrencyCode::Cny, dec!(7.24)),
            (CurrencyCode::Sek, dec!(10.48)),
            (CurrencyCode::Nzd, dec!(1.66)),
        ])
    }

    #[test]
    fn test_usd_to_eur_example() {
        // 100.00 USD at EUR rate 0.92 -> 92.00 EUR
        let result = convert(dec!(100.00), "USD", "EUR", &test_rates()).unwrap();
        assert_eq!(result.converted, dec!(92.00));
        assert_eq!(result.rate, dec!(0.92));
    }

    #[test]
    fn test_same_currency_identity() {
        let result = convert(dec!(1234.56), "USD", "USD", &test_rates()).unwrap();
        assert_eq!(result.converted, dec!(1234.56));
        assert_eq!(result.rate, Decimal::ONE);
    }

    #[test]
    fn test_jpy_rounds_to_whole_units() {
        // 10.00 USD * 147.50 = 1475 JPY, no minor units
        let result = convert(dec!(10.00), "USD", "JPY", &test_rates()).unwrap();
        assert_eq!(result.converted, dec!(1475));
        assert_eq!(result.converted.scale(), 0);
    }

    #[test]
    fn test_bankers_rounding_midpoint_to_even() {
        // Rate chosen so products land exactly on a half-cent midpoint
        let rates = HashMap::from([
            (CurrencyCode::Usd, dec!(1.0)),
            (CurrencyCode::Eur, dec!(0.105)),
        ]);

        // 1.00 * 0.105 = 0.105 -> 0.10 (half to even, 0 is even)
        let result = convert(dec!(1.00), "USD", "EUR", &rates).unwrap();
        assert_eq!(result.converted, dec!(0.10));

        // 3.00 * 0.105 = 0.315 -> 0.32 (half to even)
        let result = convert(dec!(3.00), "USD", "EUR", &rates).unwrap();
        assert_eq!(result.converted, dec!(0.32));

        // 5.00 * 0.105 = 0.525 -> 0.52 (half to even)
        let result = convert(dec!(5.00), "USD", "EUR", &rates).unwrap();
        assert_eq!(result.converted, dec!(0.52));
    }

    #[test]
    fn test_unsupported_currency() {
        let err = convert(dec!(100), "USD", "XAU", &test_rates()).unwrap_err();
        assert_eq!(err, ConversionError::UnsupportedCurrency("XAU".to_string()));

        let err = convert(dec!(100), "BTC", "USD", &test_rates()).unwrap_err();
        assert_eq!(err, ConversionError::UnsupportedCurrency("BTC".to_string()));
    }

    #[test]
    fn test_amount_at_ceiling_overflows() {
        let err = convert(MAX_AMOUNT, "USD", "EUR", &test_rates()).unwrap_err();
        assert_eq!(err, ConversionError::AmountOverflow);
    }

    #[test]
    fn test_result_above_ceiling_overflows() {
        // Just under the input ceiling, but the JPY result crosses it
        let amount = dec!(99_999_999_999_999);
        let err = convert(amount, "USD", "JPY", &test_rates()).unwrap_err();
        assert_eq!(err, ConversionError::AmountOverflow);
    }

    #[test]
    fn test_below_ceiling_succeeds() {
        let amount = dec!(99_999_999_999_999.99);
        let result = convert(amount, "USD", "EUR", &test_rates()).unwrap();
        assert!(result.converted < MAX_AMOUNT);
    }

    #[test]
    fn test_missing_rate() {
        let rates = HashMap::from([(CurrencyCode::Usd, dec!(1.0))]);
        let err = convert(dec!(100), "USD", "EUR", &rates).unwrap_err();
        assert_eq!(err, ConversionError::MissingRate(CurrencyCode::Eur));
    }

    #[test]
    fn test_non_positive_rate_rejected() {
        let rates = HashMap::from([
            (CurrencyCode::Usd, dec!(1.0)),
            (CurrencyCode::Eur, dec!(0)),
        ]);
        let err = convert(dec!(100), "USD", "EUR", &rates).unwrap_err();
        assert_eq!(err, ConversionError::InvalidRate(CurrencyCode::Eur));
    }

    #[test]
    fn test_max_amount_is_ten_to_the_fourteenth() {
        assert_eq!(MAX_AMOUNT.to_string(), "100000000000000");
    }

    fn currency_strategy() -> impl Strategy<Value = CurrencyCode> {
        prop::sample::select(CurrencyCode::ALL.to_vec())
    }

    /// Positive amounts with two decimal places, up to one million.
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        /// Round-trip A -> B -> A stays within the rounding tolerance:
        /// half a minor unit of B scaled into A units, plus half a minor
        /// unit of A for the final rounding.
        #[test]
        fn prop_round_trip_within_tolerance(
            amount in amount_strategy(),
            from in currency_strategy(),
            to in currency_strategy(),
        ) {
            let rates = test_rates();

            let there = convert(amount, from.as_str(), to.as_str(), &rates).unwrap();
            let back = convert(there.converted, to.as_str(), from.as_str(), &rates).unwrap();

            let half = Decimal::new(5, 1);
            let half_b_in_a = half
                * Decimal::new(1, to.minor_units())
                * (rates[&from] / rates[&to]);
            let half_a = half * Decimal::new(1, from.minor_units());
            let tolerance = half_b_in_a + half_a;

            let diff = (back.converted - amount).abs();
            prop_assert!(
                diff <= tolerance,
                "round trip {from}->{to}->{from}: {amount} came back as {} (diff {diff} > tol {tolerance})",
                back.converted
            );
        }

        /// Identity: converting to the same currency returns the amount
        /// unchanged for any well-formed (minor-unit scale) input.
        #[test]
        fn prop_same_currency_unchanged(
            amount in amount_strategy(),
            code in currency_strategy(),
        ) {
            let rates = test_rates();
            let rounded = amount.round_dp_with_strategy(
                code.minor_units(),
                RoundingStrategy::MidpointNearestEven,
            );

            let result = convert(rounded, code.as_str(), code.as_str(), &rates).unwrap();
            prop_assert_eq!(result.converted, rounded);
        }

        /// Conversion of a positive amount is always positive.
        #[test]
        fn prop_positive_in_positive_out(
            amount in amount_strategy(),
            from in currency_strategy(),
            to in currency_strategy(),
        ) {
            let result = convert(amount, from.as_str(), to.as_str(), &test_rates()).unwrap();
            prop_assert!(result.converted >= Decimal::ZERO);
        }
    }
}
