//! Rate repository for current and historical exchange rates.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{exchange_rates, rate_history};
use fxserve_core::CurrencyCode;

/// Error types for rate operations.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    /// No current rate stored for the currency.
    #[error("no exchange rate found for {0}")]
    RateNotFound(CurrencyCode),

    /// Rate must be positive.
    #[error("exchange rate must be positive")]
    NonPositiveRate,

    /// USD is the base currency and its rate is fixed at 1.0.
    #[error("the base currency rate is fixed at 1.0")]
    BaseRateImmutable,

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Repository for current and historical exchange rates.
#[derive(Debug, Clone)]
pub struct RateRepository {
    db: DatabaseConnection,
}

impl RateRepository {
    /// Creates a new rate repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Returns the current USD-relative rate for a currency.
    ///
    /// # Errors
    ///
    /// Returns `RateNotFound` if the currency has not been seeded.
    pub async fn current_rate(&self, code: CurrencyCode) -> Result<Decimal, RateError> {
        let row = exchange_rates::Entity::find_by_id(code.as_str())
            .one(&self.db)
            .await?;

        row.map(|r| r.rate).ok_or(RateError::RateNotFound(code))
    }

    /// Returns all current rates, ordered by currency code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn all_current_rates(&self) -> Result<Vec<exchange_rates::Model>, RateError> {
        let rates = exchange_rates::Entity::find()
            .order_by_asc(exchange_rates::Column::CurrencyCode)
            .all(&self.db)
            .await?;

        Ok(rates)
    }

    /// Returns the current rates as a lookup table for the calculator.
    ///
    /// Rows with codes outside the supported set are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn rate_table(&self) -> Result<HashMap<CurrencyCode, Decimal>, RateError> {
        let rows = self.all_current_rates().await?;

        let mut table = HashMap::with_capacity(rows.len());
        for row in rows {
            match CurrencyCode::from_str(row.currency_code.trim()) {
                Ok(code) => {
                    table.insert(code, row.rate);
                }
                Err(_) => {
                    tracing::warn!(code = %row.currency_code, "skipping unsupported currency row");
                }
            }
        }

        Ok(table)
    }

    /// Returns the rate history for a currency over a time window,
    /// chronologically ordered (oldest first).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn history(
        &self,
        code: CurrencyCode,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<rate_history::Model>, RateError> {
        let entries = rate_history::Entity::find()
            .filter(rate_history::Column::CurrencyCode.eq(code.as_str()))
            .filter(rate_history::Column::RecordedAt.gte(start))
            .filter(rate_history::Column::RecordedAt.lte(end))
            .order_by_asc(rate_history::Column::RecordedAt)
            .all(&self.db)
            .await?;

        Ok(entries)
    }

    /// Sets the current rate for a currency and appends a history entry.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The rate is not positive
    /// - The currency is USD and the rate is not exactly 1.0
    pub async fn upsert_current_rate(
        &self,
        code: CurrencyCode,
        rate: Decimal,
        source: &str,
    ) -> Result<exchange_rates::Model, RateError> {
        if !validate_rate_positive(rate) {
            return Err(RateError::NonPositiveRate);
        }
        if !validate_base_rate(code, rate) {
            return Err(RateError::BaseRateImmutable);
        }

        let now: chrono::DateTime<chrono::FixedOffset> = Utc::now().into();

        // The current-rate write and the history append must land together
        let txn = self.db.begin().await?;

        let existing = exchange_rates::Entity::find_by_id(code.as_str())
            .one(&txn)
            .await?;

        let current = if let Some(row) = existing {
            let mut active: exchange_rates::ActiveModel = row.into();
            active.rate = Set(rate);
            active.updated_at = Set(now);
            active.update(&txn).await?
        } else {
            let row = exchange_rates::ActiveModel {
                currency_code: Set(code.as_str().to_string()),
                rate: Set(rate),
                updated_at: Set(now),
            };
            row.insert(&txn).await?
        };

        // History is append-only; one row per rate change
        let entry = rate_history::ActiveModel {
            id: Set(Uuid::new_v4()),
            currency_code: Set(code.as_str().to_string()),
            rate: Set(rate),
            recorded_at: Set(now),
            source: Set(source.to_string()),
        };
        entry.insert(&txn).await?;

        txn.commit().await?;

        Ok(current)
    }
}

// ============================================================================
// Pure validation functions for property testing
// ============================================================================

/// Validates that an exchange rate is positive.
#[must_use]
pub fn validate_rate_positive(rate: Decimal) -> bool {
    rate > Decimal::ZERO
}

/// Validates the base-currency invariant: USD's rate is exactly 1.0.
#[must_use]
pub fn validate_base_rate(code: CurrencyCode, rate: Decimal) -> bool {
    !code.is_base() || rate == Decimal::ONE
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_base_rate_invariant() {
        assert!(validate_base_rate(CurrencyCode::Usd, dec!(1.0)));
        assert!(!validate_base_rate(CurrencyCode::Usd, dec!(1.01)));
        assert!(validate_base_rate(CurrencyCode::Eur, dec!(0.92)));
    }

    proptest! {
        /// For any positive rate, validation passes; for any zero or
        /// negative rate, it fails.
        #[test]
        fn prop_rate_must_be_positive(rate_units in -1_000_000i64..1_000_000i64) {
            let rate = Decimal::new(rate_units, 4);
            let is_valid = validate_rate_positive(rate);

            if rate > Decimal::ZERO {
                prop_assert!(is_valid, "positive rate should be valid");
            } else {
                prop_assert!(!is_valid, "zero or negative rate should be invalid");
            }
        }

        /// Non-USD currencies accept any positive rate; USD only 1.0.
        #[test]
        fn prop_base_rate_fixed(rate_units in 1i64..1_000_000i64) {
            let rate = Decimal::new(rate_units, 4);

            if rate == Decimal::ONE {
                prop_assert!(validate_base_rate(CurrencyCode::Usd, rate));
            } else {
                prop_assert!(!validate_base_rate(CurrencyCode::Usd, rate));
            }
            prop_assert!(validate_base_rate(CurrencyCode::Jpy, rate));
        }
    }
}
