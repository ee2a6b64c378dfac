//! Conversion audit writer.
//!
//! Persists one immutable record per conversion request. Records are
//! never updated or deleted by the service.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use uuid::Uuid;

use crate::entities::conversion_history;
use fxserve_core::CurrencyCode;

/// Error types for audit persistence.
#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for a new conversion audit record.
#[derive(Debug, Clone)]
pub struct NewConversion {
    /// Unique conversion identifier (also the correlation id in logs).
    pub id: Uuid,
    /// Account the conversion was performed for.
    pub account_id: Uuid,
    /// Input amount.
    pub amount: Decimal,
    /// Source currency.
    pub from_currency: CurrencyCode,
    /// Target currency.
    pub to_currency: CurrencyCode,
    /// Output amount.
    pub converted_amount: Decimal,
    /// Effective cross rate applied.
    pub exchange_rate: Decimal,
}

/// Writer for conversion audit records.
#[derive(Debug, Clone)]
pub struct ConversionAuditWriter {
    db: DatabaseConnection,
}

impl ConversionAuditWriter {
    /// Creates a new conversion audit writer.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Persists a conversion audit record.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails; the caller surfaces this as
    /// a generic server error.
    pub async fn record(
        &self,
        input: NewConversion,
    ) -> Result<conversion_history::Model, AuditError> {
        let row = conversion_history::ActiveModel {
            id: Set(input.id),
            account_id: Set(input.account_id),
            amount: Set(input.amount),
            from_currency: Set(input.from_currency.as_str().to_string()),
            to_currency: Set(input.to_currency.as_str().to_string()),
            converted_amount: Set(input.converted_amount),
            exchange_rate: Set(input.exchange_rate),
            created_at: Set(Utc::now().into()),
        };

        let record = row.insert(&self.db).await?;
        Ok(record)
    }

    /// Looks up a conversion record by its identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<conversion_history::Model>, AuditError> {
        let record = conversion_history::Entity::find_by_id(id)
            .one(&self.db)
            .await?;
        Ok(record)
    }
}
