//! Initial database migration.
//!
//! Creates the rate and conversion audit tables. Numeric precisions:
//! NUMERIC(15,8) for rates, NUMERIC(20,2) for amounts.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(EXCHANGE_RATES_SQL).await?;
        db.execute_unprepared(RATE_HISTORY_SQL).await?;
        db.execute_unprepared(CONVERSION_HISTORY_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        db.execute_unprepared(
            "DROP TABLE IF EXISTS conversion_history;
             DROP TABLE IF EXISTS rate_history;
             DROP TABLE IF EXISTS exchange_rates;",
        )
        .await?;

        Ok(())
    }
}

const EXCHANGE_RATES_SQL: &str = r"
-- Current USD-relative rate, one row per currency
CREATE TABLE exchange_rates (
    currency_code CHAR(3) PRIMARY KEY,
    rate NUMERIC(15,8) NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_rate_positive CHECK (rate > 0),
    CONSTRAINT chk_usd_is_base CHECK (currency_code <> 'USD' OR rate = 1.0)
);
";

const RATE_HISTORY_SQL: &str = r"
-- Append-only rate time series; rows are never updated or deleted
CREATE TABLE rate_history (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    currency_code CHAR(3) NOT NULL,
    rate NUMERIC(15,8) NOT NULL,
    recorded_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    source VARCHAR(32) NOT NULL DEFAULT 'manual',
    CONSTRAINT chk_history_rate_positive CHECK (rate > 0)
);

-- Index for chronological range queries per currency
CREATE INDEX idx_rate_history_currency_time ON rate_history(currency_code, recorded_at);
";

const CONVERSION_HISTORY_SQL: &str = r"
-- Immutable conversion audit records
CREATE TABLE conversion_history (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL,
    amount NUMERIC(20,2) NOT NULL,
    from_currency CHAR(3) NOT NULL,
    to_currency CHAR(3) NOT NULL,
    converted_amount NUMERIC(20,2) NOT NULL,
    exchange_rate NUMERIC(15,8) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_amount_positive CHECK (amount > 0)
);

-- Index for per-account audit queries
CREATE INDEX idx_conversion_history_account ON conversion_history(account_id, created_at DESC);
";
