//! `SeaORM` entity definitions.

pub mod conversion_history;
pub mod exchange_rates;
pub mod rate_history;
