//! Currency conversion route.

use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::middleware::metrics::{
    record_currency_conversion, record_database_error, record_database_operation,
    record_database_query_duration,
};
use crate::{AppState, middleware::AuthAccount};
use fxserve_core::{ConversionError, CurrencyCode, convert};
use fxserve_db::repositories::{
    AuditError, ConversionAuditWriter, NewConversion, RateError, RateRepository,
};

/// Creates the conversion routes (requires auth middleware to be applied externally).
pub fn routes() -> Router<AppState> {
    Router::new().route("/convert", post(convert_currency))
}

/// Request body for a conversion.
#[derive(Debug, Deserialize)]
pub struct ConvertRequest {
    /// Amount to convert (must be positive).
    pub amount: Decimal,
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
}

/// Response for a successful conversion.
#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    /// Unique conversion identifier (audit correlation id).
    pub conversion_id: Uuid,
    /// Input amount.
    pub amount: String,
    /// Source currency code.
    pub from_currency: String,
    /// Target currency code.
    pub to_currency: String,
    /// Converted amount, rounded to the target currency's minor units.
    pub converted_amount: String,
    /// Effective cross rate applied.
    pub exchange_rate: String,
    /// Time the conversion was performed.
    pub timestamp: DateTime<Utc>,
}

/// POST `/convert` - Convert an amount between two supported currencies.
#[allow(clippy::too_many_lines)]
async fn convert_currency(
    State(state): State<AppState>,
    auth: AuthAccount,
    Json(payload): Json<ConvertRequest>,
) -> impl IntoResponse {
    // Input validation before any database access
    if payload.amount <= Decimal::ZERO {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": "Amount must be positive"
            })),
        )
            .into_response();
    }

    let parsed_from = payload.from_currency.parse::<CurrencyCode>();
    let parsed_to = payload.to_currency.parse::<CurrencyCode>();
    let (from_code, to_code) = match (parsed_from, parsed_to) {
        (Ok(from), Ok(to)) => (from, to),
        (from, to) => {
            let rejected = if from.is_err() {
                &payload.from_currency
            } else {
                &payload.to_currency
            };
            // Client-supplied strings never become label values
            record_currency_conversion(
                from.map_or("invalid", CurrencyCode::as_str),
                to.map_or("invalid", CurrencyCode::as_str),
                false,
            );
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "error": "unsupported_currency",
                    "message": format!("Currency '{rejected}' is not supported")
                })),
            )
                .into_response();
        }
    };

    // The audit record stores amounts at minor-unit precision; excess
    // decimal places would be silently rounded by the database
    if payload.amount.normalize().scale() > from_code.minor_units() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_amount",
                "message": format!(
                    "Amount has more decimal places than {from_code} supports"
                )
            })),
        )
            .into_response();
    }

    let rate_repo = RateRepository::new((*state.db).clone());

    let started = Instant::now();
    let table = rate_repo.rate_table().await;
    record_database_query_duration("select", "exchange_rates", started.elapsed().as_secs_f64());

    let rates = match table {
        Ok(table) => {
            record_database_operation("select", "exchange_rates", true);
            table
        }
        Err(e) => {
            record_database_operation("select", "exchange_rates", false);
            if let RateError::Database(db_err) = &e {
                record_database_error(db_err);
            }
            error!(error = %e, "Failed to load rate table");
            return internal_error();
        }
    };

    let conversion = match convert(payload.amount, from_code.as_str(), to_code.as_str(), &rates) {
        Ok(c) => c,
        Err(e) => {
            record_currency_conversion(from_code.as_str(), to_code.as_str(), false);
            return conversion_error_response(&e);
        }
    };

    // Round the applied rate to storage precision (NUMERIC(15,8))
    let applied_rate = conversion
        .rate
        .round_dp_with_strategy(8, RoundingStrategy::MidpointNearestEven);

    let conversion_id = Uuid::new_v4();
    let writer = ConversionAuditWriter::new((*state.db).clone());
    let audit = NewConversion {
        id: conversion_id,
        account_id: auth.account_id(),
        amount: payload.amount,
        from_currency: conversion.from,
        to_currency: conversion.to,
        converted_amount: conversion.converted,
        exchange_rate: applied_rate,
    };

    let started = Instant::now();
    let recorded = writer.record(audit).await;
    record_database_query_duration(
        "insert",
        "conversion_history",
        started.elapsed().as_secs_f64(),
    );

    match recorded {
        Ok(record) => {
            record_database_operation("insert", "conversion_history", true);
            record_currency_conversion(conversion.from.as_str(), conversion.to.as_str(), true);
            info!(
                conversion_id = %conversion_id,
                account_id = %auth.account_id(),
                from = %conversion.from,
                to = %conversion.to,
                "Conversion recorded"
            );

            let response = ConvertResponse {
                conversion_id,
                amount: payload.amount.to_string(),
                from_currency: conversion.from.to_string(),
                to_currency: conversion.to.to_string(),
                converted_amount: conversion.converted.to_string(),
                exchange_rate: applied_rate.to_string(),
                timestamp: record.created_at.with_timezone(&Utc),
            };

            (StatusCode::OK, Json(json!(response))).into_response()
        }
        Err(e) => {
            record_database_operation("insert", "conversion_history", false);
            record_currency_conversion(conversion.from.as_str(), conversion.to.as_str(), false);
            let AuditError::Database(db_err) = &e;
            record_database_error(db_err);
            error!(conversion_id = %conversion_id, error = %e, "Failed to persist conversion record");
            internal_error()
        }
    }
}

fn conversion_error_response(error: &ConversionError) -> axum::response::Response {
    match error {
        ConversionError::UnsupportedCurrency(code) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "unsupported_currency",
                "message": format!("Currency '{code}' is not supported")
            })),
        )
            .into_response(),
        ConversionError::AmountOverflow => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "amount_overflow",
                "message": "Amount exceeds the maximum supported magnitude"
            })),
        )
            .into_response(),
        ConversionError::MissingRate(code) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "rate_not_found",
                "message": format!("No exchange rate available for {code}")
            })),
        )
            .into_response(),
        ConversionError::InvalidRate(code) => {
            error!(currency = %code, "Stored rate is invalid");
            internal_error()
        }
    }
}

fn internal_error() -> axum::response::Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "error": "internal_error",
            "message": "An error occurred"
        })),
    )
        .into_response()
}
