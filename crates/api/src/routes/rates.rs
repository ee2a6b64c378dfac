//! Exchange rate query routes.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::middleware::metrics::{
    record_database_error, record_database_operation, record_database_query_duration,
    record_rates_request,
};
use crate::AppState;
use fxserve_core::CurrencyCode;
use fxserve_db::repositories::{RateError, RateRepository};

/// Default history window in days.
const DEFAULT_HISTORY_DAYS: i64 = 7;
/// Maximum history window in days.
const MAX_HISTORY_DAYS: i64 = 365;

/// Creates the rate query routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/rates", get(get_rates))
        .route("/rates/history", get(get_rate_history))
}

/// Query parameters for the history endpoint.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Currency to query.
    pub currency: String,
    /// Number of days to look back (default 7, capped at 365).
    pub days: Option<i64>,
}

/// A single rate history entry.
#[derive(Debug, Serialize)]
pub struct HistoryEntry {
    /// Currency code.
    pub currency: String,
    /// USD-relative rate at that time.
    pub rate: String,
    /// When the rate was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Source tag of the rate.
    pub source: String,
}

/// GET `/rates` - All current rates, keyed by currency code.
async fn get_rates(State(state): State<AppState>) -> impl IntoResponse {
    let repo = RateRepository::new((*state.db).clone());

    let started = Instant::now();
    let rows = repo.all_current_rates().await;
    record_database_query_duration("select", "exchange_rates", started.elapsed().as_secs_f64());

    match rows {
        Ok(rows) => {
            record_database_operation("select", "exchange_rates", true);
            record_rates_request("rates", true);

            let updated_at = rows
                .iter()
                .map(|r| r.updated_at.with_timezone(&Utc))
                .max();
            let mut rates = serde_json::Map::new();
            for row in &rows {
                rates.insert(
                    row.currency_code.trim().to_string(),
                    json!(row.rate.to_string()),
                );
            }

            (
                StatusCode::OK,
                Json(json!({
                    "base_currency": "USD",
                    "rates": rates,
                    "updated_at": updated_at
                })),
            )
                .into_response()
        }
        Err(e) => {
            record_database_operation("select", "exchange_rates", false);
            record_rates_request("rates", false);
            if let RateError::Database(db_err) = &e {
                record_database_error(db_err);
            }
            error!(error = %e, "Failed to list current rates");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}

/// GET `/rates/history?currency=&days=` - Time-series rate data.
async fn get_rate_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let Ok(code) = query.currency.parse::<CurrencyCode>() else {
        record_rates_request("rates_history", false);
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": "unsupported_currency",
                "message": format!("Currency '{}' is not supported", query.currency)
            })),
        )
            .into_response();
    };

    let days = query.days.unwrap_or(DEFAULT_HISTORY_DAYS);
    if days < 1 || days > MAX_HISTORY_DAYS {
        record_rates_request("rates_history", false);
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_days",
                "message": format!("days must be between 1 and {MAX_HISTORY_DAYS}")
            })),
        )
            .into_response();
    }

    let repo = RateRepository::new((*state.db).clone());
    let end = Utc::now();
    let start = end - Duration::days(days);

    let started = Instant::now();
    let entries = repo.history(code, start, end).await;
    record_database_query_duration("select", "rate_history", started.elapsed().as_secs_f64());

    match entries {
        Ok(entries) => {
            record_database_operation("select", "rate_history", true);
            record_rates_request("rates_history", true);

            let entries: Vec<HistoryEntry> = entries
                .into_iter()
                .map(|e| HistoryEntry {
                    currency: e.currency_code.trim().to_string(),
                    rate: e.rate.to_string(),
                    recorded_at: e.recorded_at.with_timezone(&Utc),
                    source: e.source,
                })
                .collect();

            (
                StatusCode::OK,
                Json(json!({
                    "currency": code.to_string(),
                    "days": days,
                    "entries": entries
                })),
            )
                .into_response()
        }
        Err(e) => {
            record_database_operation("select", "rate_history", false);
            record_rates_request("rates_history", false);
            if let RateError::Database(db_err) = &e {
                record_database_error(db_err);
            }
            error!(error = %e, currency = %code, "Failed to load rate history");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response()
        }
    }
}
