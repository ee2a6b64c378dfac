//! Prometheus metrics middleware.
//!
//! Collects HTTP request metrics plus application-specific counters for
//! conversions, rates requests, and database operations. Metric names and
//! label sets are stable and exposed at `GET /metrics`.

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramVec, IntCounterVec, IntGauge, Registry, TextEncoder, histogram_opts, opts,
};
use tracing::error;

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        opts!("http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status_code"],
    )
    .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registers once");
    counter
});

static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        histogram_opts!(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        ),
        &["method", "endpoint"],
    )
    .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("metric registers once");
    histogram
});

static HTTP_REQUESTS_IN_PROGRESS: Lazy<IntGauge> = Lazy::new(|| {
    let gauge = IntGauge::new(
        "http_requests_in_progress",
        "Number of HTTP requests currently being processed",
    )
    .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(gauge.clone()))
        .expect("metric registers once");
    gauge
});

static CURRENCY_CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        opts!(
            "currency_conversions_total",
            "Total number of currency conversions performed"
        ),
        &["from_currency", "to_currency", "status"],
    )
    .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registers once");
    counter
});

static RATES_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        opts!(
            "rates_requests_total",
            "Total number of exchange rates requests"
        ),
        &["endpoint", "status"],
    )
    .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registers once");
    counter
});

static DATABASE_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    let histogram = HistogramVec::new(
        histogram_opts!(
            "database_query_duration_seconds",
            "Database query duration in seconds",
            vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
        ),
        &["operation", "table"],
    )
    .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(histogram.clone()))
        .expect("metric registers once");
    histogram
});

static DATABASE_CONNECTION_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        opts!(
            "database_connection_errors_total",
            "Total number of database connection errors"
        ),
        &["error_type"],
    )
    .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registers once");
    counter
});

static DATABASE_OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let counter = IntCounterVec::new(
        opts!(
            "database_operations_total",
            "Total number of database operations"
        ),
        &["operation", "table", "status"],
    )
    .expect("metric definition is valid");
    REGISTRY
        .register(Box::new(counter.clone()))
        .expect("metric registers once");
    counter
});

/// Middleware that records request count, duration, and in-progress gauge.
///
/// The `/metrics` endpoint itself is skipped to avoid self-measurement.
pub async fn track_metrics(request: Request, next: Next) -> Response {
    if request.uri().path() == "/metrics" {
        return next.run(request).await;
    }

    // Prefer the route pattern over the raw path to keep label cardinality low
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path().to_string(), |p| p.as_str().to_string());
    let method = request.method().to_string();

    HTTP_REQUESTS_IN_PROGRESS.inc();
    let start = Instant::now();

    let response = next.run(request).await;

    let status_code = response.status().as_u16().to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &endpoint, &status_code])
        .inc();
    HTTP_REQUEST_DURATION
        .with_label_values(&[&method, &endpoint])
        .observe(start.elapsed().as_secs_f64());
    HTTP_REQUESTS_IN_PROGRESS.dec();

    response
}

/// Renders current metrics in Prometheus text exposition format.
#[must_use]
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Records a currency conversion attempt.
pub fn record_currency_conversion(from: &str, to: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    CURRENCY_CONVERSIONS_TOTAL
        .with_label_values(&[from, to, status])
        .inc();
}

/// Records an exchange rates request.
pub fn record_rates_request(endpoint: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    RATES_REQUESTS_TOTAL
        .with_label_values(&[endpoint, status])
        .inc();
}

/// Records a database operation.
pub fn record_database_operation(operation: &str, table: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    DATABASE_OPERATIONS_TOTAL
        .with_label_values(&[operation, table, status])
        .inc();
}

/// Records how long a database query took.
pub fn record_database_query_duration(operation: &str, table: &str, seconds: f64) {
    DATABASE_QUERY_DURATION
        .with_label_values(&[operation, table])
        .observe(seconds);
}

/// Counts connection-level database failures; other error kinds are
/// already covered by the operation counter.
pub fn record_database_error(error: &sea_orm::DbErr) {
    let error_type = match error {
        sea_orm::DbErr::Conn(_) => "connect",
        sea_orm::DbErr::ConnectionAcquire(_) => "acquire",
        _ => return,
    };
    DATABASE_CONNECTION_ERRORS
        .with_label_values(&[error_type])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_recorded_families() {
        record_currency_conversion("USD", "EUR", true);
        record_rates_request("rates", true);
        record_database_operation("insert", "conversion_history", true);
        record_database_query_duration("select", "exchange_rates", 0.003);
        record_database_error(&sea_orm::DbErr::ConnectionAcquire(
            sea_orm::ConnAcquireErr::Timeout,
        ));

        let output = render();
        assert!(output.contains("currency_conversions_total"));
        assert!(output.contains("rates_requests_total"));
        assert!(output.contains("database_operations_total"));
        assert!(output.contains("database_query_duration_seconds"));
        assert!(output.contains(r#"database_connection_errors_total{error_type="acquire"}"#));
    }
}
