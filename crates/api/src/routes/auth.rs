//! Authentication route for the demo credential flow.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use serde_json::json;
use tracing::{error, info};

use crate::AppState;
use fxserve_shared::auth::{TokenRequest, TokenResponse};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/auth/token", post(issue_token))
}

/// POST `/auth/token` - Exchange the configured API key for an access token.
async fn issue_token(
    State(state): State<AppState>,
    Json(payload): Json<TokenRequest>,
) -> impl IntoResponse {
    if payload.api_key != *state.api_key {
        info!(account_id = %payload.account_id, "Token request with invalid API key");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "invalid_credentials",
                "message": "Invalid API key"
            })),
        )
            .into_response();
    }

    match state.jwt_service.generate_access_token(payload.account_id) {
        Ok(access_token) => {
            info!(account_id = %payload.account_id, "Access token issued");
            let response =
                TokenResponse::new(access_token, state.jwt_service.access_token_expires_in());
            (StatusCode::OK, Json(json!(response))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to generate access token");
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
