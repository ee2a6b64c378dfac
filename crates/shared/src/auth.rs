//! Authentication types for JWT tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (account ID).
    pub sub: Uuid,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an account.
    #[must_use]
    pub fn new(account_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: account_id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the account ID from claims.
    #[must_use]
    pub const fn account_id(&self) -> Uuid {
        self.sub
    }
}

/// Token request payload for the demo credential flow.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRequest {
    /// API key configured for the service.
    pub api_key: String,
    /// Account the token should be issued for.
    pub account_id: Uuid,
}

/// Token response payload.
#[derive(Debug, Clone, Serialize)]
pub struct TokenResponse {
    /// Access token (short-lived).
    pub access_token: String,
    /// Token type, always "Bearer".
    pub token_type: &'static str,
    /// Access token expiration in seconds.
    pub expires_in: i64,
}

impl TokenResponse {
    /// Creates a new token response.
    #[must_use]
    pub const fn new(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer",
            expires_in,
        }
    }
}
