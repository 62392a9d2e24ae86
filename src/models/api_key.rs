//! API key credential model.
//!
//! Each user owns at most one credential. Keys are stored as SHA-256 hashes;
//! the plaintext is only returned once, at generation time.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::rate_window::RateWindow;

/// Displayable view of a credential record.
///
/// # Database Table
///
/// Maps to the `api_credentials` table with columns:
/// - `user_id`: Owning user, also the primary key
/// - `key_hash`: SHA-256 hash of the active API key (unique, never read back)
/// - `key_prefix`: First characters of the key, safe to display
/// - `created_at`: When the key was issued
/// - `expires_at`: When the key stops being accepted
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Credential {
    pub key_prefix: String,

    pub created_at: DateTime<Utc>,

    /// A key is rejected once the current time is strictly after this instant.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Row read by the gateway: the credential joined with its owner's rate window.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GatewayRecord {
    pub user_id: Uuid,
    pub expires_at: Option<DateTime<Utc>>,
    pub request_count: i32,
    pub last_request_at: Option<DateTime<Utc>>,
}

impl GatewayRecord {
    pub fn window(&self) -> RateWindow {
        RateWindow {
            user_id: self.user_id,
            request_count: self.request_count,
            last_request_at: self.last_request_at,
        }
    }
}

/// Response body of `POST /api/key/generate`.
///
/// # JSON Example
///
/// ```json
/// {
///   "success": true,
///   "apiKey": "Xb4...",
///   "expiresAt": "2025-01-31T10:00:00Z",
///   "message": "API key generated. It replaces any previous key."
/// }
/// ```
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedKeyResponse {
    pub success: bool,
    pub api_key: String,
    pub expires_at: DateTime<Utc>,
    pub message: &'static str,
}
