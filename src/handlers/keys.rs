//! API key management.
//!
//! - POST /api/key/generate - Issue a new key, replacing the old one

use axum::{Extension, Json, extract::State};
use chrono::Utc;

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::SessionUser,
    models::api_key::GeneratedKeyResponse,
    services::{key_service, user_service},
};

/// Generate a new API key for the signed-in user.
///
/// # Response (200)
///
/// ```json
/// {
///   "success": true,
///   "apiKey": "Xb4...",
///   "expiresAt": "2025-01-31T10:00:00Z",
///   "message": "API key generated. It replaces any previous key."
/// }
/// ```
///
/// The key is valid for 30 days and shown only in this response. The
/// user's request count is not reset.
pub async fn generate_key(
    State(pool): State<DbPool>,
    Extension(session): Extension<SessionUser>,
) -> Result<Json<GeneratedKeyResponse>, AppError> {
    user_service::ensure_user(&pool, &session).await?;

    let generated = key_service::generate_key(&pool, session.user_id, Utc::now()).await?;

    Ok(Json(GeneratedKeyResponse {
        success: true,
        api_key: generated.api_key,
        expires_at: generated.expires_at,
        message: "API key generated. It replaces any previous key.",
    }))
}
