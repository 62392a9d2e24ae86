//! User settings endpoints.
//!
//! - GET /api/settings - Current preferences plus key/usage state
//! - POST /api/settings - Partial update of the preferences

use axum::{Extension, Json, extract::State};

use crate::{
    db::DbPool,
    error::AppError,
    extract::JsonBody,
    middleware::auth::SessionUser,
    models::settings::{SettingsResponse, UpdateSettingsRequest},
    services::{settings_service, user_service},
};

/// Get the signed-in user's settings, creating defaults on first access.
///
/// # Response (200)
///
/// ```json
/// {
///   "language": "de",
///   "faqCount": 6,
///   "tone": "professional",
///   "model": "gpt-4o-mini",
///   "exportFormat": "json",
///   "apiKeyPrefix": "Xb4kQ9aT",
///   "apiKeyCreatedAt": "2025-01-01T10:00:00Z",
///   "apiKeyExpiresAt": "2025-01-31T10:00:00Z",
///   "apiCount": 3,
///   "updatedAt": "2025-01-01T10:00:00Z"
/// }
/// ```
pub async fn get_settings(
    State(pool): State<DbPool>,
    Extension(session): Extension<SessionUser>,
) -> Result<Json<SettingsResponse>, AppError> {
    user_service::ensure_user(&pool, &session).await?;

    let settings = settings_service::get_or_create(&pool, session.user_id).await?;

    Ok(Json(settings_service::to_response(&pool, settings).await?))
}

/// Update the signed-in user's settings.
///
/// Only the fields present in the body change.
pub async fn update_settings(
    State(pool): State<DbPool>,
    Extension(session): Extension<SessionUser>,
    JsonBody(request): JsonBody<UpdateSettingsRequest>,
) -> Result<Json<SettingsResponse>, AppError> {
    user_service::ensure_user(&pool, &session).await?;

    let settings = settings_service::update(&pool, session.user_id, request).await?;

    Ok(Json(settings_service::to_response(&pool, settings).await?))
}
