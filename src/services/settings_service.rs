//! Per-user generation preferences.

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{
        api_key::Credential,
        settings::{SettingsResponse, UpdateSettingsRequest, UserSettings},
    },
};

/// Fetch the user's settings, creating the default row on first access.
///
/// The user row must already exist.
pub async fn get_or_create(pool: &DbPool, user_id: Uuid) -> Result<UserSettings, AppError> {
    // DO UPDATE with a no-op assignment so RETURNING yields the existing row too
    let settings = sqlx::query_as::<_, UserSettings>(
        r#"
        INSERT INTO user_settings (user_id)
        VALUES ($1)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING user_id, language, faq_count, tone, model, export_format, updated_at
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(settings)
}

/// Apply a partial update. Fields absent from `request` keep their value.
///
/// # Errors
///
/// - `InvalidRequest`: A value fails validation
/// - `Database`: Database error occurred
pub async fn update(
    pool: &DbPool,
    user_id: Uuid,
    request: UpdateSettingsRequest,
) -> Result<UserSettings, AppError> {
    request.validate().map_err(AppError::InvalidRequest)?;

    let settings = sqlx::query_as::<_, UserSettings>(
        r#"
        INSERT INTO user_settings (user_id, language, faq_count, tone, model, export_format)
        VALUES (
            $1,
            COALESCE($2, 'de'),
            COALESCE($3, 6),
            COALESCE($4, 'professional'),
            COALESCE($5, 'gpt-4o-mini'),
            COALESCE($6, 'json')
        )
        ON CONFLICT (user_id) DO UPDATE
        SET language = COALESCE($2, user_settings.language),
            faq_count = COALESCE($3, user_settings.faq_count),
            tone = COALESCE($4, user_settings.tone),
            model = COALESCE($5, user_settings.model),
            export_format = COALESCE($6, user_settings.export_format),
            updated_at = NOW()
        RETURNING user_id, language, faq_count, tone, model, export_format, updated_at
        "#,
    )
    .bind(user_id)
    .bind(request.language)
    .bind(request.faq_count)
    .bind(request.tone)
    .bind(request.model)
    .bind(request.export_format)
    .fetch_one(pool)
    .await?;

    tracing::info!(%user_id, "settings updated");

    Ok(settings)
}

/// Combine preferences with the user's key and usage state for display.
pub async fn to_response(
    pool: &DbPool,
    settings: UserSettings,
) -> Result<SettingsResponse, AppError> {
    let credential = sqlx::query_as::<_, Credential>(
        "SELECT key_prefix, created_at, expires_at FROM api_credentials WHERE user_id = $1",
    )
    .bind(settings.user_id)
    .fetch_optional(pool)
    .await?;

    let api_count: i32 =
        sqlx::query_scalar("SELECT request_count FROM api_rate_windows WHERE user_id = $1")
            .bind(settings.user_id)
            .fetch_optional(pool)
            .await?
            .unwrap_or(0);

    Ok(SettingsResponse {
        language: settings.language,
        faq_count: settings.faq_count,
        tone: settings.tone,
        model: settings.model,
        export_format: settings.export_format,
        api_key_prefix: credential.as_ref().map(|c| c.key_prefix.clone()),
        api_key_created_at: credential.as_ref().map(|c| c.created_at),
        api_key_expires_at: credential.and_then(|c| c.expires_at),
        api_count,
        updated_at: settings.updated_at,
    })
}
