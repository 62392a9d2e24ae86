//! Users mirrored from the session provider.

use crate::{
    db::DbPool,
    error::AppError,
    middleware::auth::SessionUser,
    models::user::User,
};

/// Make sure a `users` row exists for the session user.
///
/// Called before any write that references the user; an existing row is
/// left untouched.
pub async fn ensure_user(pool: &DbPool, session: &SessionUser) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, name, avatar_url)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .bind(session.user_id)
    .bind(session.email.as_deref().unwrap_or_default())
    .bind(&session.name)
    .bind(&session.avatar_url)
    .execute(pool)
    .await?;

    Ok(())
}

/// Upsert the user from the session claims and ensure default settings exist.
pub async fn sync_user(pool: &DbPool, session: &SessionUser) -> Result<User, AppError> {
    let email = session
        .email
        .as_deref()
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("User ID and email are required".to_string()))?;

    let mut tx = pool.begin().await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, name, avatar_url)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (id) DO UPDATE
        SET email = EXCLUDED.email,
            name = EXCLUDED.name,
            avatar_url = EXCLUDED.avatar_url,
            updated_at = NOW()
        RETURNING id, email, name, avatar_url, created_at, updated_at
        "#,
    )
    .bind(session.user_id)
    .bind(email)
    .bind(&session.name)
    .bind(&session.avatar_url)
    .fetch_one(&mut *tx)
    .await?;

    // Column defaults hold the default preferences
    sqlx::query("INSERT INTO user_settings (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(session.user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(user_id = %user.id, "user synced");

    Ok(user)
}
