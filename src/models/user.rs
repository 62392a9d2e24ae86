//! User model mirrored from the session provider.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Represents a user record from the database.
///
/// The `id` is the subject of the session token; rows are upserted on
/// sync and never created any other way.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Response body of `POST /api/user/sync`.
#[derive(Debug, Serialize)]
pub struct SyncUserResponse {
    pub success: bool,
    pub user: User,
}
