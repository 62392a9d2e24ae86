//! Per-user throttling state for the public API.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Represents a row of the `api_rate_windows` table.
///
/// The window belongs to the user, not to a key, so rotating the key keeps
/// the count and anchor intact.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RateWindow {
    pub user_id: Uuid,

    /// Accepted requests since the window was last reset.
    pub request_count: i32,

    /// Time of the most recently accepted request. `None` until the first call.
    pub last_request_at: Option<DateTime<Utc>>,
}
