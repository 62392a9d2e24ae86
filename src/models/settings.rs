//! Generation preferences and the settings API types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound accepted for `faq_count`, matching the table's CHECK constraint.
pub const MAX_FAQ_COUNT: i32 = 50;

/// Represents a `user_settings` row.
///
/// New rows take their values from the column defaults: language `de`,
/// 6 questions, `professional` tone, model `gpt-4o-mini`, `json` export.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserSettings {
    pub user_id: Uuid,
    pub language: String,
    pub faq_count: i32,
    pub tone: String,
    pub model: String,
    pub export_format: String,
    pub updated_at: DateTime<Utc>,
}

/// Request body for `POST /api/settings`.
///
/// Every field is optional; absent fields keep their stored value.
///
/// # JSON Example
///
/// ```json
/// { "language": "en", "faqCount": 8 }
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub language: Option<String>,
    pub faq_count: Option<i32>,
    pub tone: Option<String>,
    pub model: Option<String>,
    pub export_format: Option<String>,
}

impl UpdateSettingsRequest {
    /// Reject values the store would refuse or the generator cannot use.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(count) = self.faq_count {
            if !(1..=MAX_FAQ_COUNT).contains(&count) {
                return Err(format!("faqCount must be between 1 and {}", MAX_FAQ_COUNT));
            }
        }

        let text_fields = [
            ("language", &self.language),
            ("tone", &self.tone),
            ("model", &self.model),
            ("exportFormat", &self.export_format),
        ];
        for (name, value) in text_fields {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(format!("{} must not be empty", name));
            }
        }

        Ok(())
    }
}

/// Response body for the settings endpoints.
///
/// Combines the stored preferences with a read-only view of the user's
/// API key and current usage. The key itself is never returned here.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    pub language: String,
    pub faq_count: i32,
    pub tone: String,
    pub model: String,
    pub export_format: String,
    pub api_key_prefix: Option<String>,
    pub api_key_created_at: Option<DateTime<Utc>>,
    pub api_key_expires_at: Option<DateTime<Utc>>,

    /// Requests counted in the user's current window
    pub api_count: i32,

    pub updated_at: DateTime<Utc>,
}
