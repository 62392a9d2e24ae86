//! API key issuance and rotation.
//!
//! A user holds at most one key. Generating a key replaces the previous
//! one in place, so the old key stops matching immediately. The user's
//! request window is deliberately left alone: rotating keys must not hand
//! out a fresh hourly allowance.

use chrono::{DateTime, TimeDelta, Utc};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{db::DbPool, error::AppError};

/// Number of characters in a generated key.
pub const API_KEY_LENGTH: usize = 40;

/// Days a freshly generated key stays valid.
pub const API_KEY_VALIDITY_DAYS: i64 = 30;

/// Characters of the key kept in clear for display.
const KEY_PREFIX_LENGTH: usize = 8;

/// A newly issued key. The plaintext exists only in this value.
#[derive(Debug, Clone)]
pub struct GeneratedKey {
    pub api_key: String,
    pub expires_at: DateTime<Utc>,
}

/// Draw a random alphanumeric token.
///
/// Each character is sampled uniformly from `[A-Za-z0-9]` using the
/// thread-local CSPRNG, which is seeded from the operating system.
pub fn generate_api_key() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(API_KEY_LENGTH)
        .map(char::from)
        .collect()
}

/// SHA-256 of the key, hex encoded. This is what the store indexes.
pub fn hash_key(api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(api_key.as_bytes());

    hex::encode(hasher.finalize())
}

fn key_prefix(api_key: &str) -> &str {
    let end = api_key
        .char_indices()
        .nth(KEY_PREFIX_LENGTH)
        .map_or(api_key.len(), |(i, _)| i);
    &api_key[..end]
}

/// Issue a new key for `user_id`, replacing any existing one.
///
/// # Process
///
/// 1. Generate a random key; expiry is `now + 30 days`
/// 2. Upsert the credential row (old hash overwritten)
/// 3. Create the user's rate window if it does not exist yet
///
/// Step 3 never touches an existing window: `request_count` and
/// `last_request_at` survive rotation.
///
/// The user row must already exist.
pub async fn generate_key(
    pool: &DbPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<GeneratedKey, AppError> {
    let api_key = generate_api_key();
    let expires_at = now + TimeDelta::days(API_KEY_VALIDITY_DAYS);

    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO api_credentials (user_id, key_hash, key_prefix, created_at, expires_at)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (user_id) DO UPDATE
        SET key_hash = EXCLUDED.key_hash,
            key_prefix = EXCLUDED.key_prefix,
            created_at = EXCLUDED.created_at,
            expires_at = EXCLUDED.expires_at
        "#,
    )
    .bind(user_id)
    .bind(hash_key(&api_key))
    .bind(key_prefix(&api_key))
    .bind(now)
    .bind(expires_at)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO api_rate_windows (user_id, request_count, last_request_at)
        VALUES ($1, 0, NULL)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(%user_id, %expires_at, "API key generated");

    Ok(GeneratedKey {
        api_key,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_40_alphanumeric_chars() {
        let key = generate_api_key();

        assert_eq!(key.len(), API_KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn generated_keys_differ() {
        assert_ne!(generate_api_key(), generate_api_key());
    }

    #[test]
    fn keys_use_the_whole_alphabet() {
        let sample: String = (0..50).map(|_| generate_api_key()).collect();

        assert!(sample.chars().any(|c| c.is_ascii_uppercase()));
        assert!(sample.chars().any(|c| c.is_ascii_lowercase()));
        assert!(sample.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn hash_is_stable_hex_sha256() {
        let hash = hash_key("abc");

        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash, hash_key("abc"));
        assert_ne!(hash, hash_key("abd"));
    }

    #[test]
    fn prefix_is_first_eight_chars() {
        assert_eq!(key_prefix("ABCDEFGHIJKLMNOP"), "ABCDEFGH");
        assert_eq!(key_prefix("short"), "short");
    }
}
