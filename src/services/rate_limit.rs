//! API-key gateway: key validation and per-user request metering.
//!
//! Every public API call passes through [`check`], which
//! 1. resolves the presented key to its owner,
//! 2. rejects expired keys,
//! 3. admits or rejects the call against the owner's hourly window.
//!
//! # Window semantics
//!
//! The window is anchored at the most recently *accepted* request, not at
//! the first request of the hour. Every accepted call moves the anchor, so
//! a user who keeps calling at least once an hour never gets a reset until
//! they pause for longer than the window. Rejected calls leave the anchor
//! where it is.
//!
//! # Atomicity
//!
//! The read and the write of a check run in one transaction with the
//! rate-window row locked (`FOR UPDATE`). Concurrent calls for the same
//! user queue on that lock and each sees the count left by the previous
//! one, so the cap cannot be overshot.

use chrono::{DateTime, TimeDelta, Utc};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::{AppError, GatewayError},
    models::{api_key::GatewayRecord, rate_window::RateWindow},
    services::key_service,
};

/// Length of the request window in milliseconds (one hour).
pub const RATE_LIMIT_WINDOW_MS: i64 = 60 * 60 * 1000;

/// Accepted requests per user and window.
pub const MAX_REQUESTS_PER_WINDOW: i32 = 15;

const MS_PER_MINUTE: i64 = 60 * 1000;

/// Reject keys whose expiry lies strictly before `now`.
pub fn ensure_not_expired(
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), GatewayError> {
    match expires_at {
        Some(expiry) if now > expiry => Err(GatewayError::KeyExpired),
        _ => Ok(()),
    }
}

/// Decide whether a request at `now` is admitted and compute the window
/// state to persist if it is.
///
/// - No previous request, or the anchor is more than one window old:
///   a fresh window starts with a count of 1.
/// - The count already reached the cap: rejected, with the whole minutes
///   left until the anchor is one window old (rounded up).
/// - Otherwise the count grows by one and the anchor moves to `now`.
pub fn admit(window: &RateWindow, now: DateTime<Utc>) -> Result<RateWindow, GatewayError> {
    let window_length = TimeDelta::milliseconds(RATE_LIMIT_WINDOW_MS);

    let last_request = match window.last_request_at {
        Some(last) if now - last <= window_length => last,
        _ => {
            return Ok(RateWindow {
                user_id: window.user_id,
                request_count: 1,
                last_request_at: Some(now),
            });
        }
    };

    if window.request_count >= MAX_REQUESTS_PER_WINDOW {
        let elapsed_ms = (now - last_request).num_milliseconds();
        return Err(GatewayError::RateLimitExceeded {
            retry_after_minutes: minutes_until_reset(elapsed_ms),
        });
    }

    Ok(RateWindow {
        user_id: window.user_id,
        request_count: window.request_count + 1,
        last_request_at: Some(now),
    })
}

/// `ceil((window - elapsed) / 1 minute)`, for an elapsed time inside the window.
fn minutes_until_reset(elapsed_ms: i64) -> i64 {
    let remaining_ms = RATE_LIMIT_WINDOW_MS - elapsed_ms;
    remaining_ms.div_euclid(MS_PER_MINUTE) + i64::from(remaining_ms.rem_euclid(MS_PER_MINUTE) > 0)
}

/// Validate `api_key` and meter the call against its owner's window.
///
/// # Process
///
/// 1. Start a transaction
/// 2. Look up the credential by key hash and lock the owner's window row
/// 3. Check expiry and the window (see [`admit`])
/// 4. Persist the new window state and commit
///
/// Rejections roll back without writing anything.
///
/// # Returns
///
/// The id of the user the key belongs to.
///
/// # Errors
///
/// - `Gateway(InvalidKey)`: No credential matches the key
/// - `Gateway(KeyExpired)`: The key's expiry has passed
/// - `Gateway(RateLimitExceeded)`: The user's hourly allowance is used up
/// - `Database`: The store failed
pub async fn check(pool: &DbPool, api_key: &str, now: DateTime<Utc>) -> Result<Uuid, AppError> {
    let key_hash = key_service::hash_key(api_key);

    let mut tx = pool.begin().await?;

    // Lock the window row so concurrent checks for this user serialize here
    let record = sqlx::query_as::<_, GatewayRecord>(
        r#"
        SELECT c.user_id, c.expires_at, w.request_count, w.last_request_at
        FROM api_credentials c
        JOIN api_rate_windows w ON w.user_id = c.user_id
        WHERE c.key_hash = $1
        FOR UPDATE OF w
        "#,
    )
    .bind(&key_hash)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(GatewayError::InvalidKey)?;

    ensure_not_expired(record.expires_at, now)?;

    let next = admit(&record.window(), now).inspect_err(|rejection| {
        tracing::info!(user_id = %record.user_id, %rejection, "public API call rejected");
    })?;

    sqlx::query(
        r#"
        UPDATE api_rate_windows
        SET request_count = $1,
            last_request_at = $2
        WHERE user_id = $3
        "#,
    )
    .bind(next.request_count)
    .bind(next.last_request_at)
    .bind(next.user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(
        user_id = %next.user_id,
        request_count = next.request_count,
        "public API call admitted"
    );

    Ok(next.user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).unwrap()
    }

    fn window(count: i32, last: Option<DateTime<Utc>>) -> RateWindow {
        RateWindow {
            user_id: Uuid::nil(),
            request_count: count,
            last_request_at: last,
        }
    }

    #[test]
    fn first_call_starts_a_window() {
        let next = admit(&window(0, None), now()).unwrap();

        assert_eq!(next.request_count, 1);
        assert_eq!(next.last_request_at, Some(now()));
    }

    #[test]
    fn first_call_resets_a_stale_count_without_anchor() {
        let next = admit(&window(40, None), now()).unwrap();

        assert_eq!(next.request_count, 1);
    }

    #[test]
    fn call_inside_window_increments_and_moves_anchor() {
        let last = now() - TimeDelta::minutes(20);
        let next = admit(&window(4, Some(last)), now()).unwrap();

        assert_eq!(next.request_count, 5);
        assert_eq!(next.last_request_at, Some(now()));
    }

    #[test]
    fn fourteenth_call_still_admitted() {
        let last = now() - TimeDelta::minutes(1);
        let next = admit(&window(14, Some(last)), now()).unwrap();

        assert_eq!(next.request_count, MAX_REQUESTS_PER_WINDOW);
    }

    #[test]
    fn full_window_rejects_with_wait_time() {
        let last = now() - TimeDelta::minutes(10);
        let err = admit(&window(15, Some(last)), now()).unwrap_err();

        assert_eq!(
            err,
            GatewayError::RateLimitExceeded {
                retry_after_minutes: 50
            }
        );
    }

    #[test]
    fn wait_time_rounds_up_partial_minutes() {
        let last = now() - TimeDelta::seconds(10 * 60 + 1);
        let err = admit(&window(15, Some(last)), now()).unwrap_err();

        // 49m59s left
        assert_eq!(
            err,
            GatewayError::RateLimitExceeded {
                retry_after_minutes: 50
            }
        );

        let last = now() - TimeDelta::milliseconds(RATE_LIMIT_WINDOW_MS - 1);
        let err = admit(&window(15, Some(last)), now()).unwrap_err();
        assert_eq!(
            err,
            GatewayError::RateLimitExceeded {
                retry_after_minutes: 1
            }
        );
    }

    #[test]
    fn over_cap_counts_are_rejected_too() {
        let last = now() - TimeDelta::minutes(30);
        assert!(admit(&window(99, Some(last)), now()).is_err());
    }

    #[test]
    fn window_resets_after_an_hour() {
        let last = now() - TimeDelta::minutes(61);
        let next = admit(&window(3, Some(last)), now()).unwrap();

        assert_eq!(next.request_count, 1);
        assert_eq!(next.last_request_at, Some(now()));
    }

    #[test]
    fn exhausted_window_resets_after_an_hour() {
        let last = now() - TimeDelta::milliseconds(RATE_LIMIT_WINDOW_MS + 1);
        let next = admit(&window(15, Some(last)), now()).unwrap();

        assert_eq!(next.request_count, 1);
    }

    #[test]
    fn exactly_one_window_old_is_still_inside() {
        let last = now() - TimeDelta::milliseconds(RATE_LIMIT_WINDOW_MS);

        let err = admit(&window(15, Some(last)), now()).unwrap_err();
        assert_eq!(
            err,
            GatewayError::RateLimitExceeded {
                retry_after_minutes: 0
            }
        );

        let next = admit(&window(2, Some(last)), now()).unwrap();
        assert_eq!(next.request_count, 3);
    }

    #[test]
    fn anchor_slides_with_each_accepted_call() {
        // 15 calls, 5 minutes apart: the anchor never ages past the window
        let mut state = window(0, None);
        let start = now();
        for i in 0..MAX_REQUESTS_PER_WINDOW {
            let at = start + TimeDelta::minutes(5 * i64::from(i));
            state = admit(&state, at).unwrap();
        }
        assert_eq!(state.request_count, MAX_REQUESTS_PER_WINDOW);

        // 70 minutes after the first call is only 0 minutes after the last
        let last = state.last_request_at.unwrap();
        let err = admit(&state, start + TimeDelta::minutes(70)).unwrap_err();
        let expected = minutes_until_reset((start + TimeDelta::minutes(70) - last).num_milliseconds());
        assert_eq!(
            err,
            GatewayError::RateLimitExceeded {
                retry_after_minutes: expected
            }
        );
        assert!(expected > 0);
    }

    #[test]
    fn rejection_leaves_window_untouched() {
        let state = window(15, Some(now() - TimeDelta::minutes(5)));
        let before = state.clone();

        let _ = admit(&state, now());

        assert_eq!(state, before);
    }

    #[test]
    fn expiry_is_strict() {
        let expiry = now();

        assert!(ensure_not_expired(Some(expiry), now()).is_ok());
        assert_eq!(
            ensure_not_expired(Some(expiry), now() + TimeDelta::milliseconds(1)),
            Err(GatewayError::KeyExpired)
        );
        assert!(ensure_not_expired(None, now()).is_ok());
    }

    #[test]
    fn minutes_until_reset_matches_ceiling_formula() {
        for elapsed_ms in [0, 1, 59_999, 60_000, 600_000, 3_599_999, RATE_LIMIT_WINDOW_MS] {
            let expected =
                ((RATE_LIMIT_WINDOW_MS - elapsed_ms) as f64 / MS_PER_MINUTE as f64).ceil() as i64;
            assert_eq!(minutes_until_reset(elapsed_ms), expected, "elapsed {elapsed_ms}");
        }
    }

    // Store-backed checks. `#[sqlx::test]` gives each test a fresh database
    // with the migrations applied; it needs DATABASE_URL to point at a server.

    async fn seed_user(pool: &DbPool) -> Uuid {
        let user_id = Uuid::new_v4();
        sqlx::query("INSERT INTO users (id, email) VALUES ($1, $2)")
            .bind(user_id)
            .bind("ada@example.com")
            .execute(pool)
            .await
            .unwrap();
        user_id
    }

    async fn stored_window(pool: &DbPool, user_id: Uuid) -> RateWindow {
        sqlx::query_as::<_, RateWindow>(
            "SELECT user_id, request_count, last_request_at FROM api_rate_windows WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    async fn set_window(pool: &DbPool, user_id: Uuid, count: i32, last: DateTime<Utc>) {
        sqlx::query(
            "UPDATE api_rate_windows SET request_count = $1, last_request_at = $2 WHERE user_id = $3",
        )
        .bind(count)
        .bind(last)
        .bind(user_id)
        .execute(pool)
        .await
        .unwrap();
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn rotation_keeps_the_window_and_revokes_the_old_key(pool: DbPool) {
        let user_id = seed_user(&pool).await;
        let anchor = now() - TimeDelta::minutes(10);

        let old = key_service::generate_key(&pool, user_id, now() - TimeDelta::days(1))
            .await
            .unwrap();
        set_window(&pool, user_id, 7, anchor).await;

        let new = key_service::generate_key(&pool, user_id, now()).await.unwrap();

        assert_eq!(stored_window(&pool, user_id).await, window_for(user_id, 7, anchor));

        let err = check(&pool, &old.api_key, now()).await.unwrap_err();
        assert!(matches!(err, AppError::Gateway(GatewayError::InvalidKey)));

        assert_eq!(check(&pool, &new.api_key, now()).await.unwrap(), user_id);
        assert_eq!(stored_window(&pool, user_id).await, window_for(user_id, 8, now()));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn unknown_key_is_invalid(pool: DbPool) {
        let user_id = seed_user(&pool).await;
        key_service::generate_key(&pool, user_id, now()).await.unwrap();

        let err = check(&pool, "not-a-key", now()).await.unwrap_err();

        assert!(matches!(err, AppError::Gateway(GatewayError::InvalidKey)));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn expired_key_is_rejected_below_the_cap_without_a_write(pool: DbPool) {
        let user_id = seed_user(&pool).await;
        let issued = now() - TimeDelta::days(31);
        let key = key_service::generate_key(&pool, user_id, issued).await.unwrap();
        let anchor = now() - TimeDelta::hours(3);
        set_window(&pool, user_id, 2, anchor).await;

        let err = check(&pool, &key.api_key, now()).await.unwrap_err();

        assert!(matches!(err, AppError::Gateway(GatewayError::KeyExpired)));
        assert_eq!(stored_window(&pool, user_id).await, window_for(user_id, 2, anchor));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn sixteenth_call_in_a_window_is_rate_limited(pool: DbPool) {
        let user_id = seed_user(&pool).await;
        let key = key_service::generate_key(&pool, user_id, now()).await.unwrap();

        for _ in 0..MAX_REQUESTS_PER_WINDOW {
            check(&pool, &key.api_key, now()).await.unwrap();
        }
        let err = check(&pool, &key.api_key, now()).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Gateway(GatewayError::RateLimitExceeded {
                retry_after_minutes: 60
            })
        ));
        assert_eq!(
            stored_window(&pool, user_id).await,
            window_for(user_id, MAX_REQUESTS_PER_WINDOW, now())
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn key_hash_column_matches_the_bound_type(pool: DbPool) {
        let data_type: String = sqlx::query_scalar(
            "SELECT data_type::text FROM information_schema.columns \
             WHERE table_name = 'api_credentials' AND column_name = 'key_hash'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(data_type, "text");
    }

    fn window_for(user_id: Uuid, count: i32, last: DateTime<Utc>) -> RateWindow {
        RateWindow {
            user_id,
            request_count: count,
            last_request_at: Some(last),
        }
    }
}
