//! Session authentication middleware.
//!
//! The web UI authenticates against an external provider that issues
//! HS256-signed JWT access tokens. This middleware intercepts every
//! user-facing request to:
//! 1. Extract the token from the Authorization header
//! 2. Verify its signature, expiry and audience
//! 3. Inject the session user into the request
//! 4. Reject unauthenticated requests with HTTP 401

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::Deserialize;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Audience the session provider puts into tokens of signed-in users.
const SESSION_AUDIENCE: &str = "authenticated";

/// The signed-in user, attached to authenticated requests.
///
/// Route handlers extract it with `Extension<SessionUser>`.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// Subject of the token; primary key of `users`
    pub user_id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Uuid,
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    name: Option<String>,
    full_name: Option<String>,
    avatar_url: Option<String>,
}

/// Verifies session tokens against the provider's shared secret.
#[derive(Clone)]
pub struct SessionVerifier {
    key: Arc<DecodingKey>,
    validation: Validation,
}

impl SessionVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[SESSION_AUDIENCE]);

        Self {
            key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validation,
        }
    }

    /// Decode and validate `token`.
    pub fn verify(&self, token: &str) -> Result<SessionUser, AppError> {
        let data = decode::<Claims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "session token rejected");
            AppError::Unauthorized
        })?;

        let claims = data.claims;
        Ok(SessionUser {
            user_id: claims.sub,
            email: claims.email,
            name: claims.user_metadata.name.or(claims.user_metadata.full_name),
            avatar_url: claims.user_metadata.avatar_url,
        })
    }
}

/// Token of an `Authorization: Bearer <token>` header, if present and non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Session authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <jwt>` header from request
/// 2. Verify the token
/// 3. If valid: inject `SessionUser` into request, call next handler
/// 4. If not: return 401 Unauthorized error
pub async fn session_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    let session = state.sessions.verify(token)?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}
