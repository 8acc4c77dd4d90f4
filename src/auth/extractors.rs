use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::{auth::jwt::JwtKeys, error::ApiError, state::AppState, users::repo::User};

/// Resolves the requesting user, trying two strategies in order:
///
/// 1. `Authorization: Bearer <jwt>`: the token is verified and the user
///    row is loaded by its `sub` claim, so the role is read from the store
///    at request time.
/// 2. `X-User-Id: <uuid>`: the id is accepted without proof of possession.
///    This is a compatibility affordance for clients that cannot attach a
///    token yet, not a security control; remove it once those clients are
///    migrated.
///
/// Fails with 401 when neither strategy resolves to an existing user.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
        {
            let token = auth
                .strip_prefix("Bearer ")
                .or_else(|| auth.strip_prefix("bearer "))
                .ok_or(ApiError::Unauthorized)?;

            let keys = JwtKeys::from_ref(state);
            let claims = keys.verify(token).map_err(|_| {
                warn!("invalid or expired token");
                ApiError::Unauthorized
            })?;

            let user = User::find_by_id(&state.db, claims.sub)
                .await?
                .ok_or(ApiError::Unauthorized)?;
            return Ok(CurrentUser(user));
        }

        let raw = parts
            .headers
            .get("X-User-Id")
            .and_then(|h| h.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;
        let id = Uuid::parse_str(raw.trim()).map_err(|_| ApiError::Unauthorized)?;

        let user = User::find_by_id(&state.db, id)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        Ok(CurrentUser(user))
    }
}
