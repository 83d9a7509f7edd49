use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use super::{claims::TokenKind, jwt::JwtKeys};
use crate::{
    error::ApiError,
    state::AppState,
    users::{repo, repo_types::Role},
};

/// Caller identified by a valid access token.
///
/// Only the token is checked. A disabled account keeps access until its token
/// expires, see [`MAX_ACCESS_TTL_MINUTES`](super::jwt::MAX_ACCESS_TTL_MINUTES).
/// Use [`AdminUser`] where the account state must be current.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

        // Expect "Bearer <token>"
        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header"))?;

        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::unauthorized("Invalid or expired token")
        })?;

        if claims.kind != TokenKind::Access {
            return Err(ApiError::unauthorized("Access token required"));
        }

        Ok(AuthUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// Caller whose stored role is ADMIN or MODERATOR.
///
/// The role is re-read from the database so that a demoted or disabled
/// account loses access before its token expires.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AdminUser {
    /// Moderators can read admin data; mutations need a full admin.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::forbidden("Admin access required"))
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let caller = AuthUser::from_request_parts(parts, state).await?;
        if !caller.role.is_staff() {
            return Err(ApiError::unauthorized("Unauthorized"));
        }

        let user = repo::find_by_id(&state.db, caller.id)
            .await?
            .ok_or_else(|| ApiError::unauthorized("Unauthorized"))?;

        if user.is_disabled || !user.role.is_staff() {
            warn!(user_id = %user.id, role = ?user.role, "staff token rejected");
            return Err(ApiError::unauthorized("Unauthorized"));
        }

        Ok(AdminUser {
            id: user.id,
            email: user.email,
            role: user.role,
        })
    }
}
