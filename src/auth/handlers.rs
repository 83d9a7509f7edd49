use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, PublicUser, RefreshRequest, RegisterRequest},
    jwt::JwtKeys,
    password::{hash_password, is_strong_enough, verify_password},
};
use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    users::{repo, repo_types::User},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn issue_tokens(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id, user.role)?;
    let refresh_token = keys.sign_refresh(user.id, user.role)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: PublicUser::from(user),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.email = normalize_email(&payload.email);

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::bad_request("Invalid email"));
    }

    if !is_strong_enough(&payload.password) {
        warn!("password too short");
        return Err(ApiError::bad_request("Password too short"));
    }

    if !payload.role.is_self_assignable() {
        warn!(role = ?payload.role, "staff role requested at signup");
        return Err(ApiError::bad_request("Invalid role"));
    }

    if repo::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::conflict("Email already registered"));
    }

    let hash = hash_password(&payload.password)?;
    let user = repo::create(
        &state.db,
        &payload.email,
        &hash,
        payload.name.as_deref(),
        payload.role,
        None,
    )
    .await?;

    info!(user_id = %user.id, email = %user.email, role = ?user.role, "user registered");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.email = normalize_email(&payload.email);

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::bad_request("Invalid email"));
    }

    let Some(user) = repo::find_by_email(&state.db, &payload.email).await? else {
        warn!(email = %payload.email, "login unknown email");
        return Err(ApiError::unauthorized("Invalid credentials"));
    };

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if user.is_disabled {
        warn!(user_id = %user.id, "login on disabled account");
        return Err(ApiError::forbidden("Account disabled"));
    }

    repo::touch_last_login(&state.db, user.id).await?;

    if user.role.is_staff() {
        crate::admin::repo::log_system_event(
            &state.db,
            "admin_login",
            &format!("Admin {} logged in", user.email),
            Some(user.id),
            serde_json::json!({ "role": user.role }),
        )
        .await?;
    }

    info!(user_id = %user.id, role = ?user.role, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|e| ApiError::unauthorized(e.to_string()))?;

    // Reload so a role change or soft-disable takes effect on refresh.
    let user = repo::find_by_id(&state.db, claims.sub)
        .await?
        .filter(|u| !u.is_disabled)
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;

    Ok(Json(issue_tokens(&state, user)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation() {
        assert!(is_valid_email("giver@example.com"));
        assert!(!is_valid_email("giver@example"));
        assert!(!is_valid_email("gi ver@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email("  Seeker@Example.COM "), "seeker@example.com");
    }

    #[test]
    fn public_user_serialization_omits_secrets() {
        let response = PublicUser {
            id: uuid::Uuid::new_v4(),
            email: "test@example.com".to_string(),
            name: Some("Sarah".into()),
            role: crate::users::repo_types::Role::TimeGiver,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("TIME_GIVER"));
        assert!(!json.contains("password"));
    }
}
