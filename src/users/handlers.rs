use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    repo,
    repo_types::{ProfileChanges, User},
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).patch(update_me))
}

#[instrument(skip(state))]
pub async fn get_me(State(state): State<AppState>, caller: AuthUser) -> ApiResult<Json<User>> {
    let user = repo::find_by_id(&state.db, caller.id)
        .await?
        .ok_or_else(|| ApiError::unauthorized("User not found"))?;
    Ok(Json(user))
}

#[instrument(skip(state, changes))]
pub async fn update_me(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(changes): Json<ProfileChanges>,
) -> ApiResult<Json<User>> {
    changes.validate().map_err(ApiError::bad_request)?;

    if let Some(role) = changes.role {
        if !role.is_self_assignable() || caller.role.is_staff() {
            warn!(user_id = %caller.id, ?role, "role change refused");
            return Err(ApiError::forbidden("Role cannot be changed to this value"));
        }
    }

    let user = repo::update_profile(&state.db, caller.id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    info!(user_id = %user.id, "profile updated");
    Ok(Json(user))
}
