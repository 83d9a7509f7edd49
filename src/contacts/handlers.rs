use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateContactRequest, UpdateContactRequest},
    repo,
    repo_types::EmergencyContact,
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn contact_routes() -> Router<AppState> {
    Router::new()
        .route("/emergency-contacts", get(list_contacts).post(create_contact))
        .route(
            "/emergency-contacts/:id",
            put(update_contact).delete(delete_contact),
        )
}

#[instrument(skip(state))]
pub async fn list_contacts(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<Vec<EmergencyContact>>> {
    let contacts = repo::list_active(&state.db, caller.id, None).await?;
    Ok(Json(contacts))
}

#[instrument(skip(state, body))]
pub async fn create_contact(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(body): Json<CreateContactRequest>,
) -> ApiResult<(StatusCode, Json<EmergencyContact>)> {
    body.validate().map_err(ApiError::bad_request)?;
    let contact = repo::create(&state.db, caller.id, &body).await?;
    info!(user_id = %caller.id, contact_id = %contact.id, primary = contact.is_primary, "emergency contact added");
    Ok((StatusCode::CREATED, Json(contact)))
}

#[instrument(skip(state, body))]
pub async fn update_contact(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateContactRequest>,
) -> ApiResult<Json<EmergencyContact>> {
    body.validate().map_err(ApiError::bad_request)?;
    let contact = repo::update(&state.db, caller.id, id, &body)
        .await?
        .ok_or_else(|| ApiError::not_found("Emergency contact not found"))?;
    Ok(Json(contact))
}

#[instrument(skip(state))]
pub async fn delete_contact(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    if !repo::deactivate(&state.db, caller.id, id).await? {
        return Err(ApiError::not_found("Emergency contact not found"));
    }
    info!(user_id = %caller.id, contact_id = %id, "emergency contact removed");
    Ok(StatusCode::NO_CONTENT)
}
