use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateProfessionalRequest, ListQuery, UpdateProfessionalRequest},
    repo,
    repo_types::ProfessionalBackup,
};
use crate::{
    admin,
    auth::extractors::{AdminUser, AuthUser},
    discover::services::non_blank,
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn professional_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/professional-backups",
            get(list_professionals).post(create_professional),
        )
        .route(
            "/professional-backups/:id",
            put(update_professional).delete(delete_professional),
        )
}

#[instrument(skip(state))]
pub async fn list_professionals(
    State(state): State<AppState>,
    _caller: AuthUser,
    Query(q): Query<ListQuery>,
) -> ApiResult<Json<Vec<ProfessionalBackup>>> {
    let limit = q.limit();
    let specialization = non_blank(q.specialization);
    let rows =
        repo::list_active(&state.db, specialization.as_deref(), q.available, limit).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, body))]
pub async fn create_professional(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(body): Json<CreateProfessionalRequest>,
) -> ApiResult<(StatusCode, Json<ProfessionalBackup>)> {
    admin.require_admin()?;
    body.validate().map_err(ApiError::bad_request)?;

    let pro = repo::create(&state.db, &body).await?;
    admin::repo::log_admin_action(
        &state.db,
        admin.id,
        "CREATE_PROFESSIONAL",
        "professional_backup",
        Some(pro.id),
        &format!("Added professional backup {}", pro.name),
        json!({ "profession": pro.profession }),
    )
    .await?;

    info!(professional_id = %pro.id, "professional backup added");
    Ok((StatusCode::CREATED, Json(pro)))
}

#[instrument(skip(state, body))]
pub async fn update_professional(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateProfessionalRequest>,
) -> ApiResult<Json<ProfessionalBackup>> {
    admin.require_admin()?;
    if matches!(body.priority, Some(p) if p < 1) {
        return Err(ApiError::bad_request("Priority must be at least 1"));
    }

    let pro = repo::update(&state.db, id, &body)
        .await?
        .ok_or_else(|| ApiError::not_found("Professional backup not found"))?;
    admin::repo::log_admin_action(
        &state.db,
        admin.id,
        "UPDATE_PROFESSIONAL",
        "professional_backup",
        Some(pro.id),
        &format!("Updated professional backup {}", pro.name),
        json!({ "isAvailable": pro.is_available }),
    )
    .await?;
    Ok(Json(pro))
}

#[instrument(skip(state))]
pub async fn delete_professional(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    admin.require_admin()?;
    if !repo::deactivate(&state.db, id).await? {
        return Err(ApiError::not_found("Professional backup not found"));
    }
    admin::repo::log_admin_action(
        &state.db,
        admin.id,
        "DELETE_PROFESSIONAL",
        "professional_backup",
        Some(id),
        "Deactivated professional backup",
        json!({}),
    )
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
