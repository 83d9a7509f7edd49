use axum::{
    extract::{Path, Query, State},
    routing::{get, patch},
    Json, Router,
};
use serde_json::json;
use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    dto::{
        CreateRecordingRequest, CreateRecordingResponse, CreatedRecording, RecordingList,
        RecordingQuery, UpdateRecordingRequest, UpdateRecordingResponse,
    },
    repo::{self, NewRecording},
    services::{expiry, generate_encryption_key, RecordingSummary, MAX_RETENTION_DAYS},
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    sessions,
    state::AppState,
};

pub fn recording_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/session-recordings",
            get(list_recordings).post(create_recording),
        )
        .route(
            "/session-recordings/:id",
            patch(update_recording).delete(delete_recording),
        )
}

#[instrument(skip(state, body))]
pub async fn create_recording(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(body): Json<CreateRecordingRequest>,
) -> ApiResult<Json<CreateRecordingResponse>> {
    let retention_days = body.retention_days();
    if !(1..=MAX_RETENTION_DAYS).contains(&retention_days) {
        return Err(ApiError::bad_request(format!(
            "retentionDays must be between 1 and {MAX_RETENTION_DAYS}"
        )));
    }

    let session = sessions::repo::find_by_id(&state.db, body.session_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    if !session.is_participant(caller.id) {
        return Err(ApiError::forbidden("User is not a participant in this session"));
    }
    if repo::has_open_recording(&state.db, session.id).await? {
        return Err(ApiError::conflict(
            "Recording already exists or in progress for this session",
        ));
    }

    let recording = repo::insert_with_grants(
        &state.db,
        &NewRecording {
            session_id: session.id,
            creator_id: caller.id,
            recording_type: body.recording_type,
            consent: body.consent,
            encryption_key: generate_encryption_key(),
            expires_at: expiry(OffsetDateTime::now_utc(), body.auto_delete, retention_days),
            auto_delete: body.auto_delete,
            retention_days,
        },
        [session.seeker_id, session.giver_id],
    )
    .await?;

    info!(
        recording_id = %recording.id,
        session_id = %session.id,
        consent = ?recording.consent,
        "recording initialized"
    );
    Ok(Json(CreateRecordingResponse {
        success: true,
        recording: CreatedRecording::from(&recording),
        message: "Recording session initialized. Ready to start recording.",
    }))
}

#[instrument(skip(state))]
pub async fn list_recordings(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(q): Query<RecordingQuery>,
) -> ApiResult<Json<RecordingList>> {
    let rows = repo::list_for_viewer(&state.db, caller.id, q.session_id).await?;
    let recordings = rows
        .into_iter()
        .filter(|row| row.viewer(caller.id).can_view(row.recording.consent))
        .map(RecordingSummary::from)
        .collect();
    Ok(Json(RecordingList { recordings }))
}

#[instrument(skip(state, body))]
pub async fn update_recording(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateRecordingRequest>,
) -> ApiResult<Json<UpdateRecordingResponse>> {
    body.validate().map_err(ApiError::bad_request)?;

    let row = repo::find_live(&state.db, caller.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recording not found"))?;
    if !row.viewer(caller.id).can_update() {
        warn!(recording_id = %id, user_id = %caller.id, "recording update refused");
        return Err(ApiError::forbidden("Access denied to this recording"));
    }

    let recording = repo::update(&state.db, id, body.status, body.duration, body.file_size).await?;
    if let Some(level) = body.access_level {
        repo::set_access_level(&state.db, id, caller.id, level).await?;
    }

    info!(recording_id = %id, status = ?recording.status, "recording updated");
    Ok(Json(UpdateRecordingResponse {
        success: true,
        recording,
    }))
}

#[instrument(skip(state))]
pub async fn delete_recording(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let row = repo::find_live(&state.db, caller.id, id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recording not found"))?;
    if row.recording.user_id != caller.id {
        return Err(ApiError::forbidden("Only the recording creator can delete it"));
    }

    repo::soft_delete(&state.db, id).await?;
    info!(recording_id = %id, "recording deleted");
    Ok(Json(json!({ "success": true, "message": "Recording deleted successfully" })))
}
