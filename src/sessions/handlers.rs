use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    dto::{CreateSessionRequest, UpdateSessionRequest},
    repo::{self, NewSession},
    repo_types::SessionView,
    services::{check_bookable, meeting_link, price_for_duration, BookingError},
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
    users,
};

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/:id", get(get_session).patch(update_session))
}

#[instrument(skip(state))]
pub async fn list_sessions(
    State(state): State<AppState>,
    caller: AuthUser,
) -> ApiResult<Json<Vec<SessionView>>> {
    let rows = repo::list_for_participant(&state.db, caller.id).await?;
    Ok(Json(rows.into_iter().map(SessionView::from).collect()))
}

#[instrument(skip(state, body))]
pub async fn create_session(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(body): Json<CreateSessionRequest>,
) -> ApiResult<Json<SessionView>> {
    if body.duration <= 0 {
        return Err(ApiError::bad_request("Duration must be positive"));
    }
    if body.giver_id == caller.id {
        return Err(ApiError::bad_request(BookingError::SelfBooking.to_string()));
    }

    let giver = users::repo::find_by_id(&state.db, body.giver_id)
        .await?
        .ok_or_else(|| ApiError::bad_request(BookingError::Unavailable.to_string()))?;
    check_bookable(caller.id, &giver).map_err(|e| ApiError::bad_request(e.to_string()))?;

    let link = meeting_link(OffsetDateTime::now_utc());
    let session = repo::insert(
        &state.db,
        &NewSession {
            seeker_id: caller.id,
            giver_id: giver.id,
            session_type: body.session_type,
            duration: body.duration,
            scheduled_for: body.scheduled_for,
            meeting_link: &link,
            amount: price_for_duration(body.duration),
        },
    )
    .await?;

    info!(
        session_id = %session.id,
        seeker_id = %caller.id,
        giver_id = %giver.id,
        amount = session.amount,
        "session booked"
    );

    let row = repo::find_for_participant(&state.db, session.id, caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SessionView>> {
    let row = repo::find_for_participant(&state.db, id, caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    Ok(Json(row.into()))
}

#[instrument(skip(state, body))]
pub async fn update_session(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSessionRequest>,
) -> ApiResult<Json<SessionView>> {
    if repo::find_for_participant(&state.db, id, caller.id).await?.is_none() {
        return Err(ApiError::not_found("Session not found"));
    }

    repo::update_progress(&state.db, id, body.status, body.started_at, body.ended_at).await?;
    if let Some(status) = body.status {
        info!(session_id = %id, user_id = %caller.id, ?status, "session status changed");
    }

    let row = repo::find_for_participant(&state.db, id, caller.id)
        .await?
        .ok_or_else(|| ApiError::not_found("Session not found"))?;
    Ok(Json(row.into()))
}
