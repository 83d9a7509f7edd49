use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateRatingRequest, RatingCreated, RatingQuery},
    repo,
    repo_types::PresenceRating,
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    sessions::{self, repo_types::SessionStatus},
    state::AppState,
    users,
};

pub fn rating_routes() -> Router<AppState> {
    Router::new().route("/ratings", get(list_ratings).post(create_rating))
}

#[instrument(skip(state, body))]
pub async fn create_rating(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(body): Json<CreateRatingRequest>,
) -> ApiResult<Json<RatingCreated>> {
    body.validate().map_err(ApiError::bad_request)?;

    let session = sessions::repo::find_by_id(&state.db, body.session_id)
        .await?
        .filter(|s| s.status == SessionStatus::Completed && s.is_participant(caller.id))
        .ok_or_else(|| ApiError::not_found("Session not found or not completed"))?;

    let rating = repo::insert(&state.db, caller.id, &body)
        .await?
        .ok_or_else(|| ApiError::bad_request("Session already rated"))?;

    let presence_rating = users::repo::refresh_presence_rating(&state.db, session.giver_id).await?;

    info!(
        session_id = %session.id,
        giver_id = %session.giver_id,
        rating = rating.rating,
        ?presence_rating,
        "session rated"
    );
    Ok(Json(RatingCreated {
        rating,
        presence_rating,
    }))
}

#[instrument(skip(state))]
pub async fn list_ratings(
    State(state): State<AppState>,
    caller: AuthUser,
    Query(q): Query<RatingQuery>,
) -> ApiResult<Json<Vec<PresenceRating>>> {
    let ratings = match q.session_id {
        Some(session_id) => repo::list_for_session(&state.db, session_id).await?,
        None => repo::list_by_user(&state.db, caller.id).await?,
    };
    Ok(Json(ratings))
}
