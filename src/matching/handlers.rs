use axum::{extract::State, routing::post, Json, Router};
use serde::Serialize;
use tracing::{debug, instrument};

use super::{
    repo,
    services::{rank_matches, MatchPreferences, ScoredGiver, MATCH_CANDIDATES},
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize)]
pub struct MatchResponse {
    pub givers: Vec<ScoredGiver>,
    pub total: usize,
}

pub fn match_routes() -> Router<AppState> {
    Router::new().route("/match", post(find_matches))
}

#[instrument(skip(state, prefs))]
pub async fn find_matches(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(prefs): Json<MatchPreferences>,
) -> ApiResult<Json<MatchResponse>> {
    if matches!(prefs.silence_comfort, Some(c) if !(1..=10).contains(&c)) {
        return Err(ApiError::bad_request("silenceComfort must be between 1 and 10"));
    }

    let candidates = repo::candidates(&state.db, &prefs, MATCH_CANDIDATES).await?;
    let givers = rank_matches(candidates, &prefs);

    debug!(
        user_id = %caller.id,
        session_type = ?prefs.session_type,
        found = givers.len(),
        "match search"
    );
    Ok(Json(MatchResponse {
        total: givers.len(),
        givers,
    }))
}
