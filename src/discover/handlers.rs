use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument};

use super::{
    dto::{
        LocationsResponse, NearbyRequest, NearbyResponse, SearchRequest, SearchResponse,
    },
    repo,
    services::{non_blank, rank_nearby, POPULAR_CITIES_LIMIT, SEARCH_LIMIT},
};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    geo::Coordinates,
    state::AppState,
};

pub fn discover_routes() -> Router<AppState> {
    Router::new()
        .route("/discover/nearby", post(nearby))
        .route("/discover/locations", get(locations))
        .route("/discover/search", post(search))
}

#[instrument(skip(state, body))]
pub async fn nearby(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(body): Json<NearbyRequest>,
) -> ApiResult<Json<NearbyResponse>> {
    let (Some(latitude), Some(longitude)) = (body.latitude, body.longitude) else {
        return Err(ApiError::bad_request("Location coordinates are required"));
    };
    let center = Coordinates::new(latitude, longitude);
    if !center.is_valid() {
        return Err(ApiError::bad_request("Location coordinates are out of range"));
    }
    if body.max_distance <= 0.0 {
        return Err(ApiError::bad_request("maxDistance must be positive"));
    }

    let candidates = repo::list_located_givers(&state.db, body.filters.max_distance).await?;
    let scanned = candidates.len();
    let givers = rank_nearby(center, candidates, body.max_distance);

    debug!(user_id = %caller.id, scanned, found = givers.len(), "nearby search");
    Ok(Json(NearbyResponse {
        success: true,
        total_found: givers.len(),
        givers,
        center,
        search_radius: body.max_distance,
    }))
}

#[instrument(skip(state))]
pub async fn locations(State(state): State<AppState>) -> ApiResult<Json<LocationsResponse>> {
    let cities = repo::popular_cities(&state.db, POPULAR_CITIES_LIMIT).await?;
    Ok(Json(LocationsResponse {
        success: true,
        cities,
    }))
}

#[instrument(skip(state, body))]
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> ApiResult<Json<SearchResponse>> {
    let query = non_blank(body.query);
    let location = non_blank(body.location);
    let givers =
        repo::search_givers(&state.db, query.as_deref(), location.as_deref(), SEARCH_LIMIT)
            .await?;
    Ok(Json(SearchResponse {
        success: true,
        givers,
        query,
        location,
    }))
}
