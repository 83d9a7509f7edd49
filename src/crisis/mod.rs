mod dto;
pub mod handlers;
pub mod protocol;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::crisis_routes())
}
