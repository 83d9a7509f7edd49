use serde::{Deserialize, Serialize};

use super::repo_types::{CityCount, GiverCard};
use crate::geo::{Coordinates, Ranked};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyFilters {
    /// Only givers whose own travel radius is at most this many km.
    pub max_distance: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default = "default_search_radius")]
    pub max_distance: f64,
    #[serde(default)]
    pub filters: NearbyFilters,
}

fn default_search_radius() -> f64 {
    50.0
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyResponse {
    pub success: bool,
    pub givers: Vec<Ranked<GiverCard>>,
    pub center: Coordinates,
    pub search_radius: f64,
    pub total_found: usize,
}

#[derive(Debug, Serialize)]
pub struct LocationsResponse {
    pub success: bool,
    pub cities: Vec<CityCount>,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    pub givers: Vec<GiverCard>,
    pub query: Option<String>,
    pub location: Option<String>,
}
