use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::geo::Coordinates;

/// Public giver profile returned by discovery and matching.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GiverCard {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub presence_rating: Option<f64>,
    pub total_sessions: i32,
    pub emotional_tempo: Option<String>,
    pub silence_comfort: Option<i32>,
    pub energy_level: Option<String>,
    pub voice_tone_preference: Option<String>,
    pub hourly_rate: Option<i64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub max_distance_km: Option<f64>,
}

impl GiverCard {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CityCount {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub giver_count: i64,
}
