use super::repo_types::GiverCard;
use crate::geo::{nearest, Coordinates, Ranked};

pub const NEARBY_LIMIT: usize = 50;
pub const SEARCH_LIMIT: i64 = 20;
pub const POPULAR_CITIES_LIMIT: i64 = 20;

/// Givers within `radius_km` of `origin`, nearest first, capped at [`NEARBY_LIMIT`].
pub fn rank_nearby(
    origin: Coordinates,
    givers: Vec<GiverCard>,
    radius_km: f64,
) -> Vec<Ranked<GiverCard>> {
    nearest(origin, givers, GiverCard::coordinates, radius_km, NEARBY_LIMIT)
}

/// Blank search terms count as absent.
pub fn non_blank(term: Option<String>) -> Option<String> {
    term.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

#[cfg(test)]
pub(crate) fn giver_at(name: &str, latitude: f64, longitude: f64) -> GiverCard {
    GiverCard {
        id: uuid::Uuid::new_v4(),
        name: Some(name.to_string()),
        avatar: None,
        bio: None,
        presence_rating: Some(4.5),
        total_sessions: 10,
        emotional_tempo: None,
        silence_comfort: None,
        energy_level: None,
        voice_tone_preference: None,
        hourly_rate: Some(299),
        latitude: Some(latitude),
        longitude: Some(longitude),
        city: None,
        state: None,
        country: None,
        max_distance_km: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranks_nearest_first_and_drops_far_givers() {
        let origin = Coordinates::new(28.6139, 77.2090); // Delhi
        let givers = vec![
            giver_at("gurgaon", 28.4595, 77.0266),
            giver_at("connaught", 28.6315, 77.2167),
            giver_at("jaipur", 26.9124, 75.7873),
        ];

        let ranked = rank_nearby(origin, givers, 50.0);
        let names: Vec<_> = ranked
            .iter()
            .map(|r| r.item.name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["connaught", "gurgaon"]);
        assert!(ranked[0].distance < 5.0);
    }

    #[test]
    fn caps_result_count() {
        let origin = Coordinates::new(0.0, 0.0);
        let givers = (0..80)
            .map(|i| giver_at("g", 0.0, i as f64 * 0.001))
            .collect();
        assert_eq!(rank_nearby(origin, givers, 100.0).len(), NEARBY_LIMIT);
    }

    #[test]
    fn ranked_giver_serializes_flat_with_distance() {
        let ranked = rank_nearby(
            Coordinates::new(0.0, 0.0),
            vec![giver_at("flat", 0.0, 0.01)],
            10.0,
        );
        let json = serde_json::to_value(&ranked[0]).unwrap();
        assert_eq!(json["name"], "flat");
        assert!(json["distance"].as_f64().unwrap() > 1.0);
        assert!(json.get("item").is_none());
    }

    #[test]
    fn blank_terms_are_dropped() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" pune ".into())), Some("pune".into()));
        assert_eq!(non_blank(None), None);
    }
}
