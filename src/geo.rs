//! Great-circle distance and nearest-candidate selection.
//!
//! Candidates are scanned in full; there is no spatial index.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// A candidate paired with its distance from the search origin.
#[derive(Debug, Clone, Serialize)]
pub struct Ranked<T> {
    #[serde(flatten)]
    pub item: T,
    pub distance: f64,
}

/// Keeps candidates within `max_distance_km` of `origin`, nearest first,
/// at most `limit` of them.
pub fn nearest<T, F>(
    origin: Coordinates,
    candidates: impl IntoIterator<Item = T>,
    position: F,
    max_distance_km: f64,
    limit: usize,
) -> Vec<Ranked<T>>
where
    F: Fn(&T) -> Option<Coordinates>,
{
    let mut ranked: Vec<Ranked<T>> = candidates
        .into_iter()
        .filter_map(|item| {
            let at = position(&item)?;
            let distance = haversine_km(origin, at);
            (distance <= max_distance_km).then_some(Ranked { item, distance })
        })
        .collect();
    ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANGALORE: Coordinates = Coordinates {
        latitude: 12.9716,
        longitude: 77.5946,
    };
    const MUMBAI: Coordinates = Coordinates {
        latitude: 19.0760,
        longitude: 72.8777,
    };

    #[test]
    fn distance_to_self_is_zero() {
        assert!(haversine_km(BANGALORE, BANGALORE).abs() < 1e-9);
    }

    #[test]
    fn bangalore_to_mumbai() {
        let d = haversine_km(BANGALORE, MUMBAI);
        assert!((d - 845.0).abs() < 5.0, "got {d}");
        assert!((d - haversine_km(MUMBAI, BANGALORE)).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_km(Coordinates::new(0.0, 0.0), Coordinates::new(1.0, 0.0));
        assert!((d - 111.19).abs() < 0.01, "got {d}");
    }

    #[test]
    fn antipodes_are_half_the_circumference() {
        let d = haversine_km(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 180.0));
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn coordinate_ranges() {
        assert!(BANGALORE.is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -181.0).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn nearest_filters_sorts_and_caps() {
        let candidates = vec![
            ("far", Some(Coordinates::new(13.50, 77.59))),
            ("near", Some(Coordinates::new(12.98, 77.60))),
            ("mumbai", Some(MUMBAI)),
            ("nowhere", None),
            ("mid", Some(Coordinates::new(13.10, 77.59))),
        ];

        let ranked = nearest(BANGALORE, candidates.clone(), |c| c.1, 100.0, 10);
        let names: Vec<_> = ranked.iter().map(|r| r.item.0).collect();
        assert_eq!(names, vec!["near", "mid", "far"]);
        assert!(ranked.windows(2).all(|w| w[0].distance <= w[1].distance));

        let capped = nearest(BANGALORE, candidates, |c| c.1, 100.0, 2);
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].item.0, "near");
    }

    #[test]
    fn nearest_keeps_boundary_distance() {
        let here = Coordinates::new(0.0, 0.0);
        let there = Coordinates::new(1.0, 0.0);
        let exact = haversine_km(here, there);
        let ranked = nearest(here, vec![there], |c| Some(*c), exact, 5);
        assert_eq!(ranked.len(), 1);
    }
}
