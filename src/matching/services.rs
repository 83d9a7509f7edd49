use serde::{Deserialize, Serialize};

use crate::discover::repo_types::GiverCard;

pub const MATCH_CANDIDATES: i64 = 10;
pub const MAX_SCORE: f64 = 100.0;

/// What a seeker is looking for; every field is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPreferences {
    pub session_type: Option<String>,
    pub emotional_tempo: Option<String>,
    pub silence_comfort: Option<i32>,
    pub energy_level: Option<String>,
}

impl MatchPreferences {
    /// Inclusive silence comfort window accepted for candidates (±2, within 1..=10).
    pub fn silence_window(&self) -> Option<(i32, i32)> {
        self.silence_comfort
            .map(|c| ((c - 2).max(1), (c + 2).min(10)))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredGiver {
    #[serde(flatten)]
    pub giver: GiverCard,
    pub match_score: f64,
}

/// Compatibility score in `0..=100`.
///
/// Rating contributes 20 points per star, experience 2 points per session up
/// to 30, equal tempo and energy 15 each, and silence comfort up to 20 minus 5
/// per step of difference.
pub fn match_score(giver: &GiverCard, prefs: &MatchPreferences) -> f64 {
    let mut score = giver.presence_rating.unwrap_or(0.0) * 20.0;
    score += f64::from((giver.total_sessions.max(0) * 2).min(30));

    if prefs.emotional_tempo.is_some() && giver.emotional_tempo == prefs.emotional_tempo {
        score += 15.0;
    }
    if prefs.energy_level.is_some() && giver.energy_level == prefs.energy_level {
        score += 15.0;
    }
    if let (Some(wanted), Some(has)) = (prefs.silence_comfort, giver.silence_comfort) {
        let diff = (wanted - has).abs();
        score += f64::from((20 - diff * 5).max(0));
    }

    score.min(MAX_SCORE)
}

/// Scores every candidate and orders best match first. Ties keep input order.
pub fn rank_matches(givers: Vec<GiverCard>, prefs: &MatchPreferences) -> Vec<ScoredGiver> {
    let mut scored: Vec<ScoredGiver> = givers
        .into_iter()
        .map(|giver| ScoredGiver {
            match_score: match_score(&giver, prefs),
            giver,
        })
        .collect();
    scored.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discover::services::giver_at;

    fn giver(rating: Option<f64>, sessions: i32) -> GiverCard {
        let mut g = giver_at("g", 0.0, 0.0);
        g.presence_rating = rating;
        g.total_sessions = sessions;
        g
    }

    #[test]
    fn base_score_from_rating_and_experience() {
        let prefs = MatchPreferences::default();
        assert_eq!(match_score(&giver(Some(4.0), 5), &prefs), 80.0 + 10.0);
        assert_eq!(match_score(&giver(None, 0), &prefs), 0.0);
        // experience is capped at 30 points
        assert_eq!(match_score(&giver(None, 100), &prefs), 30.0);
    }

    #[test]
    fn compatibility_bonuses() {
        let mut g = giver(Some(1.0), 0);
        g.emotional_tempo = Some("slow".into());
        g.energy_level = Some("calm".into());
        g.silence_comfort = Some(8);

        let prefs = MatchPreferences {
            emotional_tempo: Some("slow".into()),
            energy_level: Some("calm".into()),
            silence_comfort: Some(9),
            ..Default::default()
        };
        // 20 (rating) + 15 + 15 + (20 - 5)
        assert_eq!(match_score(&g, &prefs), 65.0);

        let far = MatchPreferences {
            silence_comfort: Some(1),
            ..Default::default()
        };
        // difference of 7 gives no silence bonus
        assert_eq!(match_score(&g, &far), 20.0);
    }

    #[test]
    fn score_is_capped() {
        let mut g = giver(Some(5.0), 50);
        g.emotional_tempo = Some("slow".into());
        let prefs = MatchPreferences {
            emotional_tempo: Some("slow".into()),
            ..Default::default()
        };
        assert_eq!(match_score(&g, &prefs), MAX_SCORE);
    }

    #[test]
    fn unset_preference_never_matches_unset_profile() {
        let g = giver(None, 0);
        let prefs = MatchPreferences::default();
        assert_eq!(g.emotional_tempo, prefs.emotional_tempo);
        assert_eq!(match_score(&g, &prefs), 0.0);
    }

    #[test]
    fn silence_window_is_clamped() {
        let p = |c| MatchPreferences {
            silence_comfort: Some(c),
            ..Default::default()
        };
        assert_eq!(p(1).silence_window(), Some((1, 3)));
        assert_eq!(p(5).silence_window(), Some((3, 7)));
        assert_eq!(p(10).silence_window(), Some((8, 10)));
        assert_eq!(MatchPreferences::default().silence_window(), None);
    }

    #[test]
    fn ranking_orders_by_score() {
        let ranked = rank_matches(
            vec![giver(Some(2.0), 0), giver(Some(4.5), 0), giver(Some(3.0), 0)],
            &MatchPreferences::default(),
        );
        let scores: Vec<_> = ranked.iter().map(|s| s.match_score).collect();
        assert_eq!(scores, vec![90.0, 60.0, 40.0]);
    }
}
