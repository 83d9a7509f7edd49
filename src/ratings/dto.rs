use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::PresenceRating;

pub const RATING_RANGE: std::ops::RangeInclusive<i32> = 1..=5;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRatingRequest {
    pub session_id: Uuid,
    pub rating: i32,
    #[serde(default)]
    pub felt_less_alone: bool,
    #[serde(default)]
    pub time_felt_heavy: bool,
    #[serde(default)]
    pub would_sit_again: bool,
    pub feedback: Option<String>,
}

impl CreateRatingRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if !RATING_RANGE.contains(&self.rating) {
            return Err("Rating must be between 1 and 5");
        }
        Ok(())
    }

    /// Blank feedback is stored as absent.
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RatingQuery {
    #[serde(alias = "sessionId")]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingCreated {
    pub rating: PresenceRating,
    pub presence_rating: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(rating: i32) -> CreateRatingRequest {
        CreateRatingRequest {
            session_id: Uuid::new_v4(),
            rating,
            felt_less_alone: true,
            time_felt_heavy: false,
            would_sit_again: true,
            feedback: Some("   ".into()),
        }
    }

    #[test]
    fn accepts_one_to_five() {
        for r in 1..=5 {
            assert!(request(r).validate().is_ok());
        }
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(request(0).validate().is_err());
        assert!(request(6).validate().is_err());
    }

    #[test]
    fn blank_feedback_is_none() {
        assert_eq!(request(3).feedback(), None);
    }

    #[test]
    fn optional_flags_default_to_false() {
        let body: CreateRatingRequest = serde_json::from_value(serde_json::json!({
            "sessionId": Uuid::nil(),
            "rating": 4
        }))
        .unwrap();
        assert!(!body.felt_less_alone && !body.would_sit_again);
    }
}
