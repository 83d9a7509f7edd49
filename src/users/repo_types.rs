use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    TimeSeeker,
    TimeGiver,
    Both,
    Admin,
    Moderator,
}

impl Role {
    /// Roles that can be booked for sessions.
    pub const GIVERS: [Role; 2] = [Role::TimeGiver, Role::Both];

    pub fn is_giver(self) -> bool {
        Self::GIVERS.contains(&self)
    }

    pub fn is_staff(self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }

    /// Roles a visitor may pick for themselves at signup.
    pub fn is_self_assignable(self) -> bool {
        matches!(self, Role::TimeSeeker | Role::TimeGiver | Role::Both)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::TimeSeeker => "TIME_SEEKER",
            Role::TimeGiver => "TIME_GIVER",
            Role::Both => "BOTH",
            Role::Admin => "ADMIN",
            Role::Moderator => "MODERATOR",
        }
    }
}

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub name: Option<String>,
    pub role: Role,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub presence_rating: Option<f64>,
    pub total_sessions: i32,
    pub emotional_tempo: Option<String>,
    pub silence_comfort: Option<i32>,
    pub energy_level: Option<String>,
    pub voice_tone_preference: Option<String>,
    pub hourly_rate: Option<i64>,
    pub is_available: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub is_location_public: bool,
    pub max_distance_km: Option<f64>,
    pub is_disabled: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Compact view of a user embedded in other resources.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub presence_rating: Option<f64>,
}

/// Partial profile update; `None` leaves the column untouched.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub role: Option<Role>,
    pub emotional_tempo: Option<String>,
    pub silence_comfort: Option<i32>,
    pub energy_level: Option<String>,
    pub voice_tone_preference: Option<String>,
    pub hourly_rate: Option<i64>,
    pub is_available: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub is_location_public: Option<bool>,
    pub max_distance_km: Option<f64>,
}

impl ProfileChanges {
    /// Checks ranges the database does not enforce.
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(c) = self.silence_comfort {
            if !(1..=10).contains(&c) {
                return Err("silenceComfort must be between 1 and 10");
            }
        }
        if let Some(lat) = self.latitude {
            if !(-90.0..=90.0).contains(&lat) {
                return Err("latitude must be between -90 and 90");
            }
        }
        if let Some(lng) = self.longitude {
            if !(-180.0..=180.0).contains(&lng) {
                return Err("longitude must be between -180 and 180");
            }
        }
        if self.latitude.is_some() != self.longitude.is_some() {
            return Err("latitude and longitude must be set together");
        }
        if matches!(self.hourly_rate, Some(r) if r < 0) {
            return Err("hourlyRate must not be negative");
        }
        if matches!(self.max_distance_km, Some(d) if d <= 0.0) {
            return Err("maxDistanceKm must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn giver_roles() {
        assert!(Role::TimeGiver.is_giver());
        assert!(Role::Both.is_giver());
        assert!(!Role::TimeSeeker.is_giver());
        assert!(!Role::Admin.is_giver());
    }

    #[test]
    fn staff_roles_are_not_self_assignable() {
        assert!(Role::Admin.is_staff());
        assert!(Role::Moderator.is_staff());
        assert!(!Role::Admin.is_self_assignable());
        assert!(Role::TimeSeeker.is_self_assignable());
    }

    #[test]
    fn role_uses_screaming_snake_case_on_the_wire() {
        let json = serde_json::to_string(&Role::TimeGiver).unwrap();
        assert_eq!(json, "\"TIME_GIVER\"");
        let parsed: Role = serde_json::from_str("\"BOTH\"").unwrap();
        assert_eq!(parsed, Role::Both);
        assert_eq!(Role::Moderator.as_str(), "MODERATOR");
    }

    #[test]
    fn profile_changes_validation() {
        assert!(ProfileChanges::default().validate().is_ok());

        let bad_comfort = ProfileChanges {
            silence_comfort: Some(11),
            ..Default::default()
        };
        assert!(bad_comfort.validate().is_err());

        let half_location = ProfileChanges {
            latitude: Some(12.9),
            ..Default::default()
        };
        assert!(half_location.validate().is_err());

        let location = ProfileChanges {
            latitude: Some(12.97),
            longitude: Some(77.59),
            ..Default::default()
        };
        assert!(location.validate().is_ok());
    }
}
