use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::User;

pub const MEETING_BASE_URL: &str = "https://meet.jit.si";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Cannot book a session with yourself")]
    SelfBooking,

    #[error("Giver not available")]
    Unavailable,
}

/// A seeker may book any other user who offers time, is taking sessions
/// and has not been disabled.
pub fn check_bookable(seeker_id: Uuid, giver: &User) -> Result<(), BookingError> {
    if giver.id == seeker_id {
        return Err(BookingError::SelfBooking);
    }
    if !giver.role.is_giver() || !giver.is_available || giver.is_disabled {
        return Err(BookingError::Unavailable);
    }
    Ok(())
}

/// Session price in rupees for a duration in minutes.
pub fn price_for_duration(minutes: i32) -> i64 {
    match minutes {
        10 => 99,
        30 => 249,
        _ => 399,
    }
}

/// Jitsi room unique to the booking instant.
pub fn meeting_link(at: OffsetDateTime) -> String {
    let millis = at.unix_timestamp_nanos() / 1_000_000;
    format!("{MEETING_BASE_URL}/TimeRent-{millis}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::Role;

    fn giver() -> User {
        let now = OffsetDateTime::now_utc();
        User {
            id: Uuid::new_v4(),
            email: "sarah@example.com".into(),
            password_hash: String::new(),
            name: Some("Sarah Chen".into()),
            role: Role::TimeGiver,
            bio: None,
            avatar: None,
            presence_rating: Some(4.8),
            total_sessions: 42,
            emotional_tempo: Some("slow".into()),
            silence_comfort: Some(9),
            energy_level: Some("calm".into()),
            voice_tone_preference: Some("medium".into()),
            hourly_rate: Some(399),
            is_available: true,
            latitude: None,
            longitude: None,
            city: None,
            state: None,
            country: None,
            is_location_public: false,
            max_distance_km: None,
            is_disabled: false,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn available_givers_can_be_booked() {
        let seeker = Uuid::new_v4();
        assert_eq!(check_bookable(seeker, &giver()), Ok(()));

        let mut both = giver();
        both.role = Role::Both;
        assert_eq!(check_bookable(seeker, &both), Ok(()));
    }

    #[test]
    fn cannot_book_yourself() {
        let mut me = giver();
        me.role = Role::Both;
        assert_eq!(check_bookable(me.id, &me), Err(BookingError::SelfBooking));
    }

    #[test]
    fn non_givers_are_not_bookable() {
        for role in [Role::TimeSeeker, Role::Admin, Role::Moderator] {
            let mut u = giver();
            u.role = role;
            assert_eq!(
                check_bookable(Uuid::new_v4(), &u),
                Err(BookingError::Unavailable),
                "{role:?}"
            );
        }
    }

    #[test]
    fn unavailable_or_disabled_givers_are_not_bookable() {
        let mut away = giver();
        away.is_available = false;
        assert_eq!(check_bookable(Uuid::new_v4(), &away), Err(BookingError::Unavailable));

        let mut banned = giver();
        banned.is_disabled = true;
        assert_eq!(check_bookable(Uuid::new_v4(), &banned), Err(BookingError::Unavailable));
    }

    #[test]
    fn prices_known_durations() {
        assert_eq!(price_for_duration(10), 99);
        assert_eq!(price_for_duration(30), 249);
    }

    #[test]
    fn any_other_duration_costs_the_hour_rate() {
        for minutes in [1, 15, 45, 60, 90] {
            assert_eq!(price_for_duration(minutes), 399, "{minutes} minutes");
        }
    }

    #[test]
    fn meeting_link_uses_epoch_millis() {
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(
            meeting_link(at),
            "https://meet.jit.si/TimeRent-1700000000000"
        );
    }
}
