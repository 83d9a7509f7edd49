use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::{
    AccessLevel, RecordingConsent, RecordingRow, RecordingStatus, RecordingType,
};
use crate::sessions::repo_types::SessionType;

pub const DEFAULT_RETENTION_DAYS: i64 = 30;
pub const MAX_RETENTION_DAYS: i64 = 365;
pub const ENCRYPTION_ALGORITHM: &str = "aes-256-gcm";

/// 32 random bytes, hex encoded.
pub fn generate_encryption_key() -> String {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    hex::encode(key)
}

pub fn expiry(
    now: OffsetDateTime,
    auto_delete: bool,
    retention_days: i64,
) -> Option<OffsetDateTime> {
    auto_delete.then(|| now + Duration::days(retention_days))
}

/// Parties to the recorded session, as seen by one viewer.
#[derive(Debug, Clone, Copy)]
pub struct Viewer {
    pub id: Uuid,
    pub seeker_id: Uuid,
    pub giver_id: Uuid,
    pub creator_id: Uuid,
    pub has_grant: bool,
}

impl Viewer {
    pub fn is_participant(&self) -> bool {
        self.id == self.seeker_id || self.id == self.giver_id
    }

    /// Consent narrows the audience first; then a grant or authorship is needed.
    pub fn can_view(&self, consent: RecordingConsent) -> bool {
        let consented = match consent {
            RecordingConsent::BothConsent => self.is_participant(),
            RecordingConsent::SeekerOnly => self.id == self.seeker_id,
            RecordingConsent::GiverOnly => self.id == self.giver_id,
        };
        consented && (self.has_grant || self.id == self.creator_id)
    }

    pub fn can_update(&self) -> bool {
        self.is_participant() || self.has_grant
    }
}

impl RecordingRow {
    pub fn viewer(&self, id: Uuid) -> Viewer {
        Viewer {
            id,
            seeker_id: self.seeker_id,
            giver_id: self.giver_id,
            creator_id: self.recording.user_id,
            has_grant: self.access_level.is_some(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSummary {
    pub id: Uuid,
    pub session_id: Uuid,
    pub session_type: SessionType,
    pub recording_type: RecordingType,
    pub status: RecordingStatus,
    pub consent: RecordingConsent,
    pub duration: Option<i32>,
    pub file_size: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    pub access_level: Option<AccessLevel>,
    pub has_thumbnail: bool,
}

impl From<RecordingRow> for RecordingSummary {
    fn from(row: RecordingRow) -> Self {
        let r = row.recording;
        Self {
            id: r.id,
            session_id: r.session_id,
            session_type: row.session_type,
            recording_type: r.recording_type,
            status: r.status,
            consent: r.consent,
            duration: r.duration,
            file_size: r.file_size,
            created_at: r.created_at,
            expires_at: r.expires_at,
            access_level: row.access_level,
            has_thumbnail: r.thumbnail_path.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Parties {
        seeker: Uuid,
        giver: Uuid,
        outsider: Uuid,
    }

    fn parties() -> Parties {
        Parties {
            seeker: Uuid::new_v4(),
            giver: Uuid::new_v4(),
            outsider: Uuid::new_v4(),
        }
    }

    fn viewer(p: &Parties, id: Uuid, creator: Uuid, has_grant: bool) -> Viewer {
        Viewer {
            id,
            seeker_id: p.seeker,
            giver_id: p.giver,
            creator_id: creator,
            has_grant,
        }
    }

    #[test]
    fn key_is_32_random_bytes_in_hex() {
        let a = generate_encryption_key();
        let b = generate_encryption_key();
        assert_eq!(a.len(), 64);
        assert_eq!(hex::decode(&a).unwrap().len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn expiry_only_with_auto_delete() {
        let now = OffsetDateTime::UNIX_EPOCH;
        assert_eq!(expiry(now, false, 30), None);
        assert_eq!(expiry(now, true, 30), Some(now + Duration::days(30)));
    }

    #[test]
    fn both_consent_shows_to_participants_with_access() {
        let p = parties();
        assert!(viewer(&p, p.seeker, p.seeker, false).can_view(RecordingConsent::BothConsent));
        assert!(viewer(&p, p.giver, p.seeker, true).can_view(RecordingConsent::BothConsent));
        assert!(!viewer(&p, p.giver, p.seeker, false).can_view(RecordingConsent::BothConsent));
    }

    #[test]
    fn outsiders_never_see_recordings_even_with_a_grant() {
        let p = parties();
        let v = viewer(&p, p.outsider, p.seeker, true);
        for consent in [
            RecordingConsent::BothConsent,
            RecordingConsent::SeekerOnly,
            RecordingConsent::GiverOnly,
        ] {
            assert!(!v.can_view(consent));
        }
        assert!(v.can_update());
    }

    #[test]
    fn one_sided_consent_limits_to_that_side() {
        let p = parties();
        assert!(viewer(&p, p.seeker, p.giver, true).can_view(RecordingConsent::SeekerOnly));
        assert!(!viewer(&p, p.giver, p.giver, true).can_view(RecordingConsent::SeekerOnly));
        assert!(viewer(&p, p.giver, p.giver, false).can_view(RecordingConsent::GiverOnly));
        assert!(!viewer(&p, p.seeker, p.giver, true).can_view(RecordingConsent::GiverOnly));
    }
}
