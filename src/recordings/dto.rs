use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    repo_types::{AccessLevel, RecordingConsent, RecordingStatus, RecordingType, SessionRecording},
    services::{RecordingSummary, DEFAULT_RETENTION_DAYS},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordingRequest {
    pub session_id: Uuid,
    #[serde(default)]
    pub recording_type: RecordingType,
    #[serde(default)]
    pub consent: RecordingConsent,
    #[serde(default)]
    pub auto_delete: bool,
    pub retention_days: Option<i64>,
}

impl CreateRecordingRequest {
    pub fn retention_days(&self) -> i64 {
        self.retention_days.unwrap_or(DEFAULT_RETENTION_DAYS)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedRecording {
    pub id: Uuid,
    pub session_id: Uuid,
    pub recording_type: RecordingType,
    pub status: RecordingStatus,
    pub consent: RecordingConsent,
    pub encryption_enabled: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
}

impl From<&SessionRecording> for CreatedRecording {
    fn from(r: &SessionRecording) -> Self {
        Self {
            id: r.id,
            session_id: r.session_id,
            recording_type: r.recording_type,
            status: r.status,
            consent: r.consent,
            encryption_enabled: !r.encryption_key.is_empty(),
            expires_at: r.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecordingResponse {
    pub success: bool,
    pub recording: CreatedRecording,
    pub message: &'static str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingQuery {
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct RecordingList {
    pub recordings: Vec<RecordingSummary>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRecordingRequest {
    pub status: Option<RecordingStatus>,
    pub duration: Option<i32>,
    pub file_size: Option<i64>,
    pub access_level: Option<AccessLevel>,
}

impl UpdateRecordingRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.status == Some(RecordingStatus::Deleted) {
            return Err("Use DELETE to remove a recording");
        }
        if matches!(self.duration, Some(d) if d < 0) || matches!(self.file_size, Some(s) if s < 0) {
            return Err("Duration and file size cannot be negative");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateRecordingResponse {
    pub success: bool,
    pub recording: SessionRecording,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_to_audio_video_with_both_consent() {
        let body: CreateRecordingRequest = serde_json::from_value(serde_json::json!({
            "sessionId": Uuid::nil()
        }))
        .unwrap();
        assert_eq!(body.recording_type, RecordingType::AudioVideo);
        assert_eq!(body.consent, RecordingConsent::BothConsent);
        assert!(!body.auto_delete);
        assert_eq!(body.retention_days(), 30);
    }

    #[test]
    fn update_refuses_deleted_status_and_negative_sizes() {
        let deleted = UpdateRecordingRequest {
            status: Some(RecordingStatus::Deleted),
            ..Default::default()
        };
        assert!(deleted.validate().is_err());
        let negative = UpdateRecordingRequest {
            file_size: Some(-1),
            ..Default::default()
        };
        assert!(negative.validate().is_err());
        assert!(UpdateRecordingRequest::default().validate().is_ok());
    }
}
