use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::sessions::repo_types::SessionType;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordingType {
    AudioOnly,
    VideoOnly,
    #[default]
    AudioVideo,
}

/// Who may see a recording besides holding an access grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordingConsent {
    #[default]
    BothConsent,
    SeekerOnly,
    GiverOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordingStatus {
    Pending,
    Recording,
    Processing,
    Ready,
    Failed,
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessLevel {
    View,
    Download,
    Share,
    Admin,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecording {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub recording_type: RecordingType,
    pub consent: RecordingConsent,
    #[serde(skip_serializing)]
    pub encryption_key: String,
    pub status: RecordingStatus,
    pub duration: Option<i32>,
    pub file_size: Option<i64>,
    pub thumbnail_path: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    pub metadata: Option<serde_json::Value>,
    pub access_control: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Recording with its session's participants and the viewer's active grant.
#[derive(Debug, Clone, FromRow)]
pub struct RecordingRow {
    #[sqlx(flatten)]
    pub recording: SessionRecording,
    pub session_type: SessionType,
    pub seeker_id: Uuid,
    pub giver_id: Uuid,
    pub access_level: Option<AccessLevel>,
}
