use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{sessions::repo_types::SessionStatus, users::repo_types::Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModerationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Kinds of user content that can enter the moderation queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentType {
    ForumPost,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SystemLog {
    pub id: Uuid,
    pub event: String,
    pub message: String,
    pub user_id: Option<Uuid>,
    pub metadata: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SystemSetting {
    pub id: Uuid,
    pub key: String,
    pub value: serde_json::Value,
    pub description: Option<String>,
    pub category: String,
    pub is_public: bool,
    pub updated_by: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Moderation record with a preview of the moderated content.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ModerationItem {
    pub id: Uuid,
    pub content_type: ContentType,
    pub content_id: Uuid,
    pub status: ModerationStatus,
    pub moderator_id: Option<Uuid>,
    pub moderator_name: Option<String>,
    pub reason: Option<String>,
    pub admin_notes: Option<String>,
    pub content_title: Option<String>,
    pub content_body: Option<String>,
    pub content_author_id: Option<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// User as listed in the admin console, with wallet totals.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ManagedUser {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub avatar: Option<String>,
    pub is_available: bool,
    pub is_disabled: bool,
    pub total_sessions: i32,
    pub presence_rating: Option<f64>,
    pub wallet_balance: i64,
    pub total_earnings: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_login: Option<OffsetDateTime>,
}

/// Platform-wide counters for the dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Counts {
    pub total_users: i64,
    pub total_sessions: i64,
    pub active_users: i64,
    pub pending_moderation: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStat {
    pub status: SessionStatus,
    pub count: i64,
}
