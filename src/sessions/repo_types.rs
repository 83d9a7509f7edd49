use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::UserSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionType {
    SilentPresence,
    OpenTalk,
    MirrorMode,
    ThinkingRoom,
    FocusCompanion,
}

/// Session lifecycle. Any participant may set any value; transitions are not guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "text", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub seeker_id: Uuid,
    pub giver_id: Uuid,
    pub session_type: SessionType,
    pub duration: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub scheduled_for: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    pub status: SessionStatus,
    pub meeting_link: Option<String>,
    pub payment_status: PaymentStatus,
    pub payment_id: Option<String>,
    pub order_id: Option<String>,
    pub amount: i64,
    pub platform_fee: i64,
    pub giver_earnings: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Session {
    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.seeker_id == user_id || self.giver_id == user_id
    }
}

/// Session joined with both participants' summaries.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    #[sqlx(flatten)]
    pub session: Session,
    pub seeker_name: Option<String>,
    pub seeker_avatar: Option<String>,
    pub seeker_rating: Option<f64>,
    pub giver_name: Option<String>,
    pub giver_avatar: Option<String>,
    pub giver_rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(flatten)]
    pub session: Session,
    pub seeker: UserSummary,
    pub giver: UserSummary,
}

impl From<SessionRow> for SessionView {
    fn from(r: SessionRow) -> Self {
        Self {
            seeker: UserSummary {
                id: r.session.seeker_id,
                name: r.seeker_name,
                avatar: r.seeker_avatar,
                presence_rating: r.seeker_rating,
            },
            giver: UserSummary {
                id: r.session.giver_id,
                name: r.giver_name,
                avatar: r.giver_avatar,
                presence_rating: r.giver_rating,
            },
            session: r.session,
        }
    }
}
