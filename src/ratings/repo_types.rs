use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PresenceRating {
    pub id: Uuid,
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub felt_less_alone: bool,
    pub time_felt_heavy: bool,
    pub would_sit_again: bool,
    pub feedback: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
