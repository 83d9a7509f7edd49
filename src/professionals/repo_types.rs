use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// On-call professional escalated to by the crisis protocol.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalBackup {
    pub id: Uuid,
    pub name: String,
    pub profession: String,
    pub organization: Option<String>,
    pub phone: String,
    pub email: Option<String>,
    pub specialization: Option<String>,
    pub response_time_minutes: Option<i32>,
    pub timezone: Option<String>,
    pub priority: i32,
    pub is_available: bool,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
