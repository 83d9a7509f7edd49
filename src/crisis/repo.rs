use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{CrisisReport, CrisisStatus, CrisisType, Severity};

const REPORT_COLUMNS: &str = r#"
    id, user_id, session_id, severity, crisis_type, description, status,
    protocol_used, metadata, created_at, updated_at
"#;

pub struct NewReport<'a> {
    pub user_id: Uuid,
    pub session_id: Option<Uuid>,
    pub severity: Severity,
    pub crisis_type: CrisisType,
    pub description: &'a str,
    pub protocol_used: &'a str,
}

pub async fn insert(db: &PgPool, new: &NewReport<'_>) -> anyhow::Result<CrisisReport> {
    let sql = format!(
        r#"
        INSERT INTO crisis_reports
            (user_id, session_id, severity, crisis_type, description, status, protocol_used)
        VALUES ($1, $2, $3, $4, $5, 'ACTIVE', $6)
        RETURNING {REPORT_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, CrisisReport>(&sql)
        .bind(new.user_id)
        .bind(new.session_id)
        .bind(new.severity)
        .bind(new.crisis_type)
        .bind(new.description)
        .bind(new.protocol_used)
        .fetch_one(db)
        .await
        .context("insert crisis report")?;
    Ok(row)
}

pub async fn set_metadata(
    db: &PgPool,
    id: Uuid,
    metadata: &serde_json::Value,
) -> anyhow::Result<()> {
    sqlx::query("UPDATE crisis_reports SET metadata = $2, updated_at = now() WHERE id = $1")
        .bind(id)
        .bind(metadata)
        .execute(db)
        .await
        .context("store crisis metadata")?;
    Ok(())
}

/// The user's reports still needing attention, newest first.
pub async fn list_open(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<CrisisReport>> {
    let sql = format!(
        r#"
        SELECT {REPORT_COLUMNS}
          FROM crisis_reports
         WHERE user_id = $1 AND status IN ('ACTIVE', 'ESCALATED')
         ORDER BY created_at DESC
        "#
    );
    let rows = sqlx::query_as::<_, CrisisReport>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list open crisis reports")?;
    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<CrisisReport>> {
    let sql = format!("SELECT {REPORT_COLUMNS} FROM crisis_reports WHERE id = $1");
    let row = sqlx::query_as::<_, CrisisReport>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find crisis report")?;
    Ok(row)
}

pub async fn set_status(
    db: &PgPool,
    id: Uuid,
    status: CrisisStatus,
) -> anyhow::Result<CrisisReport> {
    let sql = format!(
        r#"
        UPDATE crisis_reports SET status = $2, updated_at = now()
        WHERE id = $1
        RETURNING {REPORT_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, CrisisReport>(&sql)
        .bind(id)
        .bind(status)
        .fetch_one(db)
        .await
        .context("update crisis status")?;
    Ok(row)
}

pub async fn count_open(db: &PgPool) -> anyhow::Result<i64> {
    let n: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM crisis_reports WHERE status IN ('ACTIVE', 'ESCALATED')",
    )
    .fetch_one(db)
    .await
    .context("count open crises")?;
    Ok(n)
}
