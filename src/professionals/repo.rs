use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    dto::{CreateProfessionalRequest, UpdateProfessionalRequest},
    repo_types::ProfessionalBackup,
};
use crate::db::like_pattern;

const PROFESSIONAL_COLUMNS: &str = r#"
    id, name, profession, organization, phone, email, specialization,
    response_time_minutes, timezone, priority, is_available, is_active, created_at
"#;

pub async fn list_active(
    db: &PgPool,
    specialization: Option<&str>,
    available: Option<bool>,
    limit: i64,
) -> anyhow::Result<Vec<ProfessionalBackup>> {
    let sql = format!(
        r#"
        SELECT {PROFESSIONAL_COLUMNS}
          FROM professional_backups
         WHERE is_active
           AND ($1::TEXT IS NULL OR specialization ILIKE $1)
           AND ($2::BOOLEAN IS NULL OR is_available = $2)
         ORDER BY priority ASC, response_time_minutes ASC NULLS LAST
         LIMIT $3
        "#
    );
    let rows = sqlx::query_as::<_, ProfessionalBackup>(&sql)
        .bind(specialization.map(like_pattern))
        .bind(available)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("list professional backups")?;
    Ok(rows)
}

pub async fn create(
    db: &PgPool,
    req: &CreateProfessionalRequest,
) -> anyhow::Result<ProfessionalBackup> {
    let sql = format!(
        r#"
        INSERT INTO professional_backups
            (name, profession, organization, phone, email, specialization,
             response_time_minutes, timezone, priority)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {PROFESSIONAL_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, ProfessionalBackup>(&sql)
        .bind(req.name.trim())
        .bind(req.profession.trim())
        .bind(&req.organization)
        .bind(req.phone.trim())
        .bind(&req.email)
        .bind(&req.specialization)
        .bind(req.response_time_minutes)
        .bind(&req.timezone)
        .bind(req.priority)
        .fetch_one(db)
        .await
        .context("insert professional backup")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    changes: &UpdateProfessionalRequest,
) -> anyhow::Result<Option<ProfessionalBackup>> {
    let sql = format!(
        r#"
        UPDATE professional_backups SET
            name                  = COALESCE($2, name),
            profession            = COALESCE($3, profession),
            organization          = COALESCE($4, organization),
            phone                 = COALESCE($5, phone),
            email                 = COALESCE($6, email),
            specialization        = COALESCE($7, specialization),
            response_time_minutes = COALESCE($8, response_time_minutes),
            timezone              = COALESCE($9, timezone),
            priority              = COALESCE($10, priority),
            is_available          = COALESCE($11, is_available)
        WHERE id = $1 AND is_active
        RETURNING {PROFESSIONAL_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, ProfessionalBackup>(&sql)
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.profession)
        .bind(&changes.organization)
        .bind(&changes.phone)
        .bind(&changes.email)
        .bind(&changes.specialization)
        .bind(changes.response_time_minutes)
        .bind(&changes.timezone)
        .bind(changes.priority)
        .bind(changes.is_available)
        .fetch_optional(db)
        .await
        .context("update professional backup")?;
    Ok(row)
}

pub async fn deactivate(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(
        "UPDATE professional_backups SET is_active = FALSE, is_available = FALSE WHERE id = $1 AND is_active",
    )
    .bind(id)
    .execute(db)
    .await
    .context("deactivate professional backup")?;
    Ok(res.rows_affected() > 0)
}
