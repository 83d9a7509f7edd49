use anyhow::Context;
use sqlx::{Executor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{
    dto::{CreateContactRequest, UpdateContactRequest},
    repo_types::EmergencyContact,
};

const CONTACT_COLUMNS: &str = r#"
    id, user_id, name, relationship, phone, email, is_primary, priority, is_active, created_at
"#;

async fn clear_primary_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    keep: Option<Uuid>,
) -> anyhow::Result<()> {
    tx.execute(
        sqlx::query(
            r#"
            UPDATE emergency_contacts SET is_primary = FALSE
            WHERE user_id = $1 AND is_primary AND ($2::UUID IS NULL OR id <> $2)
            "#,
        )
        .bind(user_id)
        .bind(keep),
    )
    .await
    .context("clear primary contact")?;
    Ok(())
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    req: &CreateContactRequest,
) -> anyhow::Result<EmergencyContact> {
    let mut tx = db.begin().await.context("begin tx")?;
    if req.is_primary {
        clear_primary_tx(&mut tx, user_id, None).await?;
    }

    let sql = format!(
        r#"
        INSERT INTO emergency_contacts (user_id, name, relationship, phone, email, is_primary, priority)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {CONTACT_COLUMNS}
        "#
    );
    let contact = sqlx::query_as::<_, EmergencyContact>(&sql)
        .bind(user_id)
        .bind(req.name.trim())
        .bind(req.relationship.trim())
        .bind(req.phone.trim())
        .bind(&req.email)
        .bind(req.is_primary)
        .bind(req.priority())
        .fetch_one(&mut *tx)
        .await
        .context("insert emergency contact")?;

    tx.commit().await.context("commit tx")?;
    Ok(contact)
}

/// Active contacts, primary first.
pub async fn list_active(
    db: &PgPool,
    user_id: Uuid,
    limit: Option<i64>,
) -> anyhow::Result<Vec<EmergencyContact>> {
    let sql = format!(
        r#"
        SELECT {CONTACT_COLUMNS}
          FROM emergency_contacts
         WHERE user_id = $1 AND is_active
         ORDER BY is_primary DESC, priority ASC, created_at DESC
         LIMIT $2
        "#
    );
    let rows = sqlx::query_as::<_, EmergencyContact>(&sql)
        .bind(user_id)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("list emergency contacts")?;
    Ok(rows)
}

/// Applies the changes to a contact the user owns; `None` if there is no such contact.
pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    changes: &UpdateContactRequest,
) -> anyhow::Result<Option<EmergencyContact>> {
    let mut tx = db.begin().await.context("begin tx")?;
    if changes.is_primary == Some(true) {
        clear_primary_tx(&mut tx, user_id, Some(id)).await?;
    }

    let sql = format!(
        r#"
        UPDATE emergency_contacts SET
            name         = COALESCE($3, name),
            relationship = COALESCE($4, relationship),
            phone        = COALESCE($5, phone),
            email        = COALESCE($6, email),
            is_primary   = COALESCE($7, is_primary),
            priority     = COALESCE($8, priority)
        WHERE id = $1 AND user_id = $2 AND is_active
        RETURNING {CONTACT_COLUMNS}
        "#
    );
    let contact = sqlx::query_as::<_, EmergencyContact>(&sql)
        .bind(id)
        .bind(user_id)
        .bind(&changes.name)
        .bind(&changes.relationship)
        .bind(&changes.phone)
        .bind(&changes.email)
        .bind(changes.is_primary)
        .bind(changes.priority)
        .fetch_optional(&mut *tx)
        .await
        .context("update emergency contact")?;

    if contact.is_some() {
        tx.commit().await.context("commit tx")?;
    }
    Ok(contact)
}

/// Soft delete; returns whether a contact was deactivated.
pub async fn deactivate(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(
        r#"
        UPDATE emergency_contacts SET is_active = FALSE, is_primary = FALSE
        WHERE id = $1 AND user_id = $2 AND is_active
        "#,
    )
    .bind(id)
    .bind(user_id)
    .execute(db)
    .await
    .context("deactivate emergency contact")?;
    Ok(res.rows_affected() > 0)
}
