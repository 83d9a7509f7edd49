use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{
    ContentType, Counts, ManagedUser, ModerationItem, ModerationStatus, SystemLog, SystemSetting,
};
use crate::{db::like_pattern, users::repo_types::Role};

/// Appends to the audit trail of admin mutations.
pub async fn log_admin_action(
    db: &PgPool,
    admin_id: Uuid,
    action_type: &str,
    target_type: &str,
    target_id: Option<Uuid>,
    description: &str,
    metadata: serde_json::Value,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO admin_actions (admin_id, action_type, target_type, target_id, description, metadata)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(admin_id)
    .bind(action_type)
    .bind(target_type)
    .bind(target_id)
    .bind(description)
    .bind(metadata)
    .execute(db)
    .await
    .context("insert admin action")?;
    Ok(())
}

pub async fn log_system_event(
    db: &PgPool,
    event: &str,
    message: &str,
    user_id: Option<Uuid>,
    metadata: serde_json::Value,
) -> anyhow::Result<()> {
    sqlx::query(
        "INSERT INTO system_logs (event, message, user_id, metadata) VALUES ($1, $2, $3, $4)",
    )
    .bind(event)
    .bind(message)
    .bind(user_id)
    .bind(metadata)
    .execute(db)
    .await
    .context("insert system log")?;
    Ok(())
}

pub async fn recent_system_logs(db: &PgPool, limit: i64) -> anyhow::Result<Vec<SystemLog>> {
    let rows = sqlx::query_as::<_, SystemLog>(
        r#"
        SELECT id, event, message, user_id, metadata, created_at
          FROM system_logs
         ORDER BY created_at DESC
         LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
    .context("recent system logs")?;
    Ok(rows)
}

pub async fn counts(db: &PgPool) -> anyhow::Result<Counts> {
    let row = sqlx::query_as::<_, Counts>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM users) AS total_users,
            (SELECT COUNT(*) FROM sessions) AS total_sessions,
            (SELECT COUNT(*) FROM users WHERE is_available AND NOT is_disabled) AS active_users,
            (SELECT COUNT(*) FROM content_moderation WHERE status = 'PENDING') AS pending_moderation
        "#,
    )
    .fetch_one(db)
    .await
    .context("dashboard counts")?;
    Ok(row)
}

pub struct UserFilter<'a> {
    pub search: Option<&'a str>,
    pub role: Option<Role>,
    pub available: Option<bool>,
}

const USER_FILTER: &str = r#"
    ($1::TEXT IS NULL OR u.name ILIKE $1 OR u.email ILIKE $1)
    AND ($2::TEXT IS NULL OR u.role = $2)
    AND ($3::BOOLEAN IS NULL OR u.is_available = $3)
"#;

pub async fn list_users(
    db: &PgPool,
    filter: &UserFilter<'_>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<(Vec<ManagedUser>, i64)> {
    let search = filter.search.map(like_pattern);
    let sql = format!(
        r#"
        SELECT u.id, u.email, u.name, u.role, u.avatar, u.is_available, u.is_disabled,
               u.total_sessions, u.presence_rating, u.created_at, u.last_login,
               COALESCE(w.balance, 0) AS wallet_balance,
               COALESCE(w.total_earned, 0) AS total_earnings
          FROM users u
          LEFT JOIN wallets w ON w.user_id = u.id
         WHERE {USER_FILTER}
         ORDER BY u.created_at DESC
         LIMIT $4 OFFSET $5
        "#
    );
    let rows = sqlx::query_as::<_, ManagedUser>(&sql)
        .bind(&search)
        .bind(filter.role)
        .bind(filter.available)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list users")?;

    let count_sql = format!("SELECT COUNT(*) FROM users u WHERE {USER_FILTER}");
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(&search)
        .bind(filter.role)
        .bind(filter.available)
        .fetch_one(db)
        .await
        .context("count users")?;

    Ok((rows, total))
}

const SETTING_COLUMNS: &str =
    "id, key, value, description, category, is_public, updated_by, created_at, updated_at";

pub async fn list_settings(
    db: &PgPool,
    category: Option<&str>,
) -> anyhow::Result<Vec<SystemSetting>> {
    let sql = format!(
        r#"
        SELECT {SETTING_COLUMNS}
          FROM system_settings
         WHERE ($1::TEXT IS NULL OR category = $1)
         ORDER BY category ASC, key ASC
        "#
    );
    let rows = sqlx::query_as::<_, SystemSetting>(&sql)
        .bind(category)
        .fetch_all(db)
        .await
        .context("list settings")?;
    Ok(rows)
}

pub struct NewSetting<'a> {
    pub key: &'a str,
    pub value: &'a serde_json::Value,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub is_public: bool,
    pub updated_by: Uuid,
}

/// `None` when the key is already taken.
pub async fn insert_setting(
    db: &PgPool,
    new: &NewSetting<'_>,
) -> anyhow::Result<Option<SystemSetting>> {
    let sql = format!(
        r#"
        INSERT INTO system_settings (key, value, description, category, is_public, updated_by)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (key) DO NOTHING
        RETURNING {SETTING_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, SystemSetting>(&sql)
        .bind(new.key)
        .bind(new.value)
        .bind(new.description)
        .bind(new.category)
        .bind(new.is_public)
        .bind(new.updated_by)
        .fetch_optional(db)
        .await
        .context("insert setting")?;
    Ok(row)
}

pub async fn update_setting(
    db: &PgPool,
    id: Uuid,
    value: &serde_json::Value,
    description: Option<&str>,
    is_public: Option<bool>,
    updated_by: Uuid,
) -> anyhow::Result<Option<SystemSetting>> {
    let sql = format!(
        r#"
        UPDATE system_settings SET
            value       = $2,
            description = COALESCE($3, description),
            is_public   = COALESCE($4, is_public),
            updated_by  = $5,
            updated_at  = now()
        WHERE id = $1
        RETURNING {SETTING_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, SystemSetting>(&sql)
        .bind(id)
        .bind(value)
        .bind(description)
        .bind(is_public)
        .bind(updated_by)
        .fetch_optional(db)
        .await
        .context("update setting")?;
    Ok(row)
}

const MODERATION_SELECT: &str = r#"
    SELECT m.id, m.content_type, m.content_id, m.status, m.moderator_id,
           mu.name AS moderator_name, m.reason, m.admin_notes,
           fp.title AS content_title, fp.content AS content_body,
           fp.author_id AS content_author_id,
           m.created_at, m.updated_at
      FROM content_moderation m
      LEFT JOIN users mu ON mu.id = m.moderator_id
      LEFT JOIN forum_posts fp ON m.content_type = 'FORUM_POST' AND fp.id = m.content_id
"#;

const MODERATION_FILTER: &str = r#"
    ($1::TEXT IS NULL OR m.status = $1)
    AND ($2::TEXT IS NULL OR m.content_type = $2)
"#;

pub async fn list_moderation(
    db: &PgPool,
    status: Option<ModerationStatus>,
    content_type: Option<ContentType>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<(Vec<ModerationItem>, i64)> {
    let sql = format!(
        r#"
        {MODERATION_SELECT}
         WHERE {MODERATION_FILTER}
         ORDER BY m.created_at DESC
         LIMIT $3 OFFSET $4
        "#
    );
    let rows = sqlx::query_as::<_, ModerationItem>(&sql)
        .bind(status)
        .bind(content_type)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list moderation queue")?;

    let count_sql = format!("SELECT COUNT(*) FROM content_moderation m WHERE {MODERATION_FILTER}");
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(status)
        .bind(content_type)
        .fetch_one(db)
        .await
        .context("count moderation queue")?;

    Ok((rows, total))
}

pub struct Decision<'a> {
    pub content_type: ContentType,
    pub content_id: Uuid,
    pub status: ModerationStatus,
    pub moderator_id: Uuid,
    pub reason: Option<&'a str>,
    pub admin_notes: Option<&'a str>,
}

/// Records a moderation decision, replacing any earlier one for the same content.
pub async fn upsert_decision(db: &PgPool, d: &Decision<'_>) -> anyhow::Result<ModerationItem> {
    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO content_moderation (content_type, content_id, status, moderator_id, reason, admin_notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (content_type, content_id) DO UPDATE SET
            status       = EXCLUDED.status,
            moderator_id = EXCLUDED.moderator_id,
            reason       = EXCLUDED.reason,
            admin_notes  = EXCLUDED.admin_notes,
            updated_at   = now()
        RETURNING id
        "#,
    )
    .bind(d.content_type)
    .bind(d.content_id)
    .bind(d.status)
    .bind(d.moderator_id)
    .bind(d.reason)
    .bind(d.admin_notes)
    .fetch_one(db)
    .await
    .context("upsert moderation decision")?;

    let sql = format!("{MODERATION_SELECT} WHERE m.id = $1");
    let item = sqlx::query_as::<_, ModerationItem>(&sql)
        .bind(id)
        .fetch_one(db)
        .await
        .context("load moderation decision")?;
    Ok(item)
}
