use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    repo_types::{ForumCategory, ForumPostRow},
    services::SortOrder,
};
use crate::db::like_pattern;

const POST_COLUMNS: &str = r#"
    p.id, p.author_id, p.title, p.content, p.category, p.is_anonymous, p.is_pinned,
    p.is_locked, p.tags, p.reply_count, p.view_count, p.like_count,
    p.created_at, p.updated_at,
    u.name AS author_name, u.avatar AS author_avatar
"#;

const LIST_FILTER: &str = r#"
    NOT p.is_deleted
    AND ($1::TEXT IS NULL OR p.category = $1)
    AND ($2::TEXT IS NULL OR p.title ILIKE $2 OR p.content ILIKE $2)
    AND ($3::TEXT IS NULL OR EXISTS (
        SELECT 1 FROM unnest(p.tags) AS t(tag) WHERE lower(t.tag) = lower($3)
    ))
"#;

pub struct PostFilter<'a> {
    pub category: Option<ForumCategory>,
    pub search: Option<&'a str>,
    pub tag: Option<&'a str>,
}

pub struct NewPost<'a> {
    pub author_id: Uuid,
    pub title: &'a str,
    pub content: &'a str,
    pub category: ForumCategory,
    pub is_anonymous: bool,
    pub tags: &'a [String],
    pub metadata: serde_json::Value,
}

pub async fn insert(db: &PgPool, new: &NewPost<'_>) -> anyhow::Result<ForumPostRow> {
    let sql = format!(
        r#"
        WITH p AS (
            INSERT INTO forum_posts (author_id, title, content, category, is_anonymous, tags, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
        )
        SELECT {POST_COLUMNS} FROM p JOIN users u ON u.id = p.author_id
        "#
    );
    let row = sqlx::query_as::<_, ForumPostRow>(&sql)
        .bind(new.author_id)
        .bind(new.title)
        .bind(new.content)
        .bind(new.category)
        .bind(new.is_anonymous)
        .bind(new.tags)
        .bind(&new.metadata)
        .fetch_one(db)
        .await
        .context("insert forum post")?;
    Ok(row)
}

pub async fn list(
    db: &PgPool,
    filter: &PostFilter<'_>,
    sort: SortOrder,
    limit: i64,
    offset: i64,
) -> anyhow::Result<(Vec<ForumPostRow>, i64)> {
    let search = filter.search.map(like_pattern);
    let sql = format!(
        r#"
        SELECT {POST_COLUMNS}
          FROM forum_posts p
          JOIN users u ON u.id = p.author_id
         WHERE {LIST_FILTER}
         ORDER BY {order}
         LIMIT $4 OFFSET $5
        "#,
        order = sort.order_by(),
    );
    let rows = sqlx::query_as::<_, ForumPostRow>(&sql)
        .bind(filter.category)
        .bind(&search)
        .bind(filter.tag)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list forum posts")?;

    let count_sql = format!("SELECT COUNT(*) FROM forum_posts p WHERE {LIST_FILTER}");
    let total: i64 = sqlx::query_scalar(&count_sql)
        .bind(filter.category)
        .bind(&search)
        .bind(filter.tag)
        .fetch_one(db)
        .await
        .context("count forum posts")?;

    Ok((rows, total))
}

/// Live (not deleted) post by id.
pub async fn find_live(db: &PgPool, id: Uuid) -> anyhow::Result<Option<ForumPostRow>> {
    let sql = format!(
        r#"
        SELECT {POST_COLUMNS}
          FROM forum_posts p
          JOIN users u ON u.id = p.author_id
         WHERE p.id = $1 AND NOT p.is_deleted
        "#
    );
    let row = sqlx::query_as::<_, ForumPostRow>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find forum post")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    title: Option<&str>,
    content: Option<&str>,
    is_anonymous: Option<bool>,
    tags: Option<&[String]>,
) -> anyhow::Result<ForumPostRow> {
    let sql = format!(
        r#"
        WITH p AS (
            UPDATE forum_posts SET
                title        = COALESCE($2, title),
                content      = COALESCE($3, content),
                is_anonymous = COALESCE($4, is_anonymous),
                tags         = COALESCE($5, tags),
                updated_at   = now()
            WHERE id = $1
            RETURNING *
        )
        SELECT {POST_COLUMNS} FROM p JOIN users u ON u.id = p.author_id
        "#
    );
    let row = sqlx::query_as::<_, ForumPostRow>(&sql)
        .bind(id)
        .bind(title)
        .bind(content)
        .bind(is_anonymous)
        .bind(tags)
        .fetch_one(db)
        .await
        .context("update forum post")?;
    Ok(row)
}

pub async fn soft_delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(
        "UPDATE forum_posts SET is_deleted = TRUE, deleted_at = now() WHERE id = $1 AND NOT is_deleted",
    )
    .bind(id)
    .execute(db)
    .await
    .context("soft delete forum post")?;
    Ok(res.rows_affected() > 0)
}
