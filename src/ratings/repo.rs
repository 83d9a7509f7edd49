use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::{dto::CreateRatingRequest, repo_types::PresenceRating};

const RATING_COLUMNS: &str = r#"
    id, session_id, user_id, rating, felt_less_alone, time_felt_heavy,
    would_sit_again, feedback, created_at
"#;

/// Inserts the rating; `None` when this user already rated the session.
pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    req: &CreateRatingRequest,
) -> anyhow::Result<Option<PresenceRating>> {
    let sql = format!(
        r#"
        INSERT INTO presence_ratings
            (session_id, user_id, rating, felt_less_alone, time_felt_heavy, would_sit_again, feedback)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (session_id, user_id) DO NOTHING
        RETURNING {RATING_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, PresenceRating>(&sql)
        .bind(req.session_id)
        .bind(user_id)
        .bind(req.rating)
        .bind(req.felt_less_alone)
        .bind(req.time_felt_heavy)
        .bind(req.would_sit_again)
        .bind(req.feedback())
        .fetch_optional(db)
        .await
        .context("insert presence rating")?;
    Ok(row)
}

pub async fn list_for_session(db: &PgPool, session_id: Uuid) -> anyhow::Result<Vec<PresenceRating>> {
    let sql = format!(
        "SELECT {RATING_COLUMNS} FROM presence_ratings WHERE session_id = $1 ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, PresenceRating>(&sql)
        .bind(session_id)
        .fetch_all(db)
        .await
        .context("list ratings for session")?;
    Ok(rows)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<PresenceRating>> {
    let sql = format!(
        "SELECT {RATING_COLUMNS} FROM presence_ratings WHERE user_id = $1 ORDER BY created_at DESC"
    );
    let rows = sqlx::query_as::<_, PresenceRating>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list ratings by user")?;
    Ok(rows)
}
