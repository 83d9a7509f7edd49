use anyhow::Context;
use sqlx::{Executor, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::{PaymentStatus, Session, SessionRow, SessionStatus, SessionType};

pub(crate) const SESSION_COLUMNS: &str = r#"
    s.id, s.seeker_id, s.giver_id, s.session_type, s.duration, s.scheduled_for,
    s.started_at, s.ended_at, s.status, s.meeting_link, s.payment_status, s.payment_id,
    s.order_id, s.amount, s.platform_fee, s.giver_earnings, s.created_at, s.updated_at
"#;

const WITH_PARTICIPANTS: &str = r#"
    seeker.name AS seeker_name, seeker.avatar AS seeker_avatar,
    seeker.presence_rating AS seeker_rating,
    giver.name AS giver_name, giver.avatar AS giver_avatar,
    giver.presence_rating AS giver_rating
  FROM sessions s
  JOIN users seeker ON seeker.id = s.seeker_id
  JOIN users giver ON giver.id = s.giver_id
"#;

pub struct NewSession<'a> {
    pub seeker_id: Uuid,
    pub giver_id: Uuid,
    pub session_type: SessionType,
    pub duration: i32,
    pub scheduled_for: OffsetDateTime,
    pub meeting_link: &'a str,
    pub amount: i64,
}

pub async fn list_for_participant(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<SessionRow>> {
    let sql = format!(
        r#"
        SELECT {SESSION_COLUMNS}, {WITH_PARTICIPANTS}
         WHERE s.seeker_id = $1 OR s.giver_id = $1
         ORDER BY s.scheduled_for DESC
        "#
    );
    let rows = sqlx::query_as::<_, SessionRow>(&sql)
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("list sessions")?;
    Ok(rows)
}

/// The session, only if `user_id` takes part in it.
pub async fn find_for_participant(
    db: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> anyhow::Result<Option<SessionRow>> {
    let sql = format!(
        r#"
        SELECT {SESSION_COLUMNS}, {WITH_PARTICIPANTS}
         WHERE s.id = $1 AND (s.seeker_id = $2 OR s.giver_id = $2)
        "#
    );
    let row = sqlx::query_as::<_, SessionRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
        .context("find session for participant")?;
    Ok(row)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Session>> {
    let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions s WHERE s.id = $1");
    let row = sqlx::query_as::<_, Session>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find session")?;
    Ok(row)
}

pub async fn insert(db: &PgPool, new: &NewSession<'_>) -> anyhow::Result<Session> {
    let sql = format!(
        r#"
        INSERT INTO sessions AS s
            (seeker_id, giver_id, session_type, duration, scheduled_for, meeting_link, amount)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {SESSION_COLUMNS}
        "#
    );
    let session = sqlx::query_as::<_, Session>(&sql)
        .bind(new.seeker_id)
        .bind(new.giver_id)
        .bind(new.session_type)
        .bind(new.duration)
        .bind(new.scheduled_for)
        .bind(new.meeting_link)
        .bind(new.amount)
        .fetch_one(db)
        .await
        .context("insert session")?;
    Ok(session)
}

pub async fn update_progress(
    db: &PgPool,
    id: Uuid,
    status: Option<SessionStatus>,
    started_at: Option<OffsetDateTime>,
    ended_at: Option<OffsetDateTime>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE sessions SET
            status     = COALESCE($2, status),
            started_at = COALESCE($3, started_at),
            ended_at   = COALESCE($4, ended_at),
            updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status)
    .bind(started_at)
    .bind(ended_at)
    .execute(db)
    .await
    .context("update session progress")?;
    Ok(())
}

pub async fn count_by_status(db: &PgPool) -> anyhow::Result<Vec<(SessionStatus, i64)>> {
    let rows = sqlx::query_as::<_, (SessionStatus, i64)>(
        "SELECT status, COUNT(*) FROM sessions GROUP BY status ORDER BY status",
    )
    .fetch_all(db)
    .await
    .context("count sessions by status")?;
    Ok(rows)
}

/// Stores the order and the price split agreed when the payment order is created.
pub async fn set_pricing(
    db: &PgPool,
    id: Uuid,
    order_id: &str,
    amount: i64,
    platform_fee: i64,
    giver_earnings: i64,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE sessions SET
            order_id = $2, amount = $3, platform_fee = $4, giver_earnings = $5,
            updated_at = now()
        WHERE id = $1 AND payment_status = 'PENDING'
        "#,
    )
    .bind(id)
    .bind(order_id)
    .bind(amount)
    .bind(platform_fee)
    .bind(giver_earnings)
    .execute(db)
    .await
    .context("set session pricing")?;
    Ok(())
}

/// Moves the payment from `from` to `to`. Returns false when another request
/// changed the status first.
pub async fn set_payment_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    from: PaymentStatus,
    to: PaymentStatus,
    payment_id: &str,
) -> anyhow::Result<bool> {
    let done = tx
        .execute(
            sqlx::query(
                r#"
                UPDATE sessions SET payment_status = $3, payment_id = $4, updated_at = now()
                WHERE id = $1 AND payment_status = $2
                "#,
            )
            .bind(id)
            .bind(from)
            .bind(to)
            .bind(payment_id),
        )
        .await
        .context("set session payment")?;
    Ok(done.rows_affected() > 0)
}
