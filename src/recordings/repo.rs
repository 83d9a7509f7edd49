use anyhow::Context;
use serde_json::json;
use sqlx::{Executor, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    repo_types::{AccessLevel, RecordingConsent, RecordingRow, RecordingStatus, RecordingType, SessionRecording},
    services::ENCRYPTION_ALGORITHM,
};

const RECORDING_COLUMNS: &str = r#"
    r.id, r.session_id, r.user_id, r.recording_type, r.consent, r.encryption_key,
    r.status, r.duration, r.file_size, r.thumbnail_path, r.expires_at, r.metadata,
    r.access_control, r.created_at
"#;

/// `$1` is the viewer whose grant is looked up.
const WITH_SESSION_AND_GRANT: &str = r#"
    s.session_type, s.seeker_id, s.giver_id,
    (SELECT a.access_level
       FROM recording_access a
      WHERE a.recording_id = r.id AND a.user_id = $1 AND a.is_active
      ORDER BY a.granted_at
      LIMIT 1) AS access_level
  FROM session_recordings r
  JOIN sessions s ON s.id = r.session_id
"#;

pub struct NewRecording {
    pub session_id: Uuid,
    pub creator_id: Uuid,
    pub recording_type: RecordingType,
    pub consent: RecordingConsent,
    pub encryption_key: String,
    pub expires_at: Option<OffsetDateTime>,
    pub auto_delete: bool,
    pub retention_days: i64,
}

pub async fn has_open_recording(db: &PgPool, session_id: Uuid) -> anyhow::Result<bool> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS (
            SELECT 1 FROM session_recordings
             WHERE session_id = $1 AND status IN ('PENDING', 'RECORDING') AND NOT is_deleted
        )
        "#,
    )
    .bind(session_id)
    .fetch_one(db)
    .await
    .context("check open recording")?;
    Ok(exists)
}

/// Creates the recording and a VIEW grant for each participant.
pub async fn insert_with_grants(
    db: &PgPool,
    new: &NewRecording,
    participants: [Uuid; 2],
) -> anyhow::Result<SessionRecording> {
    let mut tx = db.begin().await.context("begin tx")?;

    let sql = format!(
        r#"
        INSERT INTO session_recordings AS r
            (session_id, user_id, recording_type, consent, encryption_key, status,
             expires_at, metadata, access_control)
        VALUES ($1, $2, $3, $4, $5, 'PENDING', $6, $7, $8)
        RETURNING {RECORDING_COLUMNS}
        "#
    );
    let recording = sqlx::query_as::<_, SessionRecording>(&sql)
        .bind(new.session_id)
        .bind(new.creator_id)
        .bind(new.recording_type)
        .bind(new.consent)
        .bind(&new.encryption_key)
        .bind(new.expires_at)
        .bind(json!({
            "autoDelete": new.auto_delete,
            "retentionDays": new.retention_days,
            "encryptionAlgorithm": ENCRYPTION_ALGORITHM,
        }))
        .bind(json!({
            "allowDownload": false,
            "allowShare": false,
            "requireAuth": true,
        }))
        .fetch_one(&mut *tx)
        .await
        .context("insert recording")?;

    tx.execute(
        sqlx::query(
            r#"
            INSERT INTO recording_access (recording_id, user_id, access_level, granted_by)
            SELECT $1, participant, $3, $4
              FROM unnest($2::UUID[]) AS participant
            "#,
        )
        .bind(recording.id)
        .bind(participants.as_slice())
        .bind(AccessLevel::View)
        .bind(new.creator_id),
    )
    .await
    .context("grant recording access")?;

    tx.commit().await.context("commit tx")?;
    Ok(recording)
}

/// Live recordings the viewer created or whose session they took part in.
pub async fn list_for_viewer(
    db: &PgPool,
    viewer_id: Uuid,
    session_id: Option<Uuid>,
) -> anyhow::Result<Vec<RecordingRow>> {
    let sql = format!(
        r#"
        SELECT {RECORDING_COLUMNS}, {WITH_SESSION_AND_GRANT}
         WHERE NOT r.is_deleted
           AND (r.user_id = $1 OR s.seeker_id = $1 OR s.giver_id = $1)
           AND ($2::UUID IS NULL OR r.session_id = $2)
         ORDER BY r.created_at DESC
        "#
    );
    let rows = sqlx::query_as::<_, RecordingRow>(&sql)
        .bind(viewer_id)
        .bind(session_id)
        .fetch_all(db)
        .await
        .context("list recordings")?;
    Ok(rows)
}

pub async fn find_live(
    db: &PgPool,
    viewer_id: Uuid,
    id: Uuid,
) -> anyhow::Result<Option<RecordingRow>> {
    let sql = format!(
        r#"
        SELECT {RECORDING_COLUMNS}, {WITH_SESSION_AND_GRANT}
         WHERE r.id = $2 AND NOT r.is_deleted
        "#
    );
    let row = sqlx::query_as::<_, RecordingRow>(&sql)
        .bind(viewer_id)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find recording")?;
    Ok(row)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    status: Option<RecordingStatus>,
    duration: Option<i32>,
    file_size: Option<i64>,
) -> anyhow::Result<SessionRecording> {
    let sql = format!(
        r#"
        UPDATE session_recordings AS r SET
            status    = COALESCE($2, status),
            duration  = COALESCE($3, duration),
            file_size = COALESCE($4, file_size)
        WHERE r.id = $1
        RETURNING {RECORDING_COLUMNS}
        "#
    );
    let row = sqlx::query_as::<_, SessionRecording>(&sql)
        .bind(id)
        .bind(status)
        .bind(duration)
        .bind(file_size)
        .fetch_one(db)
        .await
        .context("update recording")?;
    Ok(row)
}

pub async fn set_access_level(
    db: &PgPool,
    recording_id: Uuid,
    user_id: Uuid,
    level: AccessLevel,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        UPDATE recording_access SET access_level = $3
        WHERE recording_id = $1 AND user_id = $2 AND is_active
        "#,
    )
    .bind(recording_id)
    .bind(user_id)
    .bind(level)
    .execute(db)
    .await
    .context("update recording access")?;
    Ok(())
}

/// Marks the recording deleted and revokes every grant on it.
pub async fn soft_delete(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    let mut tx = db.begin().await.context("begin tx")?;
    tx.execute(
        sqlx::query(
            r#"
            UPDATE session_recordings
               SET is_deleted = TRUE, deleted_at = now(), status = 'DELETED'
             WHERE id = $1
            "#,
        )
        .bind(id),
    )
    .await
    .context("soft delete recording")?;
    tx.execute(
        sqlx::query("UPDATE recording_access SET is_active = FALSE WHERE recording_id = $1")
            .bind(id),
    )
    .await
    .context("revoke recording access")?;
    tx.commit().await.context("commit tx")?;
    Ok(())
}
