use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{ProfileChanges, Role, User};

pub(crate) const USER_COLUMNS: &str = r#"
    id, email, password_hash, name, role, bio, avatar, presence_rating, total_sessions,
    emotional_tempo, silence_comfort, energy_level, voice_tone_preference, hourly_rate,
    is_available, latitude, longitude, city, state, country, is_location_public,
    max_distance_km, is_disabled, last_login, created_at, updated_at
"#;

/// Find a user by email.
pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(db)
        .await
        .context("find user by email")?;
    Ok(user)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
    Ok(user)
}

/// Create a new user with hashed password.
pub async fn create(
    db: &PgPool,
    email: &str,
    password_hash: &str,
    name: Option<&str>,
    role: Role,
    hourly_rate: Option<i64>,
) -> anyhow::Result<User> {
    let sql = format!(
        r#"
        INSERT INTO users (email, password_hash, name, role, hourly_rate)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING {USER_COLUMNS}
        "#
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .bind(password_hash)
        .bind(name)
        .bind(role)
        .bind(hourly_rate)
        .fetch_one(db)
        .await
        .context("insert user")?;
    Ok(user)
}

pub async fn touch_last_login(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
    sqlx::query("UPDATE users SET last_login = now() WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("update last_login")?;
    Ok(())
}

pub async fn update_profile(
    db: &PgPool,
    id: Uuid,
    changes: &ProfileChanges,
) -> anyhow::Result<Option<User>> {
    let sql = format!(
        r#"
        UPDATE users SET
            name                  = COALESCE($2, name),
            bio                   = COALESCE($3, bio),
            avatar                = COALESCE($4, avatar),
            role                  = COALESCE($5, role),
            emotional_tempo       = COALESCE($6, emotional_tempo),
            silence_comfort       = COALESCE($7, silence_comfort),
            energy_level          = COALESCE($8, energy_level),
            voice_tone_preference = COALESCE($9, voice_tone_preference),
            hourly_rate           = COALESCE($10, hourly_rate),
            is_available          = COALESCE($11, is_available),
            latitude              = COALESCE($12, latitude),
            longitude             = COALESCE($13, longitude),
            city                  = COALESCE($14, city),
            state                 = COALESCE($15, state),
            country               = COALESCE($16, country),
            is_location_public    = COALESCE($17, is_location_public),
            max_distance_km       = COALESCE($18, max_distance_km),
            updated_at            = now()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.bio)
        .bind(&changes.avatar)
        .bind(changes.role)
        .bind(&changes.emotional_tempo)
        .bind(changes.silence_comfort)
        .bind(&changes.energy_level)
        .bind(&changes.voice_tone_preference)
        .bind(changes.hourly_rate)
        .bind(changes.is_available)
        .bind(changes.latitude)
        .bind(changes.longitude)
        .bind(&changes.city)
        .bind(&changes.state)
        .bind(&changes.country)
        .bind(changes.is_location_public)
        .bind(changes.max_distance_km)
        .fetch_optional(db)
        .await
        .context("update profile")?;
    Ok(user)
}

/// Availability and soft-disable switches used by admin actions.
pub async fn set_flags(
    db: &PgPool,
    id: Uuid,
    is_available: Option<bool>,
    is_disabled: Option<bool>,
) -> anyhow::Result<Option<User>> {
    let sql = format!(
        r#"
        UPDATE users SET
            is_available = COALESCE($2, is_available),
            is_disabled  = COALESCE($3, is_disabled),
            updated_at   = now()
        WHERE id = $1
        RETURNING {USER_COLUMNS}
        "#
    );
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(is_available)
        .bind(is_disabled)
        .fetch_optional(db)
        .await
        .context("update user flags")?;
    Ok(user)
}

/// Recomputes the giver's presence rating from every rating on their sessions.
pub async fn refresh_presence_rating(db: &PgPool, giver_id: Uuid) -> anyhow::Result<Option<f64>> {
    let rating: Option<f64> = sqlx::query_scalar(
        r#"
        UPDATE users SET
            presence_rating = (
                SELECT AVG(r.rating)::DOUBLE PRECISION
                  FROM presence_ratings r
                  JOIN sessions s ON s.id = r.session_id
                 WHERE s.giver_id = $1
            ),
            total_sessions = total_sessions + 1,
            updated_at = now()
        WHERE id = $1
        RETURNING presence_rating
        "#,
    )
    .bind(giver_id)
    .fetch_one(db)
    .await
    .context("refresh presence rating")?;
    Ok(rating)
}
