use anyhow::Context;
use sqlx::PgPool;

use super::repo_types::{CityCount, GiverCard};
use crate::db::like_pattern;

pub(crate) const GIVER_CARD_COLUMNS: &str = r#"
    id, name, avatar, bio, presence_rating, total_sessions, emotional_tempo,
    silence_comfort, energy_level, voice_tone_preference, hourly_rate,
    latitude, longitude, city, state, country, max_distance_km
"#;

/// Bookable givers: giver role, available and not disabled.
pub(crate) const BOOKABLE_GIVER: &str =
    "role IN ('TIME_GIVER', 'BOTH') AND is_available AND NOT is_disabled";

/// Every bookable giver sharing a location, optionally only those whose own
/// travel radius is at most `radius_at_most` km.
pub async fn list_located_givers(
    db: &PgPool,
    radius_at_most: Option<f64>,
) -> anyhow::Result<Vec<GiverCard>> {
    let sql = format!(
        r#"
        SELECT {GIVER_CARD_COLUMNS}
          FROM users
         WHERE {BOOKABLE_GIVER}
           AND is_location_public
           AND latitude IS NOT NULL
           AND longitude IS NOT NULL
           AND ($1::DOUBLE PRECISION IS NULL OR max_distance_km <= $1)
        "#
    );
    let rows = sqlx::query_as::<_, GiverCard>(&sql)
        .bind(radius_at_most)
        .fetch_all(db)
        .await
        .context("list located givers")?;
    Ok(rows)
}

pub async fn popular_cities(db: &PgPool, limit: i64) -> anyhow::Result<Vec<CityCount>> {
    let rows = sqlx::query_as::<_, CityCount>(
        r#"
        SELECT city, state, country, COUNT(*) AS giver_count
          FROM users
         WHERE role IN ('TIME_GIVER', 'BOTH')
           AND is_location_public
           AND NOT is_disabled
           AND city IS NOT NULL
         GROUP BY city, state, country
         ORDER BY giver_count DESC, city ASC
         LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await
    .context("popular cities")?;
    Ok(rows)
}

/// Text search over name/bio/city and location search over city/state/country.
pub async fn search_givers(
    db: &PgPool,
    query: Option<&str>,
    location: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<GiverCard>> {
    let sql = format!(
        r#"
        SELECT {GIVER_CARD_COLUMNS}
          FROM users
         WHERE {BOOKABLE_GIVER}
           AND is_location_public
           AND ($1::TEXT IS NULL OR name ILIKE $1 OR bio ILIKE $1 OR city ILIKE $1)
           AND ($2::TEXT IS NULL OR city ILIKE $2 OR state ILIKE $2 OR country ILIKE $2)
         ORDER BY presence_rating DESC NULLS LAST, total_sessions DESC
         LIMIT $3
        "#
    );
    let rows = sqlx::query_as::<_, GiverCard>(&sql)
        .bind(query.map(like_pattern))
        .bind(location.map(like_pattern))
        .bind(limit)
        .fetch_all(db)
        .await
        .context("search givers")?;
    Ok(rows)
}
