use anyhow::Context;
use sqlx::PgPool;

use super::services::MatchPreferences;
use crate::discover::{
    repo::{BOOKABLE_GIVER, GIVER_CARD_COLUMNS},
    repo_types::GiverCard,
};

/// Bookable givers passing the hard filters, best rated and most experienced first.
pub async fn candidates(
    db: &PgPool,
    prefs: &MatchPreferences,
    limit: i64,
) -> anyhow::Result<Vec<GiverCard>> {
    let (silence_min, silence_max) = prefs.silence_window().unzip();
    let sql = format!(
        r#"
        SELECT {GIVER_CARD_COLUMNS}
          FROM users
         WHERE {BOOKABLE_GIVER}
           AND ($1::TEXT IS NULL OR emotional_tempo = $1)
           AND ($2::TEXT IS NULL OR energy_level = $2)
           AND ($3::INTEGER IS NULL OR silence_comfort BETWEEN $3 AND $4)
         ORDER BY presence_rating DESC NULLS LAST, total_sessions DESC
         LIMIT $5
        "#
    );
    let rows = sqlx::query_as::<_, GiverCard>(&sql)
        .bind(&prefs.emotional_tempo)
        .bind(&prefs.energy_level)
        .bind(silence_min)
        .bind(silence_max)
        .bind(limit)
        .fetch_all(db)
        .await
        .context("match candidates")?;
    Ok(rows)
}
