//! Qualification score rows.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ScoreRow {
    pub id: Uuid,
    pub session_id: String,
    pub match_score: i16,
    pub urgency_score: i16,
    pub conversion_probability: f64,
    pub recommended_treatment: String,
    pub answers: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewScoreResult<'a> {
    pub session_id: &'a str,
    pub match_score: i16,
    pub urgency_score: i16,
    pub conversion_probability: f64,
    pub recommended_treatment: &'a str,
    pub answers: serde_json::Value,
}

/// Insert a score result, returning its row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on any database failure. Callers log and
/// swallow this; the score is returned to the lead either way.
pub async fn insert_score_result(
    pool: &PgPool,
    new: NewScoreResult<'_>,
) -> Result<Uuid, DbError> {
    let id: Uuid = sqlx::query_scalar(
        r"
        INSERT INTO score_results
            (session_id, match_score, urgency_score, conversion_probability,
             recommended_treatment, answers)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        ",
    )
    .bind(new.session_id)
    .bind(new.match_score)
    .bind(new.urgency_score)
    .bind(new.conversion_probability)
    .bind(new.recommended_treatment)
    .bind(&new.answers)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// All score results stored for a session, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on any database failure.
pub async fn list_score_results(
    pool: &PgPool,
    session_id: &str,
) -> Result<Vec<ScoreRow>, DbError> {
    let rows = sqlx::query_as::<_, ScoreRow>(
        r"
        SELECT id, session_id, match_score, urgency_score, conversion_probability,
               recommended_treatment, answers, created_at
        FROM score_results
        WHERE session_id = $1
        ORDER BY created_at DESC
        ",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
