//! Generated-offer rows.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OfferRow {
    pub id: Uuid,
    pub session_id: String,
    pub source_url: Option<String>,
    pub business_type: String,
    pub ai_powered: bool,
    pub model_used: String,
    pub offer: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOffer<'a> {
    pub session_id: &'a str,
    pub source_url: Option<&'a str>,
    pub business_type: &'a str,
    pub ai_powered: bool,
    pub model_used: &'a str,
    pub offer: serde_json::Value,
}

/// Insert a finished offer, returning its row id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] on any database failure. Callers are expected
/// to log and swallow this: persistence must never block returning the
/// computed result.
pub async fn insert_offer(pool: &PgPool, new: NewOffer<'_>) -> Result<Uuid, DbError> {
    let id: Uuid = sqlx::query_scalar(
        r"
        INSERT INTO generated_offers
            (session_id, source_url, business_type, ai_powered, model_used, offer)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        ",
    )
    .bind(new.session_id)
    .bind(new.source_url)
    .bind(new.business_type)
    .bind(new.ai_powered)
    .bind(new.model_used)
    .bind(&new.offer)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// Latest offer stored for a session.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when the session has no stored offer, or
/// [`DbError::Sqlx`] on any database failure.
pub async fn get_latest_offer(pool: &PgPool, session_id: &str) -> Result<OfferRow, DbError> {
    sqlx::query_as::<_, OfferRow>(
        r"
        SELECT id, session_id, source_url, business_type, ai_powered, model_used,
               offer, created_at
        FROM generated_offers
        WHERE session_id = $1
        ORDER BY created_at DESC
        LIMIT 1
        ",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
