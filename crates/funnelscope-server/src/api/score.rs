//! POST /api/v1/score — pure qualification scoring.

use std::collections::BTreeMap;

use axum::{extract::State, Extension, Json};
use serde::Deserialize;

use funnelscope_scoring::{QualificationAnswers, ScoreResult, ScoringError};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub answers: BTreeMap<String, String>,
    pub session_id: Option<String>,
}

pub(super) fn run_scoring(
    state: &AppState,
    answers: BTreeMap<String, String>,
    request_id: &str,
) -> Result<(QualificationAnswers, ScoreResult), ApiError> {
    let answers = QualificationAnswers { answers };
    match funnelscope_scoring::score(&answers, &state.rules) {
        Ok(result) => Ok((answers, result)),
        Err(e @ ScoringError::MissingAnswer { .. }) => Err(ApiError::new(
            request_id.to_string(),
            "validation_error",
            e.to_string(),
        )),
    }
}

/// Best-effort persistence of a score result.
pub(super) async fn persist_score(
    state: &AppState,
    session_id: Option<&str>,
    answers: &QualificationAnswers,
    result: &ScoreResult,
) {
    let (Some(pool), Some(session_id)) = (state.pool.as_ref(), session_id) else {
        return;
    };

    let answers_json = match serde_json::to_value(&answers.answers) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "answers serialization for persistence failed");
            return;
        }
    };

    let new = funnelscope_db::NewScoreResult {
        session_id,
        match_score: i16::from(result.match_score),
        urgency_score: i16::from(result.urgency_score),
        conversion_probability: result.conversion_probability,
        recommended_treatment: &result.recommended_treatment,
        answers: answers_json,
    };

    if let Err(e) = funnelscope_db::insert_score_result(pool, new).await {
        tracing::warn!(session_id, error = %e, "score persistence failed");
    }
}

pub(super) async fn score(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ApiResponse<ScoreResult>>, ApiError> {
    let (answers, result) = run_scoring(&state, request.answers, &req_id.0)?;

    persist_score(&state, request.session_id.as_deref(), &answers, &result).await;

    Ok(Json(ApiResponse {
        data: result,
        meta: ResponseMeta::new(req_id.0),
    }))
}
