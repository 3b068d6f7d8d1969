//! POST /api/v1/analyze — the full intelligence-to-offer pipeline.

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use funnelscope_core::ProviderKind;
use funnelscope_synth::{AnalysisOutcome, OfferAnalysis, ProviderChoice, SynthError};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub url: String,
    pub industry_hint: Option<String>,
    /// `"auto"` (default), `"openai"`, or `"anthropic"`. Pinning a
    /// provider turns its unavailability into a hard error instead of a
    /// silent template fallback.
    pub provider: Option<String>,
    #[serde(default)]
    pub use_proxy: bool,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeData {
    pub analysis: OfferAnalysis,
    pub model_used: String,
    pub ai_powered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

pub(super) fn parse_provider_choice(
    raw: Option<&str>,
    request_id: &str,
) -> Result<ProviderChoice, ApiError> {
    match raw {
        None | Some("auto") => Ok(ProviderChoice::Auto),
        Some(name) => ProviderKind::parse(name)
            .map(ProviderChoice::Pinned)
            .ok_or_else(|| {
                ApiError::new(
                    request_id.to_string(),
                    "validation_error",
                    format!("unknown provider '{name}'; expected auto, openai, or anthropic"),
                )
            }),
    }
}

pub(super) fn map_synth_error(request_id: String, error: &SynthError) -> ApiError {
    match error {
        SynthError::Validation(msg) => ApiError::new(request_id, "validation_error", msg.clone()),
        SynthError::ProviderUnavailable { .. } => {
            ApiError::new(request_id, "provider_unavailable", error.to_string())
        }
    }
}

/// Best-effort persistence: a missing store or a failed write never
/// affects the response.
pub(super) async fn persist_offer(
    state: &AppState,
    session_id: Option<&str>,
    source_url: Option<&str>,
    outcome: &AnalysisOutcome,
) {
    let (Some(pool), Some(session_id)) = (state.pool.as_ref(), session_id) else {
        return;
    };

    let offer_json = match serde_json::to_value(&outcome.analysis.offer) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "offer serialization for persistence failed");
            return;
        }
    };

    let new = funnelscope_db::NewOffer {
        session_id,
        source_url,
        business_type: &outcome.analysis.intelligence.business_type,
        ai_powered: outcome.ai_powered,
        model_used: &outcome.model_used,
        offer: offer_json,
    };

    if let Err(e) = funnelscope_db::insert_offer(pool, new).await {
        tracing::warn!(session_id, error = %e, "offer persistence failed");
    }
}

pub(super) async fn analyze(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ApiResponse<AnalyzeData>>, ApiError> {
    let choice = parse_provider_choice(request.provider.as_deref(), &req_id.0)?;

    let outcome = state
        .synth
        .analyze(
            &request.url,
            request.industry_hint.as_deref(),
            choice,
            request.use_proxy,
        )
        .await
        .map_err(|e| map_synth_error(req_id.0.clone(), &e))?;

    persist_offer(
        &state,
        request.session_id.as_deref(),
        Some(&request.url),
        &outcome,
    )
    .await;

    Ok(Json(ApiResponse {
        data: AnalyzeData {
            analysis: outcome.analysis,
            model_used: outcome.model_used,
            ai_powered: outcome.ai_powered,
            notice: outcome.notice,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
