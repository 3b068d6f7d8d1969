//! POST /api/v1/journey — scorer output merged with a synthesized offer
//! into the final personalized object for widget callers.

use std::collections::BTreeMap;

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use funnelscope_core::Currency;
use funnelscope_synth::{build_journey, PersonalizedJourney, ProviderChoice};

use crate::middleware::RequestId;

use super::analyze::{map_synth_error, persist_offer};
use super::score::{persist_score, run_scoring};
use super::{ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub struct JourneyRequest {
    pub answers: BTreeMap<String, String>,
    /// When present, the offer comes from the full analyze pipeline;
    /// otherwise a template offer is built from the industry hint alone.
    pub url: Option<String>,
    pub industry_hint: Option<String>,
    pub currency: Option<Currency>,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JourneyData {
    pub journey: PersonalizedJourney,
    pub model_used: String,
    pub ai_powered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

pub(super) async fn journey(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(request): Json<JourneyRequest>,
) -> Result<Json<ApiResponse<JourneyData>>, ApiError> {
    let (answers, score) = run_scoring(&state, request.answers, &req_id.0)?;

    let outcome = match request.url.as_deref() {
        Some(url) => state
            .synth
            .analyze(
                url,
                request.industry_hint.as_deref(),
                ProviderChoice::Auto,
                false,
            )
            .await
            .map_err(|e| map_synth_error(req_id.0.clone(), &e))?,
        None => state.synth.template_outcome(
            request.industry_hint.as_deref(),
            request.currency.unwrap_or(Currency::Usd),
        ),
    };

    persist_score(&state, request.session_id.as_deref(), &answers, &score).await;
    persist_offer(
        &state,
        request.session_id.as_deref(),
        request.url.as_deref(),
        &outcome,
    )
    .await;

    let journey = build_journey(&score, outcome.analysis.offer);

    Ok(Json(ApiResponse {
        data: JourneyData {
            journey,
            model_used: outcome.model_used,
            ai_powered: outcome.ai_powered,
            notice: outcome.notice,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
