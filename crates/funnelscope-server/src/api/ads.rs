//! GET /api/v1/ads/search — competitor or industry ad intelligence.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use funnelscope_adlib::AdTarget;
use funnelscope_intel::{aggregate_ads, search_industry, CompetitorIntelligence, IndustryIntelligence};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

const DEFAULT_LIMIT: u32 = 25;
const MAX_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
pub struct AdSearchParams {
    pub term: Option<String>,
    pub page_id: Option<String>,
    pub industry: Option<String>,
    pub limit: Option<u32>,
}

/// Single-target searches return one competitor record; industry mode fans
/// out to the seed terms and returns the aggregated view.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum AdSearchData {
    Competitor(Box<CompetitorIntelligence>),
    Industry(Box<IndustryIntelligence>),
}

pub(super) async fn search_ads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<AdSearchParams>,
) -> Result<Json<ApiResponse<AdSearchData>>, ApiError> {
    let Some(client) = state.adlib.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "provider_unavailable",
            "ad library access is not configured",
        ));
    };

    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    if let Some(industry) = params.industry.as_deref() {
        let intel = search_industry(client, industry, limit).await;
        return Ok(Json(ApiResponse {
            data: AdSearchData::Industry(Box::new(intel)),
            meta: ResponseMeta::new(req_id.0),
        }));
    }

    let (target, business_id) = match (params.page_id.as_deref(), params.term.as_deref()) {
        (Some(page_id), term) => (
            AdTarget::by_page_id(page_id, term.unwrap_or(page_id)),
            page_id.to_string(),
        ),
        (None, Some(term)) => (AdTarget::by_name(term), term.to_string()),
        (None, None) => {
            return Err(ApiError::new(
                req_id.0,
                "validation_error",
                "provide one of: term, page_id, industry",
            ));
        }
    };

    let ads = client.search(&target, limit).await.map_err(|e| {
        tracing::warn!(business_id, error = %e, "ad library search failed");
        ApiError::new(
            req_id.0.clone(),
            "provider_unavailable",
            format!("ad library search failed: {e}"),
        )
    })?;

    Ok(Json(ApiResponse {
        data: AdSearchData::Competitor(Box::new(aggregate_ads(&business_id, &ads))),
        meta: ResponseMeta::new(req_id.0),
    }))
}
