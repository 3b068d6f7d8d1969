//! Competitor intelligence aggregation.
//!
//! Merges extracted signals (own site plus N competitor ads) into a single
//! per-business intelligence record: price positioning, differentiators and
//! weaknesses, spend estimate, creative patterns, and a reconstructed
//! funnel. Everything here is pure derivation over already-fetched data.

use serde::Serialize;

use funnelscope_core::Currency;

pub mod ads;
pub mod aggregate;
pub mod funnel;
pub mod industry;

pub use ads::aggregate_ads;
pub use aggregate::aggregate;
pub use funnel::reverse_engineer_funnel;
pub use industry::search_industry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PricePositioning {
    Budget,
    MidMarket,
    Premium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpendLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpendEstimate {
    pub level: SpendLevel,
    pub reasoning: String,
}

impl SpendEstimate {
    #[must_use]
    pub fn none_observed() -> Self {
        Self {
            level: SpendLevel::Low,
            reasoning: "no ad activity observed for this source".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreativePatterns {
    pub has_video: bool,
    pub has_before_after: bool,
    pub has_social_proof: bool,
    pub visual_style: String,
}

impl Default for CreativePatterns {
    fn default() -> Self {
        Self {
            has_video: false,
            has_before_after: false,
            has_social_proof: false,
            visual_style: "unknown".to_string(),
        }
    }
}

/// The four funnel stages reconstructed from creative content. This is a
/// pure regrouping of extracted lines, not a new computation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FunnelStages {
    pub awareness: Vec<String>,
    pub interest: Vec<String>,
    pub consideration: Vec<String>,
    pub conversion: Vec<String>,
}

/// Statically known facts about a business, merged into aggregation output.
/// Known facts take precedence over derived values on conflict.
#[derive(Debug, Clone, Default)]
pub struct KnownFacts {
    pub differentiators: Vec<String>,
    pub weaknesses: Vec<String>,
    pub price_positioning: Option<PricePositioning>,
}

/// Aggregated intelligence for a single competitor/business.
#[derive(Debug, Clone, Serialize)]
pub struct CompetitorIntelligence {
    /// Domain or ad-library page id.
    pub business_id: String,
    pub business_type: String,
    pub currency: Currency,
    pub price_positioning: PricePositioning,
    pub differentiators: Vec<String>,
    pub weaknesses: Vec<String>,
    pub estimated_spend: SpendEstimate,
    pub creative_patterns: CreativePatterns,
    pub funnel: FunnelStages,
}

/// How many competitors landed in each spend bracket during an industry
/// fan-out.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SpendDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

/// Industry-mode aggregation: one record per seed search that returned
/// ads, plus corpus-wide rollups.
#[derive(Debug, Clone, Serialize)]
pub struct IndustryIntelligence {
    pub industry: String,
    pub competitors: Vec<CompetitorIntelligence>,
    pub common_hooks: Vec<String>,
    pub spend_distribution: SpendDistribution,
}

/// Set-semantics dedup preserving first-seen order, truncated to `cap`.
pub(crate) fn dedupe_cap(items: Vec<String>, cap: usize) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
        if out.len() == cap {
            break;
        }
    }
    out
}
