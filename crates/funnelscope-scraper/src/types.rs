use funnelscope_core::Currency;
use serde::Serialize;

/// Raw fetched page content, before extraction.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub source_url: String,
    pub html: String,
    /// Whether client-side script was executed before capture.
    pub rendered: bool,
}

/// Result of a fetch attempt. Fetching is optional enrichment, so failures
/// are data, not errors.
#[derive(Debug)]
pub enum FetchOutcome {
    Fetched(RawDocument),
    Unavailable { reason: String },
}

/// One fetch's worth of extracted marketing signals.
///
/// All sequences are deduplicated in document order and capped (prices at
/// 10, everything else at 20) to bound downstream prompt and heuristic
/// cost. Never mutated after construction and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScrapedSignals {
    pub source_url: String,
    pub currency: Currency,
    pub prices: Vec<String>,
    pub headlines: Vec<String>,
    pub features: Vec<String>,
    pub testimonials: Vec<String>,
    pub guarantees: Vec<String>,
    pub urgency_phrases: Vec<String>,
    pub cta_labels: Vec<String>,
    pub business_type: String,
}

impl ScrapedSignals {
    /// An empty signal set for a URL whose fetch produced nothing. Currency
    /// falls back to the domain hint.
    #[must_use]
    pub fn empty(source_url: &str) -> Self {
        Self {
            source_url: source_url.to_string(),
            currency: Currency::from_url(source_url),
            prices: Vec::new(),
            headlines: Vec::new(),
            features: Vec::new(),
            testimonials: Vec::new(),
            guarantees: Vec::new(),
            urgency_phrases: Vec::new(),
            cta_labels: Vec::new(),
            business_type: crate::extract::DEFAULT_BUSINESS_TYPE.to_string(),
        }
    }
}
