//! The analyze pipeline: fetch → extract → aggregate → synthesize.
//!
//! Degradation rules, which callers rely on as a contract:
//! - fetch failure means empty signals, never a failed request;
//! - in auto mode, provider failure means template mode plus a notice;
//! - a pinned provider that is unavailable or fails is a hard error;
//! - `ai_powered` always states truthfully which mode produced the offer.

use std::sync::Arc;

use thiserror::Error;

use funnelscope_core::{AppConfig, Currency, ProviderKind};
use funnelscope_intel::{aggregate, CompetitorIntelligence};
use funnelscope_scoring::ScoreResult;
use funnelscope_scraper::{
    extract, FetchConfig, FetchOptions, FetchOutcome, ScrapedSignals, SourceFetcher,
};
use serde::Serialize;

use crate::offer::GeneratedOffer;
use crate::provider::{attempt_chain, attempt_with_timeout, OfferProvider, PromptContext};
use crate::providers::{AnthropicProvider, OpenAiProvider};
use crate::templates::{synthesize, PricingTier};

pub const TEMPLATE_MODEL_NAME: &str = "template";

/// Which provider the caller wants: auto-degrading chain, or one pinned
/// provider whose failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderChoice {
    Auto,
    Pinned(ProviderKind),
}

#[derive(Debug, Error)]
pub enum SynthError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("model provider '{name}' is unavailable: {reason}")]
    ProviderUnavailable { name: String, reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct OfferAnalysis {
    pub intelligence: CompetitorIntelligence,
    pub offer: GeneratedOffer,
}

/// What `analyze` returns. `ai_powered`/`notice` distinguishing model
/// output from template output is a correctness requirement, not
/// cosmetics: it tells the caller how much to trust the copy.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub analysis: OfferAnalysis,
    pub model_used: String,
    pub ai_powered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// The final personalized object returned to widget callers: scorer output
/// merged with a synthesized offer.
#[derive(Debug, Clone, Serialize)]
pub struct PersonalizedJourney {
    pub match_score: u8,
    pub urgency_score: u8,
    pub conversion_probability: f64,
    pub recommended_treatment: String,
    pub offer: GeneratedOffer,
}

/// Merge scorer and synthesizer output. Scores and treatment pass through
/// unchanged; the offer is already invariant-enforced.
#[must_use]
pub fn build_journey(score: &ScoreResult, offer: GeneratedOffer) -> PersonalizedJourney {
    PersonalizedJourney {
        match_score: score.match_score,
        urgency_score: score.urgency_score,
        conversion_probability: score.conversion_probability,
        recommended_treatment: score.recommended_treatment.clone(),
        offer,
    }
}

pub struct Synthesizer {
    fetcher: SourceFetcher,
    providers: Vec<Arc<dyn OfferProvider>>,
    provider_timeout_secs: u64,
    default_tier: PricingTier,
}

impl Synthesizer {
    #[must_use]
    pub fn new(
        fetcher: SourceFetcher,
        providers: Vec<Arc<dyn OfferProvider>>,
        provider_timeout_secs: u64,
    ) -> Self {
        Self {
            fetcher,
            providers,
            provider_timeout_secs,
            default_tier: PricingTier::Standard,
        }
    }

    /// Build the full pipeline from app config: fetcher, both providers in
    /// the configured priority order. Missing credentials leave a provider
    /// constructed but unavailable; nothing crashes at startup.
    #[must_use]
    pub fn from_app_config(cfg: &AppConfig) -> Self {
        let fetcher = SourceFetcher::new(FetchConfig::from_app_config(cfg));

        let openai: Arc<dyn OfferProvider> = Arc::new(OpenAiProvider::new(
            cfg.openai_api_key.clone(),
            &cfg.openai_model,
            cfg.provider_timeout_secs,
        ));
        let anthropic: Arc<dyn OfferProvider> = Arc::new(AnthropicProvider::new(
            cfg.anthropic_api_key.clone(),
            &cfg.anthropic_model,
            cfg.provider_timeout_secs,
        ));

        let providers = match cfg.primary_provider {
            ProviderKind::OpenAi => vec![openai, anthropic],
            ProviderKind::Anthropic => vec![anthropic, openai],
        };

        Self::new(fetcher, providers, cfg.provider_timeout_secs)
    }

    /// Analyze a target URL and synthesize an offer.
    ///
    /// # Errors
    ///
    /// - [`SynthError::Validation`] for a malformed URL.
    /// - [`SynthError::ProviderUnavailable`] only when `choice` pins a
    ///   provider that is unavailable or fails; auto mode never errors on
    ///   provider trouble.
    pub async fn analyze(
        &self,
        url: &str,
        industry_hint: Option<&str>,
        choice: ProviderChoice,
        use_proxy: bool,
    ) -> Result<AnalysisOutcome, SynthError> {
        SourceFetcher::validate_target(url).map_err(|e| SynthError::Validation(e.to_string()))?;

        let mut notices: Vec<String> = Vec::new();

        let outcome = self
            .fetcher
            .fetch(url, FetchOptions { use_proxy })
            .await;
        let signals = match outcome {
            FetchOutcome::Fetched(doc) => vec![extract(&doc)],
            FetchOutcome::Unavailable { reason } => {
                notices.push(format!(
                    "source fetch unavailable ({reason}); analysis based on defaults"
                ));
                vec![ScrapedSignals::empty(url)]
            }
        };

        let mut intelligence = aggregate(&signals, None);
        if intelligence.business_type == funnelscope_scraper::extract::DEFAULT_BUSINESS_TYPE {
            if let Some(hint) = industry_hint {
                intelligence.business_type =
                    funnelscope_scraper::extract::classify_business_text(hint);
            }
        }

        let ctx = PromptContext {
            intelligence: intelligence.clone(),
            industry_hint: industry_hint.map(ToString::to_string),
        };

        let (offer, model_used, ai_powered) = match choice {
            ProviderChoice::Pinned(kind) => {
                let offer = self.attempt_pinned(kind, &ctx).await?;
                (offer, kind.as_str().to_string(), true)
            }
            ProviderChoice::Auto => {
                match attempt_chain(&self.providers, &ctx, self.provider_timeout_secs).await {
                    Some((offer, name)) => (offer, name.to_string(), true),
                    None => {
                        notices.push(
                            "model providers unavailable; offer generated from deterministic \
                             templates"
                                .to_string(),
                        );
                        (
                            synthesize(&intelligence, self.default_tier),
                            TEMPLATE_MODEL_NAME.to_string(),
                            false,
                        )
                    }
                }
            }
        };

        Ok(AnalysisOutcome {
            analysis: OfferAnalysis {
                intelligence,
                offer,
            },
            model_used,
            ai_powered,
            notice: join_notices(notices),
        })
    }

    /// Template-only outcome for callers with no URL to analyze (journey
    /// requests built purely from questionnaire answers).
    #[must_use]
    pub fn template_outcome(
        &self,
        industry_hint: Option<&str>,
        currency: Currency,
    ) -> AnalysisOutcome {
        let mut intelligence = aggregate(&[], None);
        intelligence.currency = currency;
        if let Some(hint) = industry_hint {
            intelligence.business_type =
                funnelscope_scraper::extract::classify_business_text(hint);
        }

        let offer = synthesize(&intelligence, self.default_tier);
        AnalysisOutcome {
            analysis: OfferAnalysis {
                intelligence,
                offer,
            },
            model_used: TEMPLATE_MODEL_NAME.to_string(),
            ai_powered: false,
            notice: Some("offer generated from deterministic templates".to_string()),
        }
    }

    async fn attempt_pinned(
        &self,
        kind: ProviderKind,
        ctx: &PromptContext,
    ) -> Result<GeneratedOffer, SynthError> {
        let provider = self
            .providers
            .iter()
            .find(|p| p.name() == kind.as_str())
            .ok_or_else(|| SynthError::ProviderUnavailable {
                name: kind.as_str().to_string(),
                reason: "provider is not part of this deployment".to_string(),
            })?;

        if !provider.is_configured() {
            return Err(SynthError::ProviderUnavailable {
                name: kind.as_str().to_string(),
                reason: "provider credentials are not configured".to_string(),
            });
        }

        attempt_with_timeout(provider.as_ref(), ctx, self.provider_timeout_secs)
            .await
            .map_err(|e| SynthError::ProviderUnavailable {
                name: kind.as_str().to_string(),
                reason: e.to_string(),
            })
    }
}

fn join_notices(notices: Vec<String>) -> Option<String> {
    if notices.is_empty() {
        None
    } else {
        Some(notices.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use funnelscope_scoring::ScoreResult;
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn journey_carries_score_and_offer_unchanged() {
        let score = ScoreResult {
            match_score: 88,
            urgency_score: 70,
            conversion_probability: 0.95,
            recommended_treatment: "Skin Tightening (RF Microneedling)".to_string(),
        };
        let intel = aggregate(&[], None);
        let offer = synthesize(&intel, PricingTier::Standard);
        let expected_price = offer.pricing.offer_price;

        let journey = build_journey(&score, offer);
        assert_eq!(journey.match_score, 88);
        assert_eq!(journey.urgency_score, 70);
        assert!(journey.conversion_probability == 0.95);
        assert_eq!(
            journey.recommended_treatment,
            "Skin Tightening (RF Microneedling)"
        );
        assert_eq!(journey.offer.pricing.offer_price, expected_price);
        assert!(journey.offer.pricing.offer_price > Decimal::ZERO);
    }

    #[test]
    fn join_notices_is_none_for_empty() {
        assert!(join_notices(vec![]).is_none());
        assert_eq!(
            join_notices(vec!["a".to_string(), "b".to_string()]).as_deref(),
            Some("a; b")
        );
    }
}
