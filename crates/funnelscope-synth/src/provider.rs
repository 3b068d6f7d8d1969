//! Provider abstraction and the ordered fallback chain.
//!
//! Each provider exposes a uniform `attempt`; the chain iterates strictly
//! sequentially in priority order and short-circuits on the first success.
//! There is no racing of providers: the fallback decision depends on the
//! primary's outcome.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use funnelscope_intel::CompetitorIntelligence;

use crate::offer::GeneratedOffer;

/// Everything a provider needs to construct its prompt.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub intelligence: CompetitorIntelligence,
    pub industry_hint: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider is not configured (missing credentials)")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("response parse failure: {0}")]
    Parse(String),

    #[error("provider attempt timed out after {secs}s")]
    Timeout { secs: u64 },
}

/// A generative-model offer provider.
///
/// `is_configured` is decided once from process configuration: a provider
/// with missing credentials stays unavailable for the process lifetime and
/// is skipped by the chain rather than crashing anything.
#[async_trait]
pub trait OfferProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_configured(&self) -> bool;

    /// One bounded attempt at producing a validated offer.
    async fn attempt(&self, ctx: &PromptContext) -> Result<GeneratedOffer, ProviderError>;
}

/// Run one provider attempt under the per-attempt time bound.
///
/// # Errors
///
/// Propagates the provider's error, or [`ProviderError::Timeout`] when the
/// bound elapses first.
pub async fn attempt_with_timeout(
    provider: &dyn OfferProvider,
    ctx: &PromptContext,
    timeout_secs: u64,
) -> Result<GeneratedOffer, ProviderError> {
    match tokio::time::timeout(Duration::from_secs(timeout_secs), provider.attempt(ctx)).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout { secs: timeout_secs }),
    }
}

/// Try each provider in order; first success wins.
///
/// Unconfigured providers are skipped, failures are logged and never
/// raised. Returns `None` when every provider is skipped or fails, which
/// callers treat as "fall through to template mode".
pub async fn attempt_chain(
    providers: &[Arc<dyn OfferProvider>],
    ctx: &PromptContext,
    timeout_secs: u64,
) -> Option<(GeneratedOffer, &'static str)> {
    for provider in providers {
        if !provider.is_configured() {
            tracing::debug!(provider = provider.name(), "provider unconfigured, skipping");
            continue;
        }

        match attempt_with_timeout(provider.as_ref(), ctx, timeout_secs).await {
            Ok(offer) => {
                tracing::info!(provider = provider.name(), "model offer accepted");
                return Some((offer, provider.name()));
            }
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    error = %e,
                    "provider attempt failed, trying next"
                );
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use funnelscope_core::Currency;
    use funnelscope_intel::{
        CompetitorIntelligence, CreativePatterns, FunnelStages, PricePositioning, SpendEstimate,
    };
    use rust_decimal::Decimal;

    use crate::offer::{OfferPricing, ValueItem};

    use super::*;

    fn ctx() -> PromptContext {
        PromptContext {
            intelligence: CompetitorIntelligence {
                business_id: "test".to_string(),
                business_type: "Service Business".to_string(),
                currency: Currency::Usd,
                price_positioning: PricePositioning::MidMarket,
                differentiators: vec![],
                weaknesses: vec![],
                estimated_spend: SpendEstimate::none_observed(),
                creative_patterns: CreativePatterns::default(),
                funnel: FunnelStages::default(),
            },
            industry_hint: None,
        }
    }

    fn stub_offer() -> GeneratedOffer {
        GeneratedOffer {
            dream_outcome: "outcome".to_string(),
            currency: Currency::Usd,
            value_stack: vec![ValueItem {
                item: "thing".to_string(),
                value: Decimal::from(100),
                description: "desc".to_string(),
            }],
            pricing: OfferPricing {
                total_value: Decimal::from(100),
                offer_price: Decimal::from(20),
                payment_plan: None,
            },
            guarantee: "guarantee".to_string(),
            urgency: "urgency".to_string(),
            scarcity: "scarcity".to_string(),
            bonuses: vec![],
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl OfferProvider for FailingProvider {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn is_configured(&self) -> bool {
            true
        }
        async fn attempt(&self, _ctx: &PromptContext) -> Result<GeneratedOffer, ProviderError> {
            Err(ProviderError::Api {
                status: 500,
                message: "boom".to_string(),
            })
        }
    }

    struct OkProvider;

    #[async_trait]
    impl OfferProvider for OkProvider {
        fn name(&self) -> &'static str {
            "ok"
        }
        fn is_configured(&self) -> bool {
            true
        }
        async fn attempt(&self, _ctx: &PromptContext) -> Result<GeneratedOffer, ProviderError> {
            Ok(stub_offer())
        }
    }

    struct UnconfiguredProvider;

    #[async_trait]
    impl OfferProvider for UnconfiguredProvider {
        fn name(&self) -> &'static str {
            "unconfigured"
        }
        fn is_configured(&self) -> bool {
            false
        }
        async fn attempt(&self, _ctx: &PromptContext) -> Result<GeneratedOffer, ProviderError> {
            Err(ProviderError::NotConfigured)
        }
    }

    #[tokio::test]
    async fn chain_falls_through_to_the_first_success() {
        let providers: Vec<Arc<dyn OfferProvider>> =
            vec![Arc::new(FailingProvider), Arc::new(OkProvider)];
        let (offer, name) = attempt_chain(&providers, &ctx(), 5).await.unwrap();
        assert_eq!(name, "ok");
        assert_eq!(offer.pricing.offer_price, Decimal::from(20));
    }

    #[tokio::test]
    async fn chain_skips_unconfigured_providers() {
        let providers: Vec<Arc<dyn OfferProvider>> =
            vec![Arc::new(UnconfiguredProvider), Arc::new(OkProvider)];
        let (_, name) = attempt_chain(&providers, &ctx(), 5).await.unwrap();
        assert_eq!(name, "ok");
    }

    #[tokio::test]
    async fn chain_returns_none_when_all_fail() {
        let providers: Vec<Arc<dyn OfferProvider>> =
            vec![Arc::new(FailingProvider), Arc::new(UnconfiguredProvider)];
        assert!(attempt_chain(&providers, &ctx(), 5).await.is_none());
    }

    #[tokio::test]
    async fn chain_short_circuits_on_first_success() {
        struct PanickingProvider;

        #[async_trait]
        impl OfferProvider for PanickingProvider {
            fn name(&self) -> &'static str {
                "must-not-run"
            }
            fn is_configured(&self) -> bool {
                true
            }
            async fn attempt(
                &self,
                _ctx: &PromptContext,
            ) -> Result<GeneratedOffer, ProviderError> {
                panic!("second provider must not be attempted after a success");
            }
        }

        let providers: Vec<Arc<dyn OfferProvider>> =
            vec![Arc::new(OkProvider), Arc::new(PanickingProvider)];
        let (_, name) = attempt_chain(&providers, &ctx(), 5).await.unwrap();
        assert_eq!(name, "ok");
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        struct SlowProvider;

        #[async_trait]
        impl OfferProvider for SlowProvider {
            fn name(&self) -> &'static str {
                "slow"
            }
            fn is_configured(&self) -> bool {
                true
            }
            async fn attempt(
                &self,
                _ctx: &PromptContext,
            ) -> Result<GeneratedOffer, ProviderError> {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(stub_offer())
            }
        }

        let result = attempt_with_timeout(&SlowProvider, &ctx(), 0).await;
        assert!(matches!(result, Err(ProviderError::Timeout { .. })));
    }
}
