//! Offer synthesis: deterministic templates, model providers with an
//! ordered fallback chain, and the analyze pipeline that ties fetching,
//! extraction, aggregation, and synthesis together.
//!
//! The contract callers rely on: every `GeneratedOffer` leaving this crate
//! satisfies the pricing invariants regardless of which mode produced it,
//! and the outcome always distinguishes model output from template output
//! via `ai_powered`/`notice`.

pub mod offer;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod providers;
pub mod templates;

pub use offer::{GeneratedOffer, OfferPricing, ValueItem};
pub use pipeline::{
    build_journey, AnalysisOutcome, OfferAnalysis, PersonalizedJourney, ProviderChoice,
    SynthError, Synthesizer,
};
pub use provider::{OfferProvider, PromptContext, ProviderError};
pub use providers::{AnthropicProvider, OpenAiProvider};
pub use templates::{synthesize, PricingTier};
