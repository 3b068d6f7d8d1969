//! Messages-API provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::offer::GeneratedOffer;
use crate::prompt::{build_user_prompt, parse_offer_json, SYSTEM_PROMPT};
use crate::provider::{OfferProvider, PromptContext, ProviderError};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 1024;

pub struct AnthropicProvider {
    /// `None` when the HTTP client could not be constructed; the provider
    /// then reports itself unconfigured instead of crashing the process.
    client: Option<Client>,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl AnthropicProvider {
    /// Creates a provider pointed at the production API. A `None` key
    /// leaves the provider constructed but unavailable for the process
    /// lifetime.
    #[must_use]
    pub fn new(api_key: Option<String>, model: &str, timeout_secs: u64) -> Self {
        Self::with_base_url(api_key, model, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Custom base URL, for pointing at a mock server in tests.
    #[must_use]
    pub fn with_base_url(
        api_key: Option<String>,
        model: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("funnelscope/0.1 (offer-synthesis)")
            .build()
            .map_err(|e| tracing::warn!(error = %e, "anthropic client construction failed"))
            .ok();
        Self {
            client,
            api_key,
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl OfferProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.client.is_some()
    }

    async fn attempt(&self, ctx: &PromptContext) -> Result<GeneratedOffer, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured)?;
        let client = self.client.as_ref().ok_or(ProviderError::NotConfigured)?;

        let body = json!({
            "model": self.model,
            "max_tokens": MAX_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": [
                {
                    "role": "user",
                    "content": build_user_prompt(&ctx.intelligence, ctx.industry_hint.as_deref())
                }
            ]
        });

        let response = client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: message.chars().take(300).collect(),
            });
        }

        let body: Value = response.json().await?;
        let content = body
            .get("content")
            .and_then(Value::as_array)
            .and_then(|blocks| blocks.first())
            .and_then(|block| block.get("text"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::Parse("no text block in messages response".to_string())
            })?;

        parse_offer_json(content).map_err(ProviderError::Parse)
    }
}
