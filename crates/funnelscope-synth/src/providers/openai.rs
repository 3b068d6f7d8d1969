//! Chat-completions provider.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::offer::GeneratedOffer;
use crate::prompt::{build_user_prompt, parse_offer_json, SYSTEM_PROMPT};
use crate::provider::{OfferProvider, PromptContext, ProviderError};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    /// `None` when the HTTP client could not be constructed; the provider
    /// then reports itself unconfigured instead of crashing the process.
    client: Option<Client>,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl OpenAiProvider {
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
            .map_err(|e| tracing::warn!(error = %e, "openai client construction failed"))
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
impl OfferProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.client.is_some()
    }

    async fn attempt(&self, ctx: &PromptContext) -> Result<GeneratedOffer, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::NotConfigured)?;
        let client = self.client.as_ref().ok_or(ProviderError::NotConfigured)?;

        let body = json!({
            "model": self.model,
            "response_format": { "type": "json_object" },
            "temperature": 0.2,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                {
                    "role": "user",
                    "content": build_user_prompt(&ctx.intelligence, ctx.industry_hint.as_deref())
                }
            ]
        });

        let response = client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
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
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                ProviderError::Parse("no message content in completion response".to_string())
            })?;

        parse_offer_json(content).map_err(ProviderError::Parse)
    }
}
