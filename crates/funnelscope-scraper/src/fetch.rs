//! Source fetching: static HTTP and rendered-DOM backends.
//!
//! The rendered backend drives a browserless-style render service over HTTP
//! (`/content`, `/screenshot`) so client-side script executes before
//! capture; it is selected whenever a render endpoint is configured. The
//! static backend is a plain GET. Both are scoped to a single call — no
//! session pooling.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde_json::json;

use funnelscope_core::{host_of, AppConfig};

use crate::error::ScraperError;
use crate::retry::retry_with_backoff;
use crate::types::{FetchOutcome, RawDocument};

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    /// Extra wait after navigation for late-loading content (rendered
    /// backend only).
    pub settle_ms: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub backoff_base_secs: u64,
    pub render_api_url: Option<String>,
    pub render_api_token: Option<String>,
    pub proxy_url: Option<String>,
    pub screenshot_dir: Option<PathBuf>,
}

impl FetchConfig {
    #[must_use]
    pub fn from_app_config(cfg: &AppConfig) -> Self {
        Self {
            timeout_secs: cfg.fetch_timeout_secs,
            settle_ms: cfg.fetch_settle_ms,
            user_agent: cfg.fetch_user_agent.clone(),
            max_retries: cfg.fetch_max_retries,
            backoff_base_secs: cfg.fetch_retry_backoff_base_secs,
            render_api_url: cfg.render_api_url.clone(),
            render_api_token: cfg.render_api_token.clone(),
            proxy_url: cfg.proxy_url.clone(),
            screenshot_dir: cfg.screenshot_dir.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Route the fetch through the configured proxy gateway.
    pub use_proxy: bool,
}

/// Fetches raw page content for a target URL.
///
/// Failures never propagate as errors: every failure mode collapses into
/// [`FetchOutcome::Unavailable`], because fetching is optional enrichment
/// for the analysis pipeline, not a required dependency.
pub struct SourceFetcher {
    config: FetchConfig,
}

impl SourceFetcher {
    #[must_use]
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    /// Validates a caller-supplied target URL.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidUrl`] when the URL has no http(s)
    /// scheme or no resolvable host. Callers surface this as a validation
    /// error; it is the one fetch-adjacent failure that is the caller's
    /// fault rather than the network's.
    pub fn validate_target(url: &str) -> Result<(), ScraperError> {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ScraperError::InvalidUrl {
                url: url.to_string(),
                reason: "expected an http:// or https:// URL".to_string(),
            });
        }
        if host_of(url).is_none() {
            return Err(ScraperError::InvalidUrl {
                url: url.to_string(),
                reason: "URL has no host".to_string(),
            });
        }
        Ok(())
    }

    /// Fetches the target, preferring the rendered backend when a render
    /// endpoint is configured.
    pub async fn fetch(&self, url: &str, opts: FetchOptions) -> FetchOutcome {
        match self.fetch_inner(url, opts).await {
            Ok(doc) => FetchOutcome::Fetched(doc),
            Err(e) => {
                tracing::warn!(url, error = %e, "source fetch unavailable");
                FetchOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn fetch_inner(
        &self,
        url: &str,
        opts: FetchOptions,
    ) -> Result<RawDocument, ScraperError> {
        Self::validate_target(url)?;
        let client = self.build_client(opts.use_proxy)?;

        let doc = if let Some(render_url) = self.config.render_api_url.as_deref() {
            let doc = self.fetch_rendered(&client, render_url, url).await?;
            self.capture_screenshot(&client, render_url, url).await;
            doc
        } else {
            self.fetch_static(&client, url).await?
        };

        Ok(doc)
    }

    fn build_client(&self, use_proxy: bool) -> Result<Client, ScraperError> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(self.config.user_agent.clone());

        if use_proxy {
            if let Some(proxy_url) = self.config.proxy_url.as_deref() {
                builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
            } else {
                tracing::warn!("proxy requested but no proxy gateway configured; fetching direct");
            }
        }

        Ok(builder.build()?)
    }

    async fn fetch_static(&self, client: &Client, url: &str) -> Result<RawDocument, ScraperError> {
        retry_with_backoff(self.config.max_retries, self.config.backoff_base_secs, || {
            let url = url.to_string();
            async move {
                let response = client.get(&url).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ScraperError::UnexpectedStatus {
                        status: status.as_u16(),
                        url,
                    });
                }
                let html = response.text().await?;
                Ok(RawDocument {
                    source_url: url,
                    html,
                    rendered: false,
                })
            }
        })
        .await
    }

    /// Fetches post-script DOM via the render service's `/content` endpoint.
    ///
    /// Navigation is bounded by the configured timeout; `waitForTimeout`
    /// gives late-loading content a settle window before capture. The
    /// request timeout covers navigation plus settle plus a margin.
    async fn fetch_rendered(
        &self,
        client: &Client,
        render_url: &str,
        url: &str,
    ) -> Result<RawDocument, ScraperError> {
        let endpoint = self.render_endpoint(render_url, "content");
        let request_timeout = Duration::from_secs(self.config.timeout_secs)
            + Duration::from_millis(self.config.settle_ms)
            + Duration::from_secs(5);
        let body = json!({
            "url": url,
            "gotoOptions": {
                "waitUntil": "networkidle2",
                "timeout": self.config.timeout_secs * 1000,
            },
            "waitForTimeout": self.config.settle_ms,
        });

        retry_with_backoff(self.config.max_retries, self.config.backoff_base_secs, || {
            let endpoint = endpoint.clone();
            let body = body.clone();
            let url = url.to_string();
            async move {
                let response = client
                    .post(&endpoint)
                    .timeout(request_timeout)
                    .json(&body)
                    .send()
                    .await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(ScraperError::RenderApi {
                        status: status.as_u16(),
                        url,
                    });
                }
                let html = response.text().await?;
                Ok(RawDocument {
                    source_url: url,
                    html,
                    rendered: true,
                })
            }
        })
        .await
    }

    /// Best-effort diagnostic screenshot. Every failure here is logged and
    /// ignored; screenshots never affect the fetch outcome.
    async fn capture_screenshot(&self, client: &Client, render_url: &str, url: &str) {
        let Some(dir) = self.config.screenshot_dir.as_ref() else {
            return;
        };

        let endpoint = self.render_endpoint(render_url, "screenshot");
        let body = json!({ "url": url, "options": { "type": "png", "fullPage": false } });

        let response = match client.post(&endpoint).json(&body).send().await {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::debug!(url, status = r.status().as_u16(), "screenshot skipped");
                return;
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "screenshot skipped");
                return;
            }
        };

        let bytes = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                tracing::debug!(url, error = %e, "screenshot body read failed");
                return;
            }
        };

        let host = host_of(url).unwrap_or_else(|| "target".to_string());
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S");
        let path = dir.join(format!("{host}-{stamp}.png"));

        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            tracing::debug!(dir = %dir.display(), error = %e, "screenshot dir create failed");
            return;
        }
        if let Err(e) = tokio::fs::write(&path, &bytes).await {
            tracing::debug!(path = %path.display(), error = %e, "screenshot write failed");
        } else {
            tracing::debug!(path = %path.display(), "diagnostic screenshot written");
        }
    }

    fn render_endpoint(&self, render_url: &str, op: &str) -> String {
        let base = render_url.trim_end_matches('/');
        match self.config.render_api_token.as_deref() {
            Some(token) => format!("{base}/{op}?token={token}"),
            None => format!("{base}/{op}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_target_accepts_https() {
        assert!(SourceFetcher::validate_target("https://example.co.uk/pricing").is_ok());
    }

    #[test]
    fn validate_target_rejects_missing_scheme() {
        let err = SourceFetcher::validate_target("example.com").unwrap_err();
        assert!(matches!(err, ScraperError::InvalidUrl { .. }));
    }

    #[test]
    fn validate_target_rejects_hostless_url() {
        let err = SourceFetcher::validate_target("https:///nothing").unwrap_err();
        assert!(matches!(err, ScraperError::InvalidUrl { .. }));
    }

    #[test]
    fn render_endpoint_appends_token_when_present() {
        let fetcher = SourceFetcher::new(FetchConfig {
            timeout_secs: 30,
            settle_ms: 2500,
            user_agent: "test".to_string(),
            max_retries: 0,
            backoff_base_secs: 0,
            render_api_url: Some("http://render:3030/".to_string()),
            render_api_token: Some("secret".to_string()),
            proxy_url: None,
            screenshot_dir: None,
        });
        assert_eq!(
            fetcher.render_endpoint("http://render:3030/", "content"),
            "http://render:3030/content?token=secret"
        );
    }
}
