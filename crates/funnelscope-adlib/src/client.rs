//! HTTP client for the ad-transparency REST API.
//!
//! Wraps `reqwest` with typed error handling and API token management. The
//! archive endpoint is queried either by page id (exact) or by search term
//! (fuzzy); [`AdLibraryClient::search`] falls back from the former to the
//! latter when no page id is on file or the exact lookup returns nothing.

use std::time::Duration;

use reqwest::Client;

use crate::error::AdLibraryError;
use crate::types::{AdRecord, AdSearchEnvelope, AdTarget};

const ARCHIVE_PATH: &str = "ads_archive";
const FIELDS: &str = "page_name,ad_creative_bodies,ad_delivery_start_time,media_type,cta_type";

pub struct AdLibraryClient {
    client: Client,
    access_token: String,
    base_url: String,
}

impl AdLibraryClient {
    /// Creates a client for the given archive base URL.
    ///
    /// # Errors
    ///
    /// Returns [`AdLibraryError::MissingAccessToken`] when `access_token`
    /// is empty, or [`AdLibraryError::Http`] if the underlying
    /// `reqwest::Client` cannot be constructed.
    pub fn new(
        base_url: &str,
        access_token: &str,
        timeout_secs: u64,
    ) -> Result<Self, AdLibraryError> {
        if access_token.is_empty() {
            return Err(AdLibraryError::MissingAccessToken);
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("funnelscope/0.1 (ad-intelligence)")
            .build()?;
        Ok(Self {
            client,
            access_token: access_token.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Searches the archive for a target, preferring the exact page-id
    /// lookup and falling back to a fuzzy name search.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying lookups; an empty result set
    /// is not an error.
    pub async fn search(
        &self,
        target: &AdTarget,
        limit: u32,
    ) -> Result<Vec<AdRecord>, AdLibraryError> {
        if let Some(page_id) = target.page_id.as_deref() {
            let ads = self.search_by_page_id(page_id, &target.name, limit).await?;
            if !ads.is_empty() {
                return Ok(ads);
            }
            tracing::debug!(
                page_id,
                name = %target.name,
                "page-id lookup returned nothing; falling back to name search"
            );
        }
        self.search_by_name(&target.name, limit).await
    }

    /// Exact lookup by ad-library page identifier.
    ///
    /// # Errors
    ///
    /// - [`AdLibraryError::ApiError`] if the response envelope carries an error.
    /// - [`AdLibraryError::Http`] on network failure or non-2xx status.
    /// - [`AdLibraryError::Deserialize`] on an unexpected response shape.
    pub async fn search_by_page_id(
        &self,
        page_id: &str,
        fallback_name: &str,
        limit: u32,
    ) -> Result<Vec<AdRecord>, AdLibraryError> {
        let url = self.build_url(&[
            ("search_page_ids", page_id),
            ("limit", &limit.to_string()),
        ]);
        self.request_ads(&url, fallback_name, format!("page_id={page_id}"))
            .await
    }

    /// Fuzzy search by business name.
    ///
    /// # Errors
    ///
    /// Same error surface as [`Self::search_by_page_id`].
    pub async fn search_by_name(
        &self,
        name: &str,
        limit: u32,
    ) -> Result<Vec<AdRecord>, AdLibraryError> {
        let url = self.build_url(&[("search_terms", name), ("limit", &limit.to_string())]);
        self.request_ads(&url, name, format!("name={name}")).await
    }

    async fn request_ads(
        &self,
        url: &str,
        fallback_name: &str,
        context: String,
    ) -> Result<Vec<AdRecord>, AdLibraryError> {
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;

        let value: serde_json::Value =
            serde_json::from_str(&body).map_err(|e| AdLibraryError::Deserialize {
                context: context.clone(),
                source: e,
            })?;
        Self::check_api_error(&value)?;

        let envelope: AdSearchEnvelope =
            serde_json::from_value(value).map_err(|e| AdLibraryError::Deserialize {
                context,
                source: e,
            })?;

        Ok(envelope
            .data
            .into_iter()
            .map(|raw| raw.normalize(fallback_name))
            .collect())
    }

    /// Builds the archive query URL with percent-encoded parameters.
    fn build_url(&self, extra: &[(&str, &str)]) -> String {
        let mut pairs = vec![
            ("access_token", self.access_token.as_str()),
            ("fields", FIELDS),
        ];
        pairs.extend_from_slice(extra);

        let query = pairs
            .iter()
            .map(|(k, v)| format!("{k}={}", urlencode(v)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}/{ARCHIVE_PATH}?{query}", self.base_url)
    }

    /// Checks the envelope's `"error"` object and surfaces its message.
    fn check_api_error(body: &serde_json::Value) -> Result<(), AdLibraryError> {
        if let Some(error) = body.get("error") {
            let msg = error
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(AdLibraryError::ApiError(msg));
        }
        Ok(())
    }
}

/// Minimal query-string percent encoding: spaces and the reserved
/// characters that can appear in business names.
fn urlencode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
