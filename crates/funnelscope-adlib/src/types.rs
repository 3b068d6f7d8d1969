use serde::{Deserialize, Serialize};

/// Search target: an opaque page identifier when one is on file (exact
/// lookup), always a business name (fuzzy fallback).
#[derive(Debug, Clone)]
pub struct AdTarget {
    pub page_id: Option<String>,
    pub name: String,
}

impl AdTarget {
    #[must_use]
    pub fn by_name(name: &str) -> Self {
        Self {
            page_id: None,
            name: name.to_string(),
        }
    }

    #[must_use]
    pub fn by_page_id(page_id: &str, name: &str) -> Self {
        Self {
            page_id: Some(page_id.to_string()),
            name: name.to_string(),
        }
    }
}

/// A normalized ad record.
#[derive(Debug, Clone, Serialize)]
pub struct AdRecord {
    pub advertiser_name: String,
    pub ad_text: String,
    pub has_video: bool,
    pub started_at: Option<String>,
    pub cta_label: Option<String>,
}

/// Raw wire shape of one ad in the library's response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct RawAd {
    pub page_name: Option<String>,
    #[serde(default)]
    pub ad_creative_bodies: Vec<String>,
    pub ad_delivery_start_time: Option<String>,
    pub media_type: Option<String>,
    pub cta_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdSearchEnvelope {
    #[serde(default)]
    pub data: Vec<RawAd>,
}

impl RawAd {
    pub(crate) fn normalize(self, fallback_name: &str) -> AdRecord {
        AdRecord {
            advertiser_name: self
                .page_name
                .unwrap_or_else(|| fallback_name.to_string()),
            ad_text: self.ad_creative_bodies.join(" "),
            has_video: self
                .media_type
                .as_deref()
                .is_some_and(|m| m.eq_ignore_ascii_case("video")),
            started_at: self.ad_delivery_start_time,
            cta_label: self.cta_type,
        }
    }
}
