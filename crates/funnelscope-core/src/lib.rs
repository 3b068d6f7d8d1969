//! Shared domain types and configuration for Funnelscope.

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod app_config;
mod config;
mod rules;

pub use app_config::{AppConfig, Environment, ProviderKind};
pub use config::{load_app_config, load_app_config_from_env};
pub use rules::{AnswerRule, ScoreBases, ScoreCaps, Treatment, WeightedRules};

/// Currency detected for a scraped source and carried through to the
/// generated offer copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Gbp,
    Usd,
    Eur,
}

impl Currency {
    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Currency::Gbp => '£',
            Currency::Usd => '$',
            Currency::Eur => '€',
        }
    }

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    /// Currency suggested by the host's top-level domain. `None` when the
    /// TLD carries no signal (e.g. `.com`).
    #[must_use]
    pub fn from_domain_hint(host: &str) -> Option<Self> {
        let host = host.to_lowercase();
        if host.ends_with(".uk") {
            return Some(Currency::Gbp);
        }
        for tld in [".eu", ".de", ".fr", ".es", ".it", ".ie", ".nl"] {
            if host.ends_with(tld) {
                return Some(Currency::Eur);
            }
        }
        None
    }

    /// Best-effort currency for a raw URL, used when a fetch produced no
    /// body to inspect. Falls back to USD.
    #[must_use]
    pub fn from_url(url: &str) -> Self {
        host_of(url)
            .and_then(|h| Self::from_domain_hint(&h))
            .unwrap_or(Currency::Usd)
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Extracts the host portion of a URL without pulling in a URL crate.
///
/// Strips the scheme and takes up to the first `/`, `?`, or `:`.
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    let without_scheme = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    let host = without_scheme
        .split(['/', '?'])
        .next()?
        .split(':')
        .next()?
        .trim();
    if host.is_empty() || !host.contains('.') {
        None
    } else {
        Some(host.to_lowercase())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read rules file {path}: {source}")]
    RulesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules file: {0}")]
    RulesFileParse(#[from] serde_yaml::Error),

    #[error("rules validation failed: {0}")]
    Validation(String),
}
