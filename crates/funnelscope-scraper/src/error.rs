use thiserror::Error;

/// Internal fetch errors. These never cross the public [`crate::fetch`]
/// boundary — [`crate::SourceFetcher::fetch`] converts them into
/// [`crate::FetchOutcome::Unavailable`].
#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("render service returned status {status} for {url}")]
    RenderApi { status: u16, url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid target URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}
