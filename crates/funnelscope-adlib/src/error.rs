use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdLibraryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("ad library API error: {0}")]
    ApiError(String),

    #[error("ad library access token is not configured")]
    MissingAccessToken,
}
