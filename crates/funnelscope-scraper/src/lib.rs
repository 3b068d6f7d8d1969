//! Source fetching and marketing-signal extraction.
//!
//! Fetches raw HTML for a target URL (static HTTP or a rendered-DOM backend
//! behind a render service) and extracts typed signals — prices, headlines,
//! guarantees, urgency phrases, CTAs, testimonials — with deterministic
//! text heuristics. Fetching is optional enrichment: failures degrade to an
//! explicit "unavailable" outcome, never an error to the caller.

pub mod error;
pub mod extract;
pub mod fetch;
pub mod keywords;
pub mod types;

mod retry;

pub use error::ScraperError;
pub use extract::{extract, extract_price_tokens};
pub use fetch::{FetchConfig, FetchOptions, SourceFetcher};
pub use types::{FetchOutcome, RawDocument, ScrapedSignals};
