//! Typed client for the ad-transparency library.
//!
//! The library is an external REST collaborator: given a business name or
//! an opaque page identifier plus a limit, it returns a sequence of raw ad
//! records. Envelope-level API errors are surfaced as typed errors; the
//! caller decides whether they are fatal.

pub mod client;
pub mod error;
pub mod types;

pub use client::AdLibraryClient;
pub use error::AdLibraryError;
pub use types::{AdRecord, AdTarget};
