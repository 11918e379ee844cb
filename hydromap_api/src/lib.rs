//! HTTP client for the hydrogen infrastructure API.
//!
//! Wraps the read feeds, the analytics summary and the weighted analysis
//! trigger. Responses come back as [`hydromap_core::Fetched`] payloads ready
//! to be handed to the store with the ticket that requested them.

mod client;
mod error;
mod query;

pub use client::ApiClient;
pub use error::ApiError;
pub use query::{AssetQuery, FetchParams};
