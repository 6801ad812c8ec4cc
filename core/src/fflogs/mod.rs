//! FFLogs v2 API access
//!
//! - **client**: token requests, GraphQL transport, retry with backoff
//! - **queries**: GraphQL documents and response shapes
//! - **fetcher**: report listing and per-report attempt fetching behind the response cache
//! - **abilities**: id→name ability catalog

mod abilities;
mod client;
mod error;
mod fetcher;
pub mod queries;

#[cfg(test)]
mod fetcher_tests;

pub use abilities::AbilityCatalog;
pub use client::{FflogsClient, RetryPolicy};
pub use error::FetchError;
pub use fetcher::{FetchOptions, ReportFetcher, build_attempt, report_cache_key};
