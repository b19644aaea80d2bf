//! HTTP client for the Nuthatch bird catalog API.
//!
//! This crate provides:
//! - HTTP client construction with `api-key` authentication and timeouts
//! - Classification of request failures into network, status and payload errors
//! - A mock client with canned responses for tests and offline use
//! - The bird domain types shared by consumers
//!
//! ## Usage
//!
//! ```ignore
//! use nuthatch_catalog::{ApiKey, CatalogClient, CatalogClientConfig, ClientTrait, PageQuery};
//!
//! let config = CatalogClientConfig {
//!     api_key: Some(ApiKey::new(key)),
//!     ..CatalogClientConfig::default()
//! };
//!
//! let client = CatalogClient::new(config)?;
//! let birds = client.fetch_page(&PageQuery::default()).await?;
//! ```

mod client;
mod config;
mod error;
mod mock;
pub mod types;

// Public exports
pub use client::{CatalogClient, Client, ClientTrait};
pub use config::{ApiKey, CatalogClientConfig, DEFAULT_CATALOG_URL};
pub use error::{CatalogClientError, FailureReason, FetchError, RequestOutcome};
pub use mock::{BIRDVIEW_CATALOG_MOCK_DATA_VAR, MockClient, MockDataError, MockRequest, MockResponse};
pub use types::{BirdDetail, BirdId, BirdSummary, Operator, PageQuery};
