//! Catalog client issuing HTTP requests against the bird catalog.

use std::fmt::Debug;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use reqwest::header::{self, HeaderMap};
use serde_json::Value;
use tracing::{debug, instrument};
use url::Url;

use crate::config::CatalogClientConfig;
use crate::error::{CatalogClientError, FetchError, RequestOutcome};
use crate::mock::MockClient;
use crate::types::{BirdDetail, BirdId, BirdSummary, PageQuery};

const API_KEY_HEADER: &str = "api-key";
const BIRDS_PATH: &str = "birds";
const ENTITIES_FIELD: &str = "entities";

/// A client for the catalog service.
///
/// Handles:
/// - HTTP client configuration with timeouts
/// - `api-key` authentication
/// - mapping responses onto [RequestOutcome]s
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
    config: CatalogClientConfig,
}

impl Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("catalog_url", &self.config.catalog_url)
            .finish_non_exhaustive()
    }
}

impl CatalogClient {
    /// Create a new catalog client from configuration.
    pub fn new(config: CatalogClientConfig) -> Result<Self, CatalogClientError> {
        let base_url =
            Url::parse(&config.catalog_url).map_err(|source| CatalogClientError::InvalidUrl {
                url: config.catalog_url.clone(),
                source,
            })?;
        if base_url.cannot_be_a_base() {
            return Err(CatalogClientError::NotABaseUrl(config.catalog_url.clone()));
        }

        let client = build_http_client(&config)?;

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    /// Get the configured catalog URL.
    pub fn catalog_url(&self) -> &str {
        &self.config.catalog_url
    }

    /// Append path segments to the base url, escaping each segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects urls that cannot be a base, so this always succeeds
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a GET request and decode the body as JSON.
    async fn get_json(&self, request: reqwest::RequestBuilder) -> RequestOutcome<Value> {
        let response = request.send().await.map_err(FetchError::network)?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "catalog request failed");
            return Err(FetchError::BadStatus(status));
        }

        let body = response.bytes().await.map_err(FetchError::network)?;
        serde_json::from_slice(&body)
            .map_err(|e| FetchError::MalformedPayload(format!("response is not valid JSON: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Catalog trait
// ---------------------------------------------------------------------------

/// The catalog API interface.
///
/// This trait enables alternate implementations:
/// - **HTTP**: REST calls to the bird catalog via [`CatalogClient`]
/// - **Mock**: canned responses without HTTP via [`MockClient`]
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// Fetch one page of bird summaries.
    async fn fetch_page(&self, query: &PageQuery) -> RequestOutcome<Vec<BirdSummary>>;

    /// Fetch the full record of a single bird.
    async fn fetch_by_id(&self, id: &BirdId) -> RequestOutcome<BirdDetail>;
}

/// Either a client for the actual catalog service,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Catalog(CatalogClient),
    Mock(MockClient),
}

// ---------------------------------------------------------------------------
// ClientTrait implementation for CatalogClient
// ---------------------------------------------------------------------------

impl ClientTrait for CatalogClient {
    #[instrument(skip_all, fields(page = %query.page, page_size = %query.page_size))]
    async fn fetch_page(&self, query: &PageQuery) -> RequestOutcome<Vec<BirdSummary>> {
        debug!(?query, "sending page request");
        let request = self
            .client
            .get(self.endpoint(&[BIRDS_PATH]))
            .query(&query.to_query_pairs());

        let body = self.get_json(request).await?;
        let birds = parse_entities(body)?;

        debug!(n_birds = birds.len(), "received page");
        Ok(birds)
    }

    #[instrument(skip_all, fields(id = %id))]
    async fn fetch_by_id(&self, id: &BirdId) -> RequestOutcome<BirdDetail> {
        debug!("sending detail request");
        let request = self
            .client
            .get(self.endpoint(&[BIRDS_PATH, id.as_str()]));

        let body = self.get_json(request).await?;
        parse_detail(body)
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

/// Extract the bird list from a `{ "entities": [...] }` document.
fn parse_entities(body: Value) -> RequestOutcome<Vec<BirdSummary>> {
    let Value::Object(mut document) = body else {
        return Err(FetchError::MalformedPayload(
            "expected a JSON object".to_string(),
        ));
    };

    let entities = document.remove(ENTITIES_FIELD).ok_or_else(|| {
        FetchError::MalformedPayload(format!("missing '{ENTITIES_FIELD}' field"))
    })?;
    if !entities.is_array() {
        return Err(FetchError::MalformedPayload(format!(
            "'{ENTITIES_FIELD}' is not an array"
        )));
    }

    serde_json::from_value(entities)
        .map_err(|e| FetchError::MalformedPayload(format!("invalid bird entry: {e}")))
}

fn parse_detail(body: Value) -> RequestOutcome<BirdDetail> {
    if !body.is_object() {
        return Err(FetchError::MalformedPayload(
            "expected a JSON object".to_string(),
        ));
    }
    serde_json::from_value(body)
        .map_err(|e| FetchError::MalformedPayload(format!("invalid bird record: {e}")))
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

/// Build HTTP client with `api-key` auth for the catalog API.
fn build_http_client(config: &CatalogClientConfig) -> Result<reqwest::Client, CatalogClientError> {
    let mut headers = HeaderMap::new();

    if let Some(api_key) = &config.api_key {
        let mut value = header::HeaderValue::from_str(api_key.expose()).map_err(|e| {
            CatalogClientError::InvalidHeader {
                name: API_KEY_HEADER.to_string(),
                reason: e.to_string(),
            }
        })?;
        value.set_sensitive(true);
        headers.insert(header::HeaderName::from_static(API_KEY_HEADER), value);
    }

    for (key, value) in &config.extra_headers {
        let invalid = |reason: String| CatalogClientError::InvalidHeader {
            name: key.clone(),
            reason,
        };
        headers.insert(
            header::HeaderName::from_str(key).map_err(|e| invalid(e.to_string()))?,
            header::HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?,
        );
    }

    debug!(
        catalog_url = %config.catalog_url,
        has_api_key = config.api_key.is_some(),
        extra_headers = config.extra_headers.len(),
        "building catalog HTTP client"
    );

    let client_builder = reqwest::Client::builder()
        .default_headers(headers)
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout);

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(CatalogClientError::BuildClient)
}
