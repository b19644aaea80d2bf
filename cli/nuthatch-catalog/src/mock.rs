//! Canned-response catalog client.
//!
//! [MockClient] answers requests from a queue of [MockResponse]s instead of
//! talking to the network. Responses can be pushed from tests or read from a
//! JSON file, which is how the CLI runs against recorded data.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::client::ClientTrait;
use crate::error::{FetchError, RequestOutcome};
use crate::types::{BirdDetail, BirdId, BirdSummary, PageQuery};

/// Path to a JSON file of [MockResponse]s to serve instead of the catalog.
pub const BIRDVIEW_CATALOG_MOCK_DATA_VAR: &str = "_BIRDVIEW_USE_CATALOG_MOCK";

// Arc allows pushing responses from outside the client after it was handed off
type MockField<T> = Arc<Mutex<T>>;

/// A single canned response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MockResponse {
    Page { entities: Vec<BirdSummary> },
    Detail { bird: BirdDetail },
    Error { status: u16 },
    Malformed,
    NetworkError,
}

/// A request received by a [MockClient].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockRequest {
    Page(PageQuery),
    Detail(BirdId),
}

#[derive(Debug, Error)]
pub enum MockDataError {
    /// Failed to read the JSON file pointed at by the mock data variable
    #[error("failed to read mock response file")]
    ReadMockFile(#[source] std::io::Error),
    /// Failed to parse the contents of the mock data file as JSON
    #[error("failed to parse mock data as JSON")]
    ParseJson(#[source] serde_json::Error),
    /// The data was parsed as JSON but it wasn't semantically valid
    #[error("invalid mocked data: {0}")]
    InvalidData(String),
}

/// Reads a list of mock responses from disk.
fn read_mock_responses(path: impl AsRef<Path>) -> Result<VecDeque<MockResponse>, MockDataError> {
    let contents = std::fs::read_to_string(path).map_err(MockDataError::ReadMockFile)?;
    let responses: Vec<MockResponse> =
        serde_json::from_str(&contents).map_err(MockDataError::ParseJson)?;

    for response in &responses {
        if let MockResponse::Error { status } = response {
            StatusCode::from_u16(*status).map_err(|_| {
                MockDataError::InvalidData(format!("invalid status code {status}"))
            })?;
        }
    }

    Ok(responses.into())
}

/// A catalog client that can be seeded with mock responses.
///
/// Clones share the same response queue and request log.
#[derive(Debug, Default, Clone)]
pub struct MockClient {
    pub mock_responses: MockField<VecDeque<MockResponse>>,
    requests: MockField<Vec<MockRequest>>,
}

impl MockClient {
    /// Create a new mock client, potentially reading mock responses from disk
    pub fn new(mock_data_path: Option<impl AsRef<Path>>) -> Result<Self, MockDataError> {
        let mock_responses = match mock_data_path {
            Some(path) => read_mock_responses(path)?,
            None => VecDeque::new(),
        };
        Ok(Self {
            mock_responses: Arc::new(Mutex::new(mock_responses)),
            requests: Default::default(),
        })
    }

    /// Push a new response into the list of mock responses
    pub fn push_page_response(&self, entities: Vec<BirdSummary>) {
        self.push(MockResponse::Page { entities });
    }

    /// Push a new response into the list of mock responses
    pub fn push_detail_response(&self, bird: BirdDetail) {
        self.push(MockResponse::Detail { bird });
    }

    /// Push an HTTP error status into the list of mock responses
    pub fn push_error_response(&self, status: u16) {
        self.push(MockResponse::Error { status });
    }

    pub fn push_malformed_response(&self) {
        self.push(MockResponse::Malformed);
    }

    pub fn push_network_error(&self) {
        self.push(MockResponse::NetworkError);
    }

    pub fn push(&self, response: MockResponse) {
        lock(&self.mock_responses).push_back(response);
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<MockRequest> {
        lock(&self.requests).clone()
    }

    fn next_response(&self, request: MockRequest) -> Option<MockResponse> {
        debug!(?request, "mock client received request");
        lock(&self.requests).push(request);
        lock(&self.mock_responses).pop_front()
    }
}

fn lock<T>(field: &Mutex<T>) -> MutexGuard<'_, T> {
    field.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Map the responses every request kind shares.
fn common_failure(response: Option<MockResponse>, expected: &str) -> FetchError {
    match response {
        None => FetchError::network(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "no mock response queued",
        )),
        Some(MockResponse::NetworkError) => FetchError::network(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "mocked network error",
        )),
        Some(MockResponse::Error { status }) => FetchError::BadStatus(
            StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        ),
        Some(MockResponse::Malformed) => {
            FetchError::MalformedPayload("mocked malformed payload".to_string())
        },
        Some(other) => FetchError::MalformedPayload(format!(
            "expected {expected} response, found {other:?}"
        )),
    }
}

impl ClientTrait for MockClient {
    async fn fetch_page(&self, query: &PageQuery) -> RequestOutcome<Vec<BirdSummary>> {
        match self.next_response(MockRequest::Page(query.clone())) {
            Some(MockResponse::Page { entities }) => Ok(entities),
            other => Err(common_failure(other, "page")),
        }
    }

    async fn fetch_by_id(&self, id: &BirdId) -> RequestOutcome<BirdDetail> {
        match self.next_response(MockRequest::Detail(id.clone())) {
            Some(MockResponse::Detail { bird }) => Ok(bird),
            other => Err(common_failure(other, "detail")),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::FailureReason;

    fn bird(id: &str, name: &str) -> BirdSummary {
        BirdSummary {
            id: BirdId::parse(id).unwrap(),
            name: name.to_string(),
            scientific_name: None,
            conservation_status: Some("Low Concern".to_string()),
            images: vec![],
        }
    }

    #[tokio::test]
    async fn responses_are_served_in_order() {
        let client = MockClient::default();
        client.push_page_response(vec![bird("1", "Robin")]);
        client.push_error_response(503);

        let first = client.fetch_page(&PageQuery::default()).await.unwrap();
        assert_eq!(first, vec![bird("1", "Robin")]);

        let second = client.fetch_page(&PageQuery::default()).await;
        assert_eq!(second.unwrap_err().reason(), FailureReason::BadStatus(503));

        assert_eq!(client.requests(), vec![
            MockRequest::Page(PageQuery::default()),
            MockRequest::Page(PageQuery::default()),
        ]);
    }

    #[tokio::test]
    async fn empty_queue_is_a_network_error() {
        let client = MockClient::default();
        let result = client.fetch_by_id(&BirdId::parse("1").unwrap()).await;
        assert_eq!(result.unwrap_err().reason(), FailureReason::NetworkError);
    }

    #[tokio::test]
    async fn mismatched_response_is_malformed() {
        let client = MockClient::default();
        client.push_page_response(vec![]);
        let result = client.fetch_by_id(&BirdId::parse("1").unwrap()).await;
        assert_eq!(result.unwrap_err().reason(), FailureReason::MalformedPayload);
    }

    #[tokio::test]
    async fn reads_responses_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[
            {{ "kind": "page", "entities": [ {{ "id": 1, "name": "Robin", "status": "LC" }} ] }},
            {{ "kind": "network_error" }}
        ]"#)
        .unwrap();

        let client = MockClient::new(Some(file.path())).unwrap();
        let page = client.fetch_page(&PageQuery::default()).await.unwrap();
        assert_eq!(page[0].name, "Robin");
        assert_eq!(page[0].conservation_status.as_deref(), Some("LC"));

        let failure = client.fetch_page(&PageQuery::default()).await.unwrap_err();
        assert_eq!(failure.reason(), FailureReason::NetworkError);
    }

    #[test]
    fn rejects_invalid_status_in_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[ {{ "kind": "error", "status": 1000 }} ]"#).unwrap();

        let result = MockClient::new(Some(file.path()));
        assert!(matches!(result, Err(MockDataError::InvalidData(_))));
    }

    #[tokio::test]
    async fn demo_data_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../demos/mock-catalog.json");
        let client = MockClient::new(Some(path)).unwrap();

        let page = client.fetch_page(&PageQuery::default()).await.unwrap();
        assert_eq!(page.len(), 3);
        assert!(page[2].images.is_empty());

        let crane = client.fetch_by_id(&BirdId::parse("2").unwrap()).await.unwrap();
        assert_eq!(crane.wingspan_min, Some(200.0));
        assert_eq!(crane.family.as_deref(), Some("Gruidae"));

        let failure = client.fetch_page(&PageQuery::default()).await.unwrap_err();
        assert_eq!(failure.reason(), FailureReason::BadStatus(503));
    }
}
