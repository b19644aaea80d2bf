//! Loading one logical page of birds.
//!
//! A logical page may be assembled from several catalog pages. All of them
//! are requested at once and merged in page order; if any request fails the
//! whole load fails, so a page is never shown with a partial bird list.

use std::num::{NonZeroU32, NonZeroUsize};

use futures::future::join_all;
use nuthatch_catalog::types::DEFAULT_PAGE_SIZE;
use nuthatch_catalog::{BirdSummary, ClientTrait, Operator, PageQuery, RequestOutcome};
use tracing::{debug, instrument};

/// Query parameters shared by every page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub page_size: NonZeroU32,
    pub region: Option<String>,
    pub has_image: Option<bool>,
    pub operator: Operator,
    /// Number of catalog pages merged into one logical page.
    pub source_pages_per_view: NonZeroU32,
    /// Keep at most this many birds of a merged page.
    pub preview_limit: Option<NonZeroUsize>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            region: None,
            has_image: None,
            operator: Operator::default(),
            source_pages_per_view: NonZeroU32::MIN,
            preview_limit: None,
        }
    }
}

#[derive(Debug)]
pub struct CollectionFetcher<C> {
    client: C,
    config: FetcherConfig,
}

impl<C: ClientTrait> CollectionFetcher<C> {
    pub fn new(client: C, config: FetcherConfig) -> Self {
        Self { client, config }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Catalog pages backing the logical page `page`, in request order.
    pub fn source_pages(&self, page: NonZeroU32) -> Vec<NonZeroU32> {
        let per_view = self.config.source_pages_per_view.get();
        let last = page.get().saturating_mul(per_view);
        let first = last - (per_view - 1);
        (first..=last).filter_map(NonZeroU32::new).collect()
    }

    fn query(&self, page: NonZeroU32) -> PageQuery {
        PageQuery {
            page,
            page_size: self.config.page_size,
            region: self.config.region.clone(),
            has_image: self.config.has_image,
            operator: self.config.operator,
        }
    }

    /// Load the logical page `page`.
    ///
    /// On failure, the error of the earliest failed request (in page order)
    /// is returned.
    #[instrument(skip_all, fields(page = %page))]
    pub async fn load_page(&self, page: NonZeroU32) -> RequestOutcome<Vec<BirdSummary>> {
        let queries = self
            .source_pages(page)
            .into_iter()
            .map(|source_page| self.query(source_page))
            .collect::<Vec<_>>();
        debug!(n_requests = queries.len(), "loading page");

        // join_all yields outcomes in request order regardless of completion order
        let outcomes = join_all(queries.iter().map(|query| self.client.fetch_page(query))).await;

        let mut birds = Vec::new();
        for outcome in outcomes {
            birds.extend(outcome?);
        }

        if let Some(limit) = self.config.preview_limit {
            birds.truncate(limit.get());
        }

        debug!(n_birds = birds.len(), "loaded page");
        Ok(birds)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use nuthatch_catalog::{BirdDetail, BirdId, FailureReason, FetchError, MockClient, MockRequest};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::facets::tests::bird;

    fn page(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn ids(birds: &[BirdSummary]) -> Vec<&str> {
        birds.iter().map(|bird| bird.id.as_str()).collect()
    }

    /// Answers page `n` after a delay that shrinks as `n` grows,
    /// so later pages complete first.
    struct ReversedLatencyClient;

    impl ClientTrait for ReversedLatencyClient {
        async fn fetch_page(&self, query: &PageQuery) -> RequestOutcome<Vec<BirdSummary>> {
            let n = query.page.get();
            tokio::time::sleep(Duration::from_millis(100 - u64::from(n) * 10)).await;
            if n == 5 || n == 6 {
                return Err(FetchError::MalformedPayload(format!("page {n}")));
            }
            Ok(vec![bird(&n.to_string(), Some("LC"))])
        }

        async fn fetch_by_id(&self, _id: &BirdId) -> RequestOutcome<BirdDetail> {
            unreachable!("fetcher never looks up single birds")
        }
    }

    #[tokio::test]
    async fn single_source_page_passes_query_through() {
        let client = MockClient::default();
        client.push_page_response(vec![bird("1", Some("LC"))]);

        let config = FetcherConfig {
            region: Some("North America".to_string()),
            has_image: Some(true),
            ..Default::default()
        };
        let fetcher = CollectionFetcher::new(client.clone(), config);
        let birds = fetcher.load_page(page(3)).await.unwrap();

        assert_eq!(ids(&birds), vec!["1"]);
        assert_eq!(client.requests(), vec![MockRequest::Page(PageQuery {
            page: page(3),
            page_size: DEFAULT_PAGE_SIZE,
            region: Some("North America".to_string()),
            has_image: Some(true),
            operator: Operator::And,
        })]);
    }

    #[test]
    fn source_pages_for_logical_page() {
        let config = FetcherConfig {
            source_pages_per_view: page(3),
            ..Default::default()
        };
        let fetcher = CollectionFetcher::new(MockClient::default(), config);

        assert_eq!(fetcher.source_pages(page(1)), vec![page(1), page(2), page(3)]);
        assert_eq!(fetcher.source_pages(page(2)), vec![page(4), page(5), page(6)]);
    }

    #[tokio::test(start_paused = true)]
    async fn merge_follows_request_order_not_completion_order() {
        let config = FetcherConfig {
            source_pages_per_view: page(3),
            ..Default::default()
        };
        let fetcher = CollectionFetcher::new(ReversedLatencyClient, config);

        let birds = fetcher.load_page(page(1)).await.unwrap();
        assert_eq!(ids(&birds), vec!["1", "2", "3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn any_failure_fails_the_whole_page() {
        let config = FetcherConfig {
            source_pages_per_view: page(3),
            ..Default::default()
        };
        let fetcher = CollectionFetcher::new(ReversedLatencyClient, config);

        // pages 4, 5, 6; 6 fails first in time but 5 comes first in request order
        let err = fetcher.load_page(page(2)).await.unwrap_err();
        assert!(
            matches!(&err, FetchError::MalformedPayload(detail) if detail == "page 5"),
            "expected failure of page 5, found: {err:?}"
        );
    }

    #[tokio::test]
    async fn failure_reason_is_preserved() {
        let client = MockClient::default();
        client.push_page_response(vec![bird("1", None)]);
        client.push_error_response(500);

        let config = FetcherConfig {
            source_pages_per_view: page(2),
            ..Default::default()
        };
        let fetcher = CollectionFetcher::new(client, config);
        let err = fetcher.load_page(page(1)).await.unwrap_err();

        assert_eq!(err.reason(), FailureReason::BadStatus(500));
    }

    #[tokio::test]
    async fn preview_limit_truncates_merged_page() {
        let client = MockClient::default();
        client.push_page_response((1..=4).map(|i| bird(&i.to_string(), None)).collect());
        client.push_page_response((5..=8).map(|i| bird(&i.to_string(), None)).collect());

        let config = FetcherConfig {
            source_pages_per_view: page(2),
            preview_limit: NonZeroUsize::new(5),
            ..Default::default()
        };
        let fetcher = CollectionFetcher::new(client, config);
        let birds = fetcher.load_page(page(1)).await.unwrap();

        assert_eq!(ids(&birds), vec!["1", "2", "3", "4", "5"]);
    }
}
