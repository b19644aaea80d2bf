//! The view-state controller.
//!
//! [ViewController] owns the [AppState] and exposes one method per user
//! intent. Every method leaves the state consistent, and failures never
//! escape: they end up in [AppState::error_message].
//!
//! Page loads and id searches may overlap, e.g. when the user pages quickly.
//! Each kind of request has a slot holding a monotonically increasing
//! sequence number. A result is only committed if its request is still the
//! latest one issued for its slot; superseded results are dropped, so the
//! last issued request always wins.
//!
//! The state lives behind a mutex that is never held across an await, so
//! methods take `&self` and overlapping intents interleave only while
//! waiting on the network.

use std::num::NonZeroU32;
use std::sync::{Mutex, MutexGuard, PoisonError};

use nuthatch_catalog::{BirdDetail, BirdId, BirdSummary, ClientTrait, FailureReason};
use tracing::{debug, instrument, warn};

use crate::facets::FacetSet;
use crate::fetcher::CollectionFetcher;
use crate::state::AppState;

/// Shown when a page cannot be loaded.
pub const PAGE_LOAD_FAILED: &str = "Failed to fetch bird data. Please try again later.";
/// Shown when a bird cannot be looked up.
pub const SEARCH_FAILED: &str = "Failed to fetch bird details. Please try again later.";

#[derive(Debug, Clone, Copy)]
enum Slot {
    Page,
    Search,
}

#[derive(Debug, Default)]
struct RequestSlot {
    /// Sequence number of the latest issued request.
    issued: u64,
    /// Sequence number of the latest request, while it is in flight.
    pending: Option<u64>,
}

impl RequestSlot {
    fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.pending = Some(self.issued);
        self.issued
    }

    fn is_latest(&self, token: u64) -> bool {
        self.issued == token
    }

    fn finish(&mut self, token: u64) {
        if self.pending == Some(token) {
            self.pending = None;
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    state: AppState,
    page_slot: RequestSlot,
    search_slot: RequestSlot,
}

impl Inner {
    fn slot_mut(&mut self, slot: Slot) -> &mut RequestSlot {
        match slot {
            Slot::Page => &mut self.page_slot,
            Slot::Search => &mut self.search_slot,
        }
    }

    fn sync_loading(&mut self) {
        self.state.loading = self.page_slot.pending.is_some() || self.search_slot.pending.is_some();
    }
}

/// An issued request.
///
/// Dropping it marks the request as finished, which also covers requests
/// that panicked or whose future was dropped before completing.
struct InFlight<'a> {
    inner: &'a Mutex<Inner>,
    slot: Slot,
    token: u64,
}

impl InFlight<'_> {
    /// Apply `commit` unless a later request was issued for the same slot.
    fn commit(self, commit: impl FnOnce(&mut AppState)) {
        let mut inner = lock(self.inner);
        if !inner.slot_mut(self.slot).is_latest(self.token) {
            debug!(slot = ?self.slot, token = self.token, "discarding superseded result");
            return;
        }
        commit(&mut inner.state);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut inner = lock(self.inner);
        inner.slot_mut(self.slot).finish(self.token);
        inner.sync_loading();
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sole owner and mutator of the [AppState].
#[derive(Debug)]
pub struct ViewController<C> {
    fetcher: CollectionFetcher<C>,
    inner: Mutex<Inner>,
}

impl<C: ClientTrait> ViewController<C> {
    /// Create a controller with empty state on page 1.
    pub fn new(fetcher: CollectionFetcher<C>) -> Self {
        Self {
            fetcher,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }

    /// Issue a request in `slot`, clearing the error of the previous attempt.
    fn begin(&self, slot: Slot, prepare: impl FnOnce(&mut AppState)) -> InFlight<'_> {
        let mut inner = self.lock();
        let token = inner.slot_mut(slot).begin();
        inner.state.error_message = None;
        inner.state.last_failure = None;
        prepare(&mut inner.state);
        inner.sync_loading();
        debug!(?slot, token, "issued request");

        InFlight {
            inner: &self.inner,
            slot,
            token,
        }
    }

    // region: intents

    /// Load page `page`, clamped to at least 1.
    ///
    /// On failure the previously loaded birds stay visible.
    #[instrument(skip(self))]
    pub async fn request_page(&self, page: u32) {
        let page = NonZeroU32::new(page).unwrap_or(NonZeroU32::MIN);
        let request = self.begin(Slot::Page, |state| state.page.page_number = page);

        let outcome = self.fetcher.load_page(page).await;

        request.commit(|state| match outcome {
            Ok(items) => {
                debug!(n_birds = items.len(), "committing page");
                state.page.items = items;
                state.page.loaded_page = Some(page);
            },
            Err(err) => {
                warn!(%err, reason = %err.reason(), "failed to load page");
                state.error_message = Some(PAGE_LOAD_FAILED.to_string());
                state.last_failure = Some(err.reason());
            },
        });
    }

    /// Look up a single bird.
    ///
    /// A blank `id` is ignored. On failure the previously selected bird
    /// stays selected.
    #[instrument(skip(self))]
    pub async fn search_by_id(&self, id: &str) {
        let Some(id) = BirdId::parse(id) else {
            debug!("ignoring blank search");
            return;
        };
        let request = self.begin(Slot::Search, |_| {});

        let outcome = self.fetcher.client().fetch_by_id(&id).await;

        request.commit(|state| match outcome {
            Ok(detail) => state.selected_detail = Some(detail),
            Err(err) => {
                warn!(%err, reason = %err.reason(), "failed to look up bird");
                state.error_message = Some(SEARCH_FAILED.to_string());
                state.last_failure = Some(err.reason());
            },
        });
    }

    /// Replace the content of the id search box.
    pub fn set_search_input(&self, input: impl Into<String>) {
        self.lock().state.search_input = input.into();
    }

    /// Search for the id currently in the search box.
    pub async fn submit_search(&self) {
        let input = self.lock().state.search_input.clone();
        self.search_by_id(&input).await;
    }

    /// Show only birds with `status`; `None` or an empty status shows all.
    ///
    /// Clears the selected bird, which may not match the new filter.
    pub fn set_filter(&self, status: Option<&str>) {
        let status = status.filter(|status| !status.is_empty());
        debug!(?status, "setting filter");

        let mut inner = self.lock();
        inner.state.filter.selected_status = status.map(ToString::to_string);
        inner.state.selected_detail = None;
    }

    /// Deselect the searched bird and empty the search box.
    pub fn clear_search(&self) {
        let mut inner = self.lock();
        inner.state.selected_detail = None;
        inner.state.search_input.clear();
    }

    /// Go back to page 1 without a selected bird and reload it.
    pub async fn reset_to_home(&self) {
        {
            let mut inner = self.lock();
            inner.state.page.page_number = NonZeroU32::MIN;
            inner.state.selected_detail = None;
            inner.state.search_input.clear();
        }
        self.request_page(1).await;
    }

    pub async fn next_page(&self) {
        let current = self.page_number();
        self.request_page(current.get().saturating_add(1)).await;
    }

    /// Load the previous page; does nothing on page 1.
    pub async fn prev_page(&self) {
        let current = self.page_number();
        if current == NonZeroU32::MIN {
            debug!("already on the first page");
            return;
        }
        self.request_page(current.get() - 1).await;
    }

    // endregion

    // region: accessors

    /// A copy of the complete state.
    pub fn snapshot(&self) -> AppState {
        self.lock().state.clone()
    }

    pub fn items(&self) -> Vec<BirdSummary> {
        self.lock().state.page.items.clone()
    }

    pub fn visible_items(&self) -> Vec<BirdSummary> {
        self.lock().state.visible_items()
    }

    pub fn facets(&self) -> FacetSet {
        self.lock().state.facets()
    }

    pub fn page_number(&self) -> NonZeroU32 {
        self.lock().state.page.page_number
    }

    pub fn loaded_page(&self) -> Option<NonZeroU32> {
        self.lock().state.page.loaded_page
    }

    pub fn selected_detail(&self) -> Option<BirdDetail> {
        self.lock().state.selected_detail.clone()
    }

    pub fn selected_status(&self) -> Option<String> {
        self.lock().state.filter.selected_status.clone()
    }

    pub fn search_input(&self) -> String {
        self.lock().state.search_input.clone()
    }

    pub fn loading(&self) -> bool {
        self.lock().state.loading
    }

    pub fn error_message(&self) -> Option<String> {
        self.lock().state.error_message.clone()
    }

    pub fn last_failure(&self) -> Option<FailureReason> {
        self.lock().state.last_failure
    }

    // endregion
}
