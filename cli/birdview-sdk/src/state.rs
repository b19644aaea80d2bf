//! The application state shown to the user.

use std::num::NonZeroU32;

use nuthatch_catalog::{BirdDetail, BirdSummary, FailureReason};
use serde::Serialize;

use crate::facets::{FacetSet, extract_facets, filter_by_status};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageState {
    /// The most recently requested page.
    pub page_number: NonZeroU32,
    pub items: Vec<BirdSummary>,
    /// The page `items` were loaded for.
    ///
    /// Differs from `page_number` while a request is in flight
    /// and after a failed request.
    pub loaded_page: Option<NonZeroU32>,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            page_number: NonZeroU32::MIN,
            items: Vec::new(),
            loaded_page: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterState {
    /// Only birds with exactly this status are visible.
    pub selected_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppState {
    pub page: PageState,
    pub filter: FilterState,
    pub selected_detail: Option<BirdDetail>,
    pub search_input: String,
    pub loading: bool,
    pub error_message: Option<String>,
    #[serde(skip)]
    pub last_failure: Option<FailureReason>,
}

impl AppState {
    pub fn facets(&self) -> FacetSet {
        extract_facets(&self.page.items)
    }

    /// Loaded birds passing the active filter.
    pub fn visible_items(&self) -> Vec<BirdSummary> {
        filter_by_status(
            &self.page.items,
            self.filter.selected_status.as_deref(),
        )
        .cloned()
        .collect()
    }
}
