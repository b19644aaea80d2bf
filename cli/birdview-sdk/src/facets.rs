//! Values derived from a loaded page.

use std::collections::BTreeSet;

use nuthatch_catalog::BirdSummary;

/// Distinct conservation statuses of a page, used to populate the filter.
pub type FacetSet = BTreeSet<String>;

/// Collect the distinct conservation statuses present in `items`.
///
/// Birds without a status are skipped.
pub fn extract_facets<'a>(items: impl IntoIterator<Item = &'a BirdSummary>) -> FacetSet {
    items
        .into_iter()
        .filter_map(|bird| bird.conservation_status.clone())
        .collect()
}

/// Birds matching `status` exactly, in their original order.
///
/// `None` matches every bird.
pub fn filter_by_status<'a>(
    items: &'a [BirdSummary],
    status: Option<&'a str>,
) -> impl Iterator<Item = &'a BirdSummary> + 'a {
    items.iter().filter(move |bird| match status {
        None => true,
        Some(status) => bird.conservation_status.as_deref() == Some(status),
    })
}
