//! Plain text rendering of the view state.

use birdview_sdk::state::AppState;
use itertools::Itertools;
use nuthatch_catalog::{BirdDetail, BirdSummary};

/// Shown in place of the image of a bird without images
const NO_IMAGE: &str = "noBird.png";

fn summary_line(bird: &BirdSummary) -> String {
    let mut line = format!("{:>6}  {}", bird.id.as_str(), bird.name);
    if let Some(scientific_name) = &bird.scientific_name {
        line.push_str(&format!(" ({scientific_name})"));
    }
    if let Some(status) = &bird.conservation_status {
        line.push_str(&format!(" [{status}]"));
    }
    line
}

/// The loaded page with the active filter applied.
pub fn page(state: &AppState) -> String {
    let visible = state.visible_items();
    let mut lines = Vec::new();

    let mut header = format!(
        "Page {}: showing {} of {} birds",
        state.page.page_number,
        visible.len(),
        state.page.items.len()
    );
    if let Some(status) = &state.filter.selected_status {
        header.push_str(&format!(" with status {status}"));
    }
    lines.push(header);

    if visible.is_empty() {
        lines.push("  No birds to show.".to_string());
    }
    lines.extend(visible.iter().map(summary_line));

    let facets = state.facets();
    if !facets.is_empty() {
        lines.push(format!("Statuses: {}", facets.iter().join(", ")));
    }

    lines.join("\n")
}

fn range(min: Option<f64>, max: Option<f64>) -> Option<String> {
    match (min, max) {
        (Some(min), Some(max)) if min != max => Some(format!("{min}-{max}")),
        (Some(value), _) | (None, Some(value)) => Some(value.to_string()),
        (None, None) => None,
    }
}

/// All known fields of a single bird.
pub fn detail(detail: &BirdDetail) -> String {
    let summary = &detail.summary;
    let mut title = summary.name.clone();
    if let Some(scientific_name) = &summary.scientific_name {
        title.push_str(&format!(" ({scientific_name})"));
    }

    let fields = [
        ("id", Some(summary.id.to_string())),
        ("status", summary.conservation_status.clone()),
        ("order", detail.order.clone()),
        ("family", detail.family.clone()),
        ("wingspan", range(detail.wingspan_min, detail.wingspan_max)),
        ("length", range(detail.length_min, detail.length_max)),
        (
            "image",
            Some(summary.primary_image().unwrap_or(NO_IMAGE).to_string()),
        ),
    ];

    let lines = fields.into_iter().filter_map(|(key, value)| {
        let label = format!("{key}:");
        value.map(|value| format!("  {label:<9} {value}"))
    });

    std::iter::once(title).chain(lines).join("\n")
}

/// A one line description of what the controller is waiting for or why it failed.
pub fn status_line(state: &AppState) -> Option<String> {
    if let Some(error) = &state.error_message {
        return Some(error.clone());
    }
    if state.loading {
        return Some("Loading...".to_string());
    }
    None
}
