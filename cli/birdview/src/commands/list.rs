use anyhow::{Result, bail};
use birdview_sdk::controller::ViewController;
use bpaf::Bpaf;
use nuthatch_catalog::ClientTrait;
use serde_json::json;
use tracing::instrument;

use crate::utils::render;

// List a page of birds
#[derive(Debug, Bpaf, Clone)]
pub struct List {
    /// Page to show, starting at 1
    #[bpaf(long, short, argument("N"), fallback(1))]
    pub page: u32,

    /// Only show birds with this conservation status, e.g. 'LC'
    #[bpaf(long, short, argument("STATUS"))]
    pub status: Option<String>,

    /// Print the page as JSON
    #[bpaf(long)]
    pub json: bool,
}

impl List {
    #[instrument(name = "list", skip_all)]
    pub async fn handle(self, controller: &ViewController<impl ClientTrait>) -> Result<()> {
        controller.request_page(self.page).await;
        controller.set_filter(self.status.as_deref());

        if let Some(error) = controller.error_message() {
            bail!(error);
        }

        let state = controller.snapshot();
        if self.json {
            let page = json!({
                "page": state.page.page_number,
                "status": state.filter.selected_status,
                "facets": state.facets(),
                "birds": state.visible_items(),
            });
            println!("{}", serde_json::to_string_pretty(&page)?);
        } else {
            println!("{}", render::page(&state));
        }

        Ok(())
    }
}
