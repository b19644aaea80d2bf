use anyhow::{Result, bail};
use birdview_sdk::controller::ViewController;
use bpaf::Bpaf;
use nuthatch_catalog::{BirdId, ClientTrait};
use tracing::instrument;

use crate::utils::render;

// Show details about a single bird
#[derive(Debug, Bpaf, Clone)]
pub struct Show {
    /// Print the bird as JSON
    #[bpaf(long)]
    pub json: bool,

    /// Catalog id of the bird
    #[bpaf(positional("id"))]
    pub id: String,
}

impl Show {
    #[instrument(name = "show", skip_all, fields(id = %self.id))]
    pub async fn handle(self, controller: &ViewController<impl ClientTrait>) -> Result<()> {
        if BirdId::parse(&self.id).is_none() {
            bail!("bird id must not be blank");
        }

        controller.search_by_id(&self.id).await;

        if let Some(error) = controller.error_message() {
            bail!(error);
        }
        let Some(detail) = controller.selected_detail() else {
            bail!("no bird found with id '{}'", self.id.trim());
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&detail)?);
        } else {
            println!("{}", render::detail(&detail));
        }

        Ok(())
    }
}
