use anyhow::Result;
use birdview_sdk::controller::ViewController;
use birdview_sdk::fetcher::CollectionFetcher;
use nuthatch_catalog::Client;

use crate::config::Config;

mod catalog_client;
mod logger;

pub use catalog_client::*;
pub use logger::*;

/// Wire the configured catalog client into a fresh controller.
pub fn init_controller(config: &Config) -> Result<ViewController<Client>> {
    let client = init_catalog_client(config)?;
    let fetcher = CollectionFetcher::new(client, config.fetcher_config()?);
    Ok(ViewController::new(fetcher))
}
