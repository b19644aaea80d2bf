use std::collections::HashMap;
use std::env;
use std::fmt;
use std::num::{NonZeroU32, NonZeroUsize};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use birdview_sdk::fetcher::FetcherConfig;
use config::{Config as HierarchicalConfig, Environment};
use log::debug;
use nuthatch_catalog::{DEFAULT_CATALOG_URL, Operator};
use serde::{Deserialize, Serialize};
use xdg::BaseDirectories;

/// Name of birdview managed directories
const BIRDVIEW_DIR_NAME: &str = "birdview";
const BIRDVIEW_CONFIG_DIR_VAR: &str = "BIRDVIEW_CONFIG_DIR";
const BIRDVIEW_ENV_PREFIX: &str = "BIRDVIEW_";
pub const BIRDVIEW_CONFIG_FILE: &str = "birdview.toml";

/// Settings taken verbatim from the environment, never parsed as numbers or booleans
const VERBATIM_KEYS: [&str; 4] = ["api_key", "user_agent", "region", "catalog_url"];

#[derive(Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Base URL of the catalog API, including its version path
    pub catalog_url: String,

    /// Credential sent with every catalog request
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Birds per catalog page
    pub page_size: u32,

    /// Only list birds of this region; empty to list all regions
    #[serde(default)]
    pub region: Option<String>,

    /// Only list birds with at least one image
    #[serde(default)]
    pub has_image: Option<bool>,

    /// How the catalog combines the region and image filters
    pub operator: Operator,

    /// Number of catalog pages shown as one page
    pub source_pages_per_view: u32,

    /// Show at most this many birds per page; 0 shows all
    #[serde(default)]
    pub preview_limit: Option<usize>,

    /// Override the user agent of catalog requests
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("catalog_url", &self.catalog_url)
            .field("api_key", &Redacted(&self.api_key))
            .field("page_size", &self.page_size)
            .field("region", &self.region)
            .field("has_image", &self.has_image)
            .field("operator", &self.operator)
            .field("source_pages_per_view", &self.source_pages_per_view)
            .field("preview_limit", &self.preview_limit)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

struct Redacted<'a>(&'a Option<String>);
impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => write!(f, "Some(<redacted>)"),
            None => write!(f, "None"),
        }
    }
}

impl Config {
    /// Creates a [Config] from the config files and `BIRDVIEW_*` variables
    pub fn parse() -> Result<Config> {
        let config_dir = env::var_os(BIRDVIEW_CONFIG_DIR_VAR).map(PathBuf::from);
        let raw = read_raw_config(config_dir.as_deref(), env::vars())?;

        let config: Config = raw.try_deserialize().context("Could not parse config")?;
        debug!("read config: {config:?}");
        Ok(config)
    }

    /// Query parameters and page layout for the collection fetcher
    pub fn fetcher_config(&self) -> Result<FetcherConfig> {
        let page_size =
            NonZeroU32::new(self.page_size).context("'page_size' must be at least 1")?;
        let source_pages_per_view = NonZeroU32::new(self.source_pages_per_view)
            .context("'source_pages_per_view' must be at least 1")?;

        Ok(FetcherConfig {
            page_size,
            region: self.region.clone().filter(|region| !region.is_empty()),
            has_image: self.has_image,
            operator: self.operator,
            source_pages_per_view,
            preview_limit: self.preview_limit.and_then(NonZeroUsize::new),
        })
    }
}

/// Layer the config sources, later sources taking precedence:
///
/// 1. built-in defaults
/// 2. `/etc/birdview.toml`
/// 3. `birdview.toml` in the XDG config directories
/// 4. `birdview.toml` in `config_dir`
/// 5. `BIRDVIEW_*` variables in `vars`
fn read_raw_config(
    config_dir: Option<&Path>,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Result<HierarchicalConfig> {
    let mut builder = HierarchicalConfig::builder()
        .set_default("catalog_url", DEFAULT_CATALOG_URL)?
        .set_default("page_size", 25)?
        .set_default("region", "North America")?
        .set_default("has_image", true)?
        .set_default("operator", "AND")?
        .set_default("source_pages_per_view", 1)?;

    // read from /etc
    builder = builder.add_source(
        config::File::from(PathBuf::from("/etc").join(BIRDVIEW_CONFIG_FILE))
            .format(config::FileFormat::Toml)
            .required(false),
    );

    // look for files in XDG_CONFIG_DIRS locations
    let birdview_dirs = BaseDirectories::with_prefix(BIRDVIEW_DIR_NAME);
    for file in birdview_dirs.find_config_files(BIRDVIEW_CONFIG_FILE) {
        debug!("found config file {file:?}");
        builder = builder.add_source(config::File::from(file).format(config::FileFormat::Toml));
    }

    // Add explicit BIRDVIEW_CONFIG_DIR file last
    if let Some(config_dir) = config_dir {
        debug!("`${BIRDVIEW_CONFIG_DIR_VAR}` set: {config_dir:?}");
        builder = builder.add_source(
            config::File::from(config_dir.join(BIRDVIEW_CONFIG_FILE))
                .format(config::FileFormat::Toml)
                .required(false),
        );
    }

    // override via env variables
    let (verbatim_envs, birdview_envs): (HashMap<_, _>, HashMap<_, _>) = vars
        .into_iter()
        .filter_map(|(k, v)| {
            let key = k.strip_prefix(BIRDVIEW_ENV_PREFIX)?;
            (key != "CONFIG_DIR").then(|| (key.to_lowercase(), v))
        })
        .partition(|(key, _)| VERBATIM_KEYS.contains(&key.as_str()));

    builder = builder.add_source(
        Environment::default()
            .source(Some(birdview_envs))
            .try_parsing(true),
    );
    for (key, value) in verbatim_envs {
        builder = builder.set_override(key, value)?;
    }

    Ok(builder.build()?)
}
