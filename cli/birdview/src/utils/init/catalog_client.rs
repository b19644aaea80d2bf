use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use nuthatch_catalog::{
    ApiKey,
    BIRDVIEW_CATALOG_MOCK_DATA_VAR,
    CatalogClient,
    CatalogClientConfig,
    Client,
    MockClient,
};
use tracing::debug;

use crate::config::Config;

/// User agent sent to the catalog unless configured otherwise
const DEFAULT_USER_AGENT: &str = concat!("birdview/", env!("CARGO_PKG_VERSION"));

/// Initialize the catalog client
///
/// - Initialize a mock client if `$_BIRDVIEW_USE_CATALOG_MOCK` points to mock data
/// - Initialize a real client otherwise, which requires an `api_key`
pub fn init_catalog_client(config: &Config) -> Result<Client> {
    // if $_BIRDVIEW_USE_CATALOG_MOCK is set to a path to mock data, use the mock client
    if let Ok(path_str) = std::env::var(BIRDVIEW_CATALOG_MOCK_DATA_VAR) {
        let path = PathBuf::from(path_str);
        if !path.exists() {
            bail!("path to mock data file doesn't exist: {}", path.display());
        }

        debug!(mock_data_path = %path.display(), "using mock catalog client");
        return Ok(MockClient::new(Some(path))?.into());
    }

    let Some(api_key) = config.api_key.as_deref().filter(|key| !key.is_empty()) else {
        bail!(
            "no catalog api key configured, set 'api_key' in birdview.toml or $BIRDVIEW_API_KEY"
        );
    };

    let client_config = CatalogClientConfig {
        catalog_url: config.catalog_url.clone(),
        api_key: Some(ApiKey::new(api_key)),
        user_agent: Some(
            config
                .user_agent
                .clone()
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        ),
        ..CatalogClientConfig::default()
    };

    debug!("using catalog client with url: {}", client_config.catalog_url);
    let client = CatalogClient::new(client_config).context("Could not create catalog client")?;
    Ok(client.into())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn config(api_key: Option<&str>) -> Config {
        Config {
            catalog_url: "http://localhost:8080/v2".to_string(),
            api_key: api_key.map(ToString::to_string),
            page_size: 25,
            region: None,
            has_image: None,
            operator: Default::default(),
            source_pages_per_view: 1,
            preview_limit: None,
            user_agent: None,
        }
    }

    #[test]
    fn real_client_requires_api_key() {
        temp_env::with_var_unset(BIRDVIEW_CATALOG_MOCK_DATA_VAR, || {
            let err = init_catalog_client(&config(None)).unwrap_err();
            assert!(err.to_string().contains("api key"), "{err}");

            assert!(init_catalog_client(&config(Some(""))).is_err());
        });
    }

    #[test]
    fn real_client_with_api_key() {
        temp_env::with_var_unset(BIRDVIEW_CATALOG_MOCK_DATA_VAR, || {
            let client = init_catalog_client(&config(Some("k1"))).unwrap();
            let Client::Catalog(client) = client else {
                panic!("expected a catalog client");
            };
            assert_eq!(client.catalog_url(), "http://localhost:8080/v2");
        });
    }

    #[test]
    fn invalid_catalog_url_is_an_error() {
        temp_env::with_var_unset(BIRDVIEW_CATALOG_MOCK_DATA_VAR, || {
            let mut config = config(Some("k1"));
            config.catalog_url = "not a url".to_string();
            assert!(init_catalog_client(&config).is_err());
        });
    }

    #[test]
    fn mock_client_without_api_key() {
        let dir = TempDir::new().unwrap();
        let mock_data = dir.path().join("mock.json");
        fs::write(&mock_data, r#"[{ "kind": "network_error" }]"#).unwrap();

        temp_env::with_var(BIRDVIEW_CATALOG_MOCK_DATA_VAR, Some(&mock_data), || {
            let client = init_catalog_client(&config(None)).unwrap();
            let Client::Mock(client) = client else {
                panic!("expected a mock client");
            };
            assert_eq!(client.mock_responses.lock().unwrap().len(), 1);
        });
    }

    #[test]
    fn missing_mock_data_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mock_data = dir.path().join("missing.json");

        temp_env::with_var(BIRDVIEW_CATALOG_MOCK_DATA_VAR, Some(&mock_data), || {
            let err = init_catalog_client(&config(Some("k1"))).unwrap_err();
            assert!(err.to_string().contains("doesn't exist"), "{err}");
        });
    }
}
