//! Configuration types for catalog client construction.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::time::Duration;

pub const DEFAULT_CATALOG_URL: &str = "https://nuthatch.lastelm.software/v2";

/// Configuration for catalog client construction.
#[derive(Debug, Clone)]
pub struct CatalogClientConfig {
    /// Base URL for the catalog API.
    pub catalog_url: String,
    /// Credential sent in the `api-key` header of every request.
    pub api_key: Option<ApiKey>,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    pub user_agent: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for CatalogClientConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            api_key: None,
            extra_headers: BTreeMap::new(),
            user_agent: None,
            connect_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// An opaque service credential.
///
/// The value is never included in `Debug` output so configs can be logged.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let config = CatalogClientConfig {
            api_key: Some(ApiKey::new("super-secret")),
            ..Default::default()
        };

        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"), "leaked key: {debug}");
        assert!(debug.contains("<redacted>"));
    }
}
