//! Endpoint configuration for a [`Session`](crate::lifecycle::Session).

use serde::Deserialize;

/// Environment variable overriding [`SessionConfig::base_url`].
pub const BASE_URL_ENV: &str = "REST_ENTITY_BASE_URL";

/// Where the API lives and where each resource kind is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub base_url: String,
    pub listings_path: String,
    pub agents_path: String,
    pub offices_path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            listings_path: "listings".to_string(),
            agents_path: "agents".to_string(),
            offices_path: "offices".to_string(),
        }
    }
}

impl SessionConfig {
    /// Defaults, with the base URL taken from `REST_ENTITY_BASE_URL` when set.
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(BASE_URL_ENV) {
            Ok(base_url) if !base_url.trim().is_empty() => config.with_base_url(base_url),
            _ => config,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Join `path` onto the base URL with exactly one slash between them.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}
