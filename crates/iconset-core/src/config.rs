//! Centralized configuration for the iconset library.
//!
//! Catalog format constants, lookup endpoint settings, and path names.

use crate::error::{IconError, Result};
use std::time::Duration;
use url::Url;

/// Metadata file format and icon defaults.
pub struct CatalogConfig;

impl CatalogConfig {
    pub const META_FILENAME: &'static str = "meta.json";
    pub const ICON_EXTENSION: &'static str = ".svg";
    pub const DEFAULT_ICON_WIDTH: u64 = 48;
    pub const DEFAULT_ICON_HEIGHT: u64 = 48;
    pub const JSON_INDENT: &'static str = "\t";
    pub const JSON_WRAP_WIDTH: usize = 100;
}

/// Network-related configuration.
pub struct NetworkConfig;

impl NetworkConfig {
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
    pub const USER_AGENT: &'static str = "iconset/0.1";
    pub const DEFAULT_LOOKUP_URL: &'static str = "http://localhost:5173/nounfetch.json";
    pub const LOOKUP_URL_ENV_VAR: &'static str = "ICONSET_LOOKUP_URL";
}

/// Shared directory and path configurations.
pub struct PathsConfig;

impl PathsConfig {
    pub const CONFIG_DIR_NAME: &'static str = "iconset";
    pub const PREFERENCES_FILENAME: &'static str = "preferences.json";
}

/// Settings for the HTTP icon lookup client.
#[derive(Debug, Clone)]
pub struct LookupConfig {
    pub endpoint: Url,
    pub timeout: Duration,
}

impl LookupConfig {
    /// Build a config for a specific endpoint.
    pub fn with_endpoint(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint).map_err(|e| IconError::Config {
            message: format!("Invalid lookup endpoint {}: {}", endpoint, e),
        })?;
        Ok(Self {
            endpoint,
            timeout: NetworkConfig::REQUEST_TIMEOUT,
        })
    }

    /// Default config, with the endpoint overridable through the environment.
    pub fn from_env() -> Result<Self> {
        match std::env::var(NetworkConfig::LOOKUP_URL_ENV_VAR) {
            Ok(url) if !url.trim().is_empty() => Self::with_endpoint(url.trim()),
            _ => Self::with_endpoint(NetworkConfig::DEFAULT_LOOKUP_URL),
        }
    }
}
