// src/config.rs
// Layered configuration from ~/.cinequery/config.toml and the environment

use crate::error::{CineQueryError, Result};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Default review backend base URL
pub const DEFAULT_BACKEND_URL: &str = "https://react-projekt-cinequery-api.onrender.com";

/// Default movie catalog (TMDB) base URL
pub const DEFAULT_CATALOG_URL: &str = "https://api.themoviedb.org/3";

/// Configuration for cinequery
///
/// Every field is optional in the file; accessors fall back to an
/// environment variable and then to the built-in default.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// TMDB API read access token
    pub tmdb_api_key: Option<String>,

    /// Review backend base URL
    pub backend_url: Option<String>,

    /// Movie catalog base URL
    pub catalog_url: Option<String>,

    /// Directory for persisted client state (token, watched lists)
    pub data_dir: Option<PathBuf>,
}

impl Config {
    /// Load config from ~/.cinequery/config.toml
    pub fn load() -> Self {
        let path = config_path();

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => {
                    debug!(path = %path.display(), "Loaded config from file");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to parse config file");
                    Self::default()
                }
            },
            Err(_) => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                Self::default()
            }
        }
    }

    /// TMDB API key; required for catalog operations
    pub fn tmdb_api_key(&self) -> Result<String> {
        get_or_env(self.tmdb_api_key.as_ref(), "TMDB_API_KEY")
            .ok_or_else(|| CineQueryError::Config("TMDB_API_KEY is not set".to_string()))
    }

    /// Review backend base URL, without trailing slash
    pub fn backend_url(&self) -> String {
        let url = get_or_env(self.backend_url.as_ref(), "CINEQUERY_BACKEND_URL")
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string());
        url.trim_end_matches('/').to_string()
    }

    /// Movie catalog base URL, without trailing slash
    pub fn catalog_url(&self) -> String {
        let url = get_or_env(self.catalog_url.as_ref(), "CINEQUERY_CATALOG_URL")
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string());
        url.trim_end_matches('/').to_string()
    }

    /// Directory for persisted client state
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        if let Ok(dir) = std::env::var("CINEQUERY_DATA_DIR") {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".cinequery")
    }
}

/// Get a value with fallback to an environment variable
fn get_or_env(field: Option<&String>, env_var: &str) -> Option<String> {
    field.cloned().or_else(|| std::env::var(env_var).ok())
}

/// Get the config file path
pub fn config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".cinequery")
        .join("config.toml")
}
