//! Configuration loading and content source factory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use geoquiz_core::traits::ContentSource;

use crate::contentful::ContentfulSource;

/// Connection settings for the Contentful Delivery API.
///
/// Note: Custom Debug impl masks the access token to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ContentfulConfig {
    #[serde(default = "default_space_id")]
    pub space_id: String,
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Delivery API token, sent as a bearer token.
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Hard deadline for every request.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Link resolution depth requested for question queries.
    #[serde(default = "default_include_depth")]
    pub include_depth: u8,
}

impl std::fmt::Debug for ContentfulConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentfulConfig")
            .field("space_id", &self.space_id)
            .field("environment", &self.environment)
            .field("access_token", &"***")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("include_depth", &self.include_depth)
            .finish()
    }
}

fn default_space_id() -> String {
    "o2kemh1ir3sz".to_string()
}
fn default_environment() -> String {
    "master".to_string()
}
fn default_base_url() -> String {
    "https://cdn.contentful.com".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_include_depth() -> u8 {
    10
}

impl Default for ContentfulConfig {
    fn default() -> Self {
        Self {
            space_id: default_space_id(),
            environment: default_environment(),
            access_token: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            include_depth: default_include_depth(),
        }
    }
}

/// Top-level geoquiz configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoquizConfig {
    #[serde(default)]
    pub contentful: ContentfulConfig,
    /// Theme color overrides keyed by variable name (e.g. `primary = "rgb(...)"`).
    #[serde(default)]
    pub theme: BTreeMap<String, String>,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `geoquiz.toml` in the current directory
/// 2. `~/.config/geoquiz/config.toml`
///
/// Environment variable overrides: `GEOQUIZ_ACCESS_TOKEN`, `GEOQUIZ_SPACE_ID`.
pub fn load_config() -> Result<GeoquizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GeoquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("geoquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<GeoquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => GeoquizConfig::default(),
    };

    // Apply env var overrides
    if let Ok(token) = std::env::var("GEOQUIZ_ACCESS_TOKEN") {
        config.contentful.access_token = token;
    }
    if let Ok(space) = std::env::var("GEOQUIZ_SPACE_ID") {
        config.contentful.space_id = space;
    }

    let contentful = &mut config.contentful;
    contentful.access_token = resolve_env_vars(&contentful.access_token);
    contentful.space_id = resolve_env_vars(&contentful.space_id);
    contentful.environment = resolve_env_vars(&contentful.environment);
    contentful.base_url = resolve_env_vars(&contentful.base_url);

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("geoquiz"))
}

/// Create a content source from configuration.
pub fn create_source(config: &ContentfulConfig) -> Result<Box<dyn ContentSource>> {
    anyhow::ensure!(
        !config.access_token.is_empty(),
        "no Contentful access token configured (set GEOQUIZ_ACCESS_TOKEN or run `geoquiz init`)"
    );
    Ok(Box::new(ContentfulSource::new(config.clone())?))
}
