//! Server configuration module.
//!
//! Handles loading and validating `shufflepic.toml`. The file is optional —
//! stock defaults apply when it is absent — and sparse: override just the
//! values you want. Unknown keys are rejected to catch typos early.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! image_root = "images"        # Directory tree to serve images from
//! bind = "0.0.0.0:3000"        # Listen address
//!
//! # Absolute URL prefix for Open Graph image tags, e.g. "https://cats.example.com".
//! # When unset, og:image falls back to a relative URL.
//! # public_base_url = "https://cats.example.com"
//! ```
//!
//! CLI flags (`--root`, `--bind`) override file values; the file overrides
//! stock defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Server configuration loaded from `shufflepic.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Directory tree the resolver serves images from.
    pub image_root: PathBuf,
    /// Socket address the HTTP server listens on.
    pub bind: String,
    /// Absolute URL prefix used for Open Graph tags. Relative URLs are used
    /// when unset.
    pub public_base_url: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            image_root: PathBuf::from("images"),
            bind: "0.0.0.0:3000".to_string(),
            public_base_url: None,
        }
    }
}

impl ServerConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_root.as_os_str().is_empty() {
            return Err(ConfigError::Validation("image_root must not be empty".into()));
        }
        if self.bind.parse::<SocketAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "bind is not a valid socket address: {}",
                self.bind
            )));
        }
        if let Some(url) = &self.public_base_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::Validation(
                "public_base_url must start with http:// or https://".into(),
            ));
        }
        Ok(())
    }

    /// The listen address, parsed. Call after [`validate`](Self::validate).
    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind.parse().map_err(|_| {
            ConfigError::Validation(format!("bind is not a valid socket address: {}", self.bind))
        })
    }

    /// Open Graph URL prefix with any trailing slash trimmed, or empty for
    /// relative URLs.
    pub fn og_prefix(&self) -> &str {
        self.public_base_url
            .as_deref()
            .map(|u| u.trim_end_matches('/'))
            .unwrap_or("")
    }
}

/// Load config from a TOML file.
///
/// A missing file yields stock defaults. A present file is parsed with
/// unknown keys rejected, then validated.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let config = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str::<ServerConfig>(&content)?
    } else {
        ServerConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `shufflepic.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# shufflepic configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory tree to serve images from. Scanned recursively on every
# random-image request; files added or removed take effect immediately.
image_root = "images"

# Listen address.
bind = "0.0.0.0:3000"

# Absolute URL prefix for Open Graph / Twitter card image tags, without a
# trailing slash, e.g. "https://cats.example.com". When unset, the og:image
# tag uses a relative URL (fine for browsers, ignored by link unfurlers).
# public_base_url = "https://cats.example.com"
"##
}
