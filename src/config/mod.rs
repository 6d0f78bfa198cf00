// src/config/mod.rs
//! Configuration directory loading.
//!
//! Layout (`$AISUBSCALP_CONFIG_DIR`, default `config/`):
//! - `keywords.toml` or `keywords.json` (required)
//! - `sources.toml` or `sources.json` (optional, defaults apply)
//!
//! Format follows the file extension; anything else is tried as TOML, then JSON.

pub mod keywords;
pub mod sources;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub use keywords::KeywordConfig;
pub use sources::{FeedCfg, SourcesConfig};

pub const ENV_CONFIG_DIR: &str = "AISUBSCALP_CONFIG_DIR";
pub const DEFAULT_CONFIG_DIR: &str = "config";

/// Everything a scan needs besides the store and the network.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub keywords: KeywordConfig,
    pub sources: SourcesConfig,
}

/// Explicit path wins, then `$AISUBSCALP_CONFIG_DIR`, then `./config`.
pub fn config_dir_or_default(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    std::env::var(ENV_CONFIG_DIR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_DIR))
}

pub fn load_config(dir: &Path) -> Result<AppConfig> {
    let kw_path = find_file(dir, "keywords")
        .ok_or_else(|| anyhow!("no keywords.toml or keywords.json in {}", dir.display()))?;
    let keywords: KeywordConfig = load_file(&kw_path)?;

    let mut sources = match find_file(dir, "sources") {
        Some(p) => load_file::<SourcesConfig>(&p)?,
        None => {
            tracing::info!(dir = %dir.display(), "no sources file, using defaults");
            SourcesConfig::default()
        }
    };
    sources.validate()?;
    sources.resolve_paths(dir);

    Ok(AppConfig {
        keywords: keywords.cleaned(),
        sources,
    })
}

fn find_file(dir: &Path, stem: &str) -> Option<PathBuf> {
    ["toml", "json"]
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.exists())
}

/// Load one config file, choosing the format from its extension.
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading config {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_by_ext(&content, &ext).with_context(|| format!("parsing config {}", path.display()))
}

fn parse_by_ext<T: DeserializeOwned>(s: &str, ext: &str) -> Result<T> {
    match ext {
        "toml" => Ok(toml::from_str(s)?),
        "json" => Ok(serde_json::from_str(s)?),
        _ => {
            if let Ok(v) = toml::from_str(s) {
                return Ok(v);
            }
            serde_json::from_str(s).map_err(|_| anyhow!("unsupported config format"))
        }
    }
}
