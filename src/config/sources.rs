// src/config/sources.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_rate_limit() -> [f64; 2] {
    [1.0, 2.5]
}
fn default_max_results() -> usize {
    60
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedCfg {
    /// Becomes the `source` tag of every item from this feed.
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// `[min, max]` seconds between any two outbound requests.
    #[serde(default = "default_rate_limit")]
    pub rate_limit_seconds: [f64; 2],
    #[serde(default = "default_max_results")]
    pub max_results_per_source: usize,
    #[serde(default)]
    pub rss_feeds: Vec<FeedCfg>,
    #[serde(default)]
    pub hackernews_queries: Vec<String>,
    /// Repository searches; only run when `GITHUB_TOKEN` is set.
    #[serde(default)]
    pub github_queries: Vec<String>,
    /// Every subreddit is searched with every entry of `reddit_queries`.
    #[serde(default)]
    pub subreddits: Vec<String>,
    #[serde(default)]
    pub reddit_queries: Vec<String>,
    /// JSON files of pre-collected source items; relative paths are resolved
    /// against the config directory.
    #[serde(default)]
    pub fixture_files: Vec<PathBuf>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            rate_limit_seconds: default_rate_limit(),
            max_results_per_source: default_max_results(),
            rss_feeds: Vec::new(),
            hackernews_queries: Vec::new(),
            github_queries: Vec::new(),
            subreddits: Vec::new(),
            reddit_queries: Vec::new(),
            fixture_files: Vec::new(),
        }
    }
}

impl SourcesConfig {
    pub fn validate(&self) -> Result<()> {
        let [min, max] = self.rate_limit_seconds;
        if !(min.is_finite() && max.is_finite()) || min < 0.0 {
            bail!("rate_limit_seconds must be finite and non-negative");
        }
        if min > max {
            bail!("rate_limit_seconds min ({min}) exceeds max ({max})");
        }
        if self.max_results_per_source == 0 {
            bail!("max_results_per_source must be at least 1");
        }
        Ok(())
    }

    pub(crate) fn resolve_paths(&mut self, base: &Path) {
        for p in &mut self.fixture_files {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }
}
