// src/ingest/providers/fixture.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;

use crate::ingest::types::{DiscoveryProvider, SourceItem};

/// Replays a JSON array of `SourceItem`s from disk. Lets a scan run fully
/// offline (besides verification) and backs the end-to-end tests.
pub struct FixtureProvider {
    path: PathBuf,
    name: String,
    limit: usize,
}

impl FixtureProvider {
    pub fn new(path: impl Into<PathBuf>, limit: usize) -> Self {
        let path = path.into();
        let name = format!("fixture:{}", path.display());
        Self { path, name, limit }
    }
}

#[async_trait]
impl DiscoveryProvider for FixtureProvider {
    async fn discover(&self) -> Result<Vec<SourceItem>> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading fixture {}", self.path.display()))?;
        let mut items: Vec<SourceItem> = serde_json::from_str(&raw)
            .with_context(|| format!("parsing fixture {}", self.path.display()))?;
        items.truncate(self.limit);
        Ok(items)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
