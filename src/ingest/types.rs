// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct SourceItem {
    pub title: String,
    pub url: String,
    pub source: String, // e.g. "hackernews", "producthunt"
    #[serde(default)]
    pub snippet: String,
    /// When this scan saw the item. Becomes the deal's `date_found`.
    #[serde(default = "Utc::now")]
    pub discovered_at: DateTime<Utc>,
    /// Publication time reported by the source, when it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl SourceItem {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source: source.into(),
            snippet: snippet.into(),
            discovered_at: Utc::now(),
            published_at: None,
        }
    }
}

#[async_trait::async_trait]
pub trait DiscoveryProvider: Send + Sync {
    async fn discover(&self) -> Result<Vec<SourceItem>>;
    fn name(&self) -> &str;
}
