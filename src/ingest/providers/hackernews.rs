// src/ingest/providers/hackernews.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::http::HttpFetcher;
use crate::ingest::types::{DiscoveryProvider, SourceItem};

const SEARCH_ENDPOINT: &str = "https://hn.algolia.com/api/v1/search_by_date";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<Hit>,
}

#[derive(Debug, Deserialize)]
struct Hit {
    title: Option<String>,
    url: Option<String>,
    story_text: Option<String>,
    created_at_i: Option<i64>,
}

/// Story search over the public Hacker News Algolia API, one query per provider.
pub struct HackerNewsProvider {
    query: String,
    http: HttpFetcher,
    limit: usize,
}

impl HackerNewsProvider {
    pub fn new(query: impl Into<String>, http: HttpFetcher, limit: usize) -> Self {
        Self {
            query: query.into(),
            http,
            limit,
        }
    }

    fn search_url(&self) -> Result<url::Url> {
        let hits = self.limit.to_string();
        url::Url::parse_with_params(
            SEARCH_ENDPOINT,
            &[
                ("query", self.query.as_str()),
                ("tags", "story"),
                ("hitsPerPage", hits.as_str()),
            ],
        )
        .context("building hn search url")
    }
}

/// Turn an Algolia response body into items; hits without title or url are skipped.
pub fn parse_hits(body: &str, limit: usize) -> Result<Vec<SourceItem>> {
    let resp: SearchResponse = serde_json::from_str(body).context("parsing hn search json")?;
    let items = resp
        .hits
        .into_iter()
        .filter_map(|h| {
            let title = h.title.filter(|t| !t.trim().is_empty())?;
            let url = h.url.filter(|u| !u.trim().is_empty())?;
            Some(SourceItem {
                title,
                url,
                source: "hackernews".to_string(),
                snippet: h.story_text.unwrap_or_default(),
                discovered_at: Utc::now(),
                published_at: h.created_at_i.and_then(|s| DateTime::from_timestamp(s, 0)),
            })
        })
        .take(limit)
        .collect();
    Ok(items)
}

#[async_trait]
impl DiscoveryProvider for HackerNewsProvider {
    async fn discover(&self) -> Result<Vec<SourceItem>> {
        let url = self.search_url()?;
        let body = self
            .http
            .get_text(url.as_str())
            .await
            .with_context(|| format!("hn search '{}'", self.query))?;
        parse_hits(&body, self.limit)
    }

    fn name(&self) -> &str {
        "hackernews"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hits_and_skips_ask_hn_posts() {
        let body = r#"{"hits":[
            {"title":"Show HN: Open source LLM router","url":"https://router.example","story_text":null,"created_at_i":1700000000},
            {"title":"Ask HN: best AI tools?","url":null,"story_text":"..."},
            {"title":"","url":"https://blank.example"}
        ]}"#;
        let items = parse_hits(body, 10).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, "hackernews");
        assert_eq!(items[0].snippet, "");
        assert_eq!(
            items[0].published_at.map(|d| d.timestamp()),
            Some(1_700_000_000)
        );
        assert!(items[0].discovered_at.timestamp() > 1_700_000_000);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(parse_hits("<html>", 5).is_err());
    }
}
