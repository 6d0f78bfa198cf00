// src/ingest/providers/reddit.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::http::HttpFetcher;
use crate::ingest::types::{DiscoveryProvider, SourceItem};
use crate::ingest::SNIPPET_MAX_CHARS;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    title: Option<String>,
    url: Option<String>,
    #[serde(default)]
    selftext: String,
    created_utc: Option<f64>,
}

/// Search inside one subreddit, newest first, through the public JSON
/// listing. Items are tagged `reddit/<subreddit>`.
pub struct RedditProvider {
    subreddit: String,
    query: String,
    name: String,
    http: HttpFetcher,
    limit: usize,
}

impl RedditProvider {
    pub fn new(
        subreddit: impl Into<String>,
        query: impl Into<String>,
        http: HttpFetcher,
        limit: usize,
    ) -> Self {
        let subreddit = subreddit.into();
        Self {
            name: format!("reddit/{subreddit}"),
            subreddit,
            query: query.into(),
            http,
            limit,
        }
    }

    fn search_url(&self) -> Result<url::Url> {
        let base = format!("https://www.reddit.com/r/{}/search.json", self.subreddit);
        let limit = self.limit.to_string();
        url::Url::parse_with_params(
            &base,
            &[
                ("q", self.query.as_str()),
                ("restrict_sr", "1"),
                ("sort", "new"),
                ("limit", limit.as_str()),
            ],
        )
        .with_context(|| format!("building reddit search url for r/{}", self.subreddit))
    }
}

/// `selftext`, capped at the snippet length, becomes the snippet. Posts
/// without a title or url are skipped.
pub fn parse_listing(body: &str, subreddit: &str, limit: usize) -> Result<Vec<SourceItem>> {
    let listing: Listing = serde_json::from_str(body).context("parsing reddit listing json")?;
    let source = format!("reddit/{subreddit}");
    let items = listing
        .data
        .children
        .into_iter()
        .filter_map(|c| {
            let p = c.data;
            let title = p.title.filter(|t| !t.trim().is_empty())?;
            let url = p.url.filter(|u| !u.trim().is_empty())?;
            Some(SourceItem {
                title,
                url,
                source: source.clone(),
                snippet: p.selftext.chars().take(SNIPPET_MAX_CHARS).collect(),
                discovered_at: Utc::now(),
                published_at: p
                    .created_utc
                    .and_then(|s| DateTime::from_timestamp(s as i64, 0)),
            })
        })
        .take(limit)
        .collect();
    Ok(items)
}

#[async_trait]
impl DiscoveryProvider for RedditProvider {
    async fn discover(&self) -> Result<Vec<SourceItem>> {
        let url = self.search_url()?;
        let body = self
            .http
            .get_text(url.as_str())
            .await
            .with_context(|| format!("r/{} search '{}'", self.subreddit, self.query))?;
        parse_listing(&body, &self.subreddit, self.limit)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
