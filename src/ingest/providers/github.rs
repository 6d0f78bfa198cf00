// src/ingest/providers/github.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::http::HttpFetcher;
use crate::ingest::types::{DiscoveryProvider, SourceItem};

const SEARCH_ENDPOINT: &str = "https://api.github.com/search/repositories";

/// Env var holding the API token; without it no GitHub provider is built.
pub const ENV_GITHUB_TOKEN: &str = "GITHUB_TOKEN";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<Repo>,
}

#[derive(Debug, Deserialize)]
struct Repo {
    full_name: Option<String>,
    html_url: Option<String>,
    description: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

/// Repository search over the GitHub REST API, one query per provider.
/// Main source of open-source candidates.
pub struct GithubProvider {
    query: String,
    token: String,
    http: HttpFetcher,
    limit: usize,
}

impl GithubProvider {
    pub fn new(
        query: impl Into<String>,
        token: impl Into<String>,
        http: HttpFetcher,
        limit: usize,
    ) -> Self {
        Self {
            query: query.into(),
            token: token.into(),
            http,
            limit,
        }
    }

    fn search_url(&self) -> Result<url::Url> {
        // the API caps per_page at 100
        let per_page = self.limit.min(100).to_string();
        url::Url::parse_with_params(
            SEARCH_ENDPOINT,
            &[("q", self.query.as_str()), ("per_page", per_page.as_str())],
        )
        .context("building github search url")
    }
}

/// `full_name` becomes the title and `description` the snippet; repos
/// without a name or url are skipped.
pub fn parse_repos(body: &str, limit: usize) -> Result<Vec<SourceItem>> {
    let resp: SearchResponse =
        serde_json::from_str(body).context("parsing github search json")?;
    let items = resp
        .items
        .into_iter()
        .filter_map(|r| {
            let title = r.full_name.filter(|t| !t.trim().is_empty())?;
            let url = r.html_url.filter(|u| !u.trim().is_empty())?;
            Some(SourceItem {
                title,
                url,
                source: "github".to_string(),
                snippet: r.description.unwrap_or_default(),
                discovered_at: Utc::now(),
                published_at: r.created_at,
            })
        })
        .take(limit)
        .collect();
    Ok(items)
}

#[async_trait]
impl DiscoveryProvider for GithubProvider {
    async fn discover(&self) -> Result<Vec<SourceItem>> {
        let url = self.search_url()?;
        let body = self
            .http
            .get_text_bearer(url.as_str(), &self.token)
            .await
            .with_context(|| format!("github search '{}'", self.query))?;
        parse_repos(&body, self.limit)
    }

    fn name(&self) -> &str {
        "github"
    }
}
