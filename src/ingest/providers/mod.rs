// src/ingest/providers/mod.rs
pub mod fixture;
pub mod github;
pub mod hackernews;
pub mod reddit;
pub mod rss;

use crate::config::SourcesConfig;
use crate::http::HttpFetcher;
use crate::ingest::types::DiscoveryProvider;

pub use fixture::FixtureProvider;
pub use github::GithubProvider;
pub use hackernews::HackerNewsProvider;
pub use reddit::RedditProvider;
pub use rss::RssFeedProvider;

/// Instantiate every provider the sources config names, in config order:
/// fixture files, RSS feeds, Hacker News queries, GitHub queries, then
/// every subreddit/query pair. GitHub providers need a token.
pub fn from_config(
    cfg: &SourcesConfig,
    http: &HttpFetcher,
    github_token: Option<&str>,
) -> Vec<Box<dyn DiscoveryProvider>> {
    let limit = cfg.max_results_per_source;
    let mut out: Vec<Box<dyn DiscoveryProvider>> = Vec::new();
    for path in &cfg.fixture_files {
        out.push(Box::new(FixtureProvider::new(path.clone(), limit)));
    }
    for feed in &cfg.rss_feeds {
        out.push(Box::new(RssFeedProvider::from_url(
            feed.name.clone(),
            feed.url.clone(),
            http.clone(),
            limit,
        )));
    }
    for q in &cfg.hackernews_queries {
        out.push(Box::new(HackerNewsProvider::new(q.clone(), http.clone(), limit)));
    }
    match github_token.filter(|t| !t.trim().is_empty()) {
        Some(token) => {
            for q in &cfg.github_queries {
                out.push(Box::new(GithubProvider::new(
                    q.clone(),
                    token,
                    http.clone(),
                    limit,
                )));
            }
        }
        None if !cfg.github_queries.is_empty() => {
            tracing::debug!(
                queries = cfg.github_queries.len(),
                "no {} set; skipping github search",
                github::ENV_GITHUB_TOKEN
            );
        }
        None => {}
    }
    for sub in &cfg.subreddits {
        for q in &cfg.reddit_queries {
            out.push(Box::new(RedditProvider::new(
                sub.clone(),
                q.clone(),
                http.clone(),
                limit,
            )));
        }
    }
    tracing::debug!(providers = out.len(), "discovery providers ready");
    out
}
