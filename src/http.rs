// src/http.rs
//! Shared outbound HTTP plumbing: one client, rotating desktop User-Agents,
//! and every request paced through the shared [`RateLimiter`].

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::throttle::RateLimiter;
use crate::verify::{FetchOutcome, PageFetcher};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
];

pub fn pick_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

pub fn build_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("building http client")
}

/// GET client shared by discovery and verification.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    limiter: Arc<RateLimiter>,
}

impl HttpFetcher {
    pub fn new(client: Client, limiter: Arc<RateLimiter>) -> Self {
        Self { client, limiter }
    }

    /// Rate-limited GET returning the body of a 2xx response, or an error
    /// naming the status / transport cause. Used by discovery providers, which
    /// treat any failure as "no items".
    pub async fn get_text(&self, url: &str) -> Result<String> {
        self.get_text_with(url, None).await
    }

    /// Same as [`get_text`](Self::get_text) with an `Authorization: Bearer` header.
    pub async fn get_text_bearer(&self, url: &str, token: &str) -> Result<String> {
        self.get_text_with(url, Some(token)).await
    }

    async fn get_text_with(&self, url: &str, bearer: Option<&str>) -> Result<String> {
        self.limiter.acquire().await;
        match self.send(url, bearer).await {
            FetchOutcome::Page(body) => Ok(body),
            FetchOutcome::Status(code) => anyhow::bail!("HTTP {code} for {url}"),
            FetchOutcome::Transport(cause) => anyhow::bail!("request to {url} failed: {cause}"),
        }
    }

    async fn send(&self, url: &str, bearer: Option<&str>) -> FetchOutcome {
        let mut req = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, pick_user_agent());
        if let Some(token) = bearer {
            req = req.bearer_auth(token);
        }
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(error = %e, %url, "request failed");
                return FetchOutcome::Transport(e.to_string());
            }
        };
        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), %url, "non-2xx response");
            return FetchOutcome::Status(status.as_u16());
        }
        match resp.text().await {
            Ok(body) => FetchOutcome::Page(body),
            Err(e) => FetchOutcome::Transport(e.to_string()),
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    // Pacing is the verifier's job; it acquires the limiter before calling us.
    async fn fetch(&self, url: &str) -> FetchOutcome {
        self.send(url, None).await
    }
}
