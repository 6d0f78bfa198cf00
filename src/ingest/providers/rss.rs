// src/ingest/providers/rss.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::histogram;
use quick_xml::de::from_str;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

use crate::http::HttpFetcher;
use crate::ingest::types::{DiscoveryProvider, SourceItem};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    description: Option<String>,
}

fn parse_rfc2822(ts: &str) -> Option<DateTime<Utc>> {
    let unix = OffsetDateTime::parse(ts.trim(), &Rfc2822).ok()?.unix_timestamp();
    DateTime::from_timestamp(unix, 0)
}

/// Any RSS 2.0 feed (Product Hunt, blogs, launch aggregators).
pub struct RssFeedProvider {
    name: String,
    mode: Mode,
    limit: usize,
}

enum Mode {
    Fixture(String),
    Http { url: String, http: HttpFetcher },
}

impl RssFeedProvider {
    pub fn from_url(
        name: impl Into<String>,
        url: impl Into<String>,
        http: HttpFetcher,
        limit: usize,
    ) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                http,
            },
            limit,
        }
    }

    /// Parse an in-memory document instead of fetching; used by tests and
    /// offline runs.
    pub fn from_fixture_str(name: impl Into<String>, xml: &str, limit: usize) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(xml.to_string()),
            limit,
        }
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<SourceItem>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean).context("parsing rss xml")?;

        let mut out = Vec::with_capacity(rss.channel.item.len().min(self.limit));
        for it in rss.channel.item {
            let (Some(title), Some(link)) = (it.title, it.link) else {
                continue;
            };
            if title.trim().is_empty() || link.trim().is_empty() {
                continue;
            }
            out.push(SourceItem {
                title,
                url: link.trim().to_string(),
                source: self.name.clone(),
                snippet: it.description.unwrap_or_default(),
                discovered_at: Utc::now(),
                published_at: it.pub_date.as_deref().and_then(parse_rfc2822),
            });
            if out.len() >= self.limit {
                break;
            }
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("discovery_parse_ms", "provider" => self.name.clone()).record(ms);
        Ok(out)
    }
}

#[async_trait]
impl DiscoveryProvider for RssFeedProvider {
    async fn discover(&self) -> Result<Vec<SourceItem>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { url, http } => {
                let body = http
                    .get_text(url)
                    .await
                    .with_context(|| format!("fetching feed {}", self.name))?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// Feeds routinely carry HTML entities that are not valid XML.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Launches</title>
    <item>
      <title>PixelForge &ndash; AI image studio</title>
      <link>https://pixelforge.example/launch</link>
      <pubDate>Tue, 10 Jun 2025 09:30:00 +0000</pubDate>
      <description>Free plan for hobbyists</description>
    </item>
    <item>
      <title>No link here</title>
    </item>
    <item>
      <title>Scribe</title>
      <link>https://scribe.example</link>
    </item>
  </channel>
</rss>"#;

    #[tokio::test]
    async fn parses_items_and_skips_incomplete_ones() {
        let p = RssFeedProvider::from_fixture_str("producthunt", FEED, 10);
        let items = p.discover().await.expect("feed parses");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "PixelForge - AI image studio");
        assert_eq!(items[0].source, "producthunt");
        assert_eq!(items[0].snippet, "Free plan for hobbyists");
        assert_eq!(
            items[0].published_at.map(|d| d.timestamp()),
            Some(1_749_547_800)
        );
        assert_eq!(items[1].published_at, None);
        assert_eq!(items[1].url, "https://scribe.example");
    }

    #[tokio::test]
    async fn old_pub_date_does_not_backdate_discovery() {
        let feed = r#"<rss version="2.0"><channel><item>
            <title>Old launch</title>
            <link>https://old.example</link>
            <pubDate>Mon, 01 Jan 2018 00:00:00 +0000</pubDate>
        </item></channel></rss>"#;
        let before = Utc::now();
        let items = RssFeedProvider::from_fixture_str("feed", feed, 10)
            .discover()
            .await
            .unwrap();
        assert!(items[0].discovered_at >= before);
        assert_eq!(
            items[0].published_at.map(|d| d.timestamp()),
            Some(1_514_764_800)
        );
    }

    #[tokio::test]
    async fn respects_limit() {
        let p = RssFeedProvider::from_fixture_str("producthunt", FEED, 1);
        assert_eq!(p.discover().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_feed_is_an_error() {
        let p = RssFeedProvider::from_fixture_str("broken", "<rss><chan", 10);
        assert!(p.discover().await.is_err());
    }
}
