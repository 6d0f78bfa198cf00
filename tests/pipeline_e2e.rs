// tests/pipeline_e2e.rs
//
// Full scan over a fixture file: hygiene, classification, verification
// (stubbed), dedup and storage. No network.

use std::sync::Arc;

use aisubscalp::config::{AppConfig, KeywordConfig, SourcesConfig};
use aisubscalp::ingest::providers::{FixtureProvider, RssFeedProvider};
use aisubscalp::ingest::types::DiscoveryProvider;
use aisubscalp::throttle::RateLimiter;
use aisubscalp::verify::{FetchOutcome, PageFetcher, Verifier};
use aisubscalp::{DealStore, Pipeline, PromoType, ScanReport, Verification};
use async_trait::async_trait;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/items.json");

/// Every landing page advertises a free trial, except the open-source one.
struct StubPages;

#[async_trait]
impl PageFetcher for StubPages {
    async fn fetch(&self, url: &str) -> FetchOutcome {
        if url.contains("pixels.example") {
            FetchOutcome::Status(503)
        } else {
            FetchOutcome::Page("<h1>Start your FREE TRIAL today</h1>".into())
        }
    }
}

fn pipeline(fixture: &str) -> Pipeline<StubPages> {
    let providers: Vec<Box<dyn DiscoveryProvider>> =
        vec![Box::new(FixtureProvider::new(fixture, 60))];
    pipeline_with(providers)
}

fn pipeline_with(providers: Vec<Box<dyn DiscoveryProvider>>) -> Pipeline<StubPages> {
    let mut keywords = KeywordConfig {
        verification_keywords: vec!["free trial".into()],
        ..Default::default()
    };
    keywords
        .categories
        .insert("Image".into(), vec!["image".into()]);
    keywords
        .categories
        .insert("Productivity".into(), vec!["tool".into()]);

    let config = AppConfig {
        keywords,
        sources: SourcesConfig::default(),
    };
    let verifier = Verifier::new(StubPages, Arc::new(RateLimiter::disabled()));
    Pipeline::new(config, providers, verifier)
}

#[tokio::test]
async fn scan_filters_dedups_and_stores() {
    let p = pipeline(FIXTURE);
    let mut store = DealStore::open_in_memory().unwrap();

    let outcome = p.run_once(&mut store).await.expect("scan");
    assert_eq!(
        outcome.report,
        ScanReport {
            discovered: 5, // the twitter link is dropped by hygiene
            accepted: 3,
            unique: 2,
            verified: 1,
            stored: 2,
        }
    );

    // first-seen order, last occurrence's values
    let amazing = &outcome.deals[0];
    assert_eq!(amazing.app_name, "Amazing AI tool with a free trial for 14 days.");
    assert_eq!(amazing.website_url, "https://amazing.example");
    assert_eq!(amazing.promo_type, PromoType::FreeTrial);
    assert_eq!(amazing.trial_length.as_deref(), Some("14 day"));
    assert_eq!(amazing.category, "Productivity");
    assert_eq!(
        amazing.notes,
        "producthunt: Amazing AI tool with a free trial for 14 days."
    );
    assert_eq!(amazing.source_urls, vec!["https://amazing.example/launch".to_string()]);
    assert_eq!(amazing.verification, Verification::Verified);

    let pixels = &outcome.deals[1];
    assert_eq!(pixels.promo_type, PromoType::OpenSource);
    assert_eq!(pixels.category, "Image");
    assert_eq!(pixels.verification, Verification::unverified("HTTP 503"));

    // newest date_found first
    let stored = store.fetch_all().unwrap();
    assert_eq!(stored, outcome.deals);
}

#[tokio::test]
async fn rescanning_the_same_input_is_idempotent() {
    let p = pipeline(FIXTURE);
    let mut store = DealStore::open_in_memory().unwrap();

    p.run_once(&mut store).await.unwrap();
    let first = store.fetch_all().unwrap();
    p.run_once(&mut store).await.unwrap();

    assert_eq!(store.count().unwrap(), 2);
    assert_eq!(store.fetch_all().unwrap(), first);
}

#[tokio::test]
async fn missing_fixture_yields_an_empty_scan() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let p = pipeline(missing.to_str().unwrap());
    let mut store = DealStore::open_in_memory().unwrap();

    let outcome = p.run_once(&mut store).await.expect("provider errors are not fatal");
    assert_eq!(outcome.report, ScanReport::default());
    assert_eq!(store.count().unwrap(), 0);
}

#[tokio::test]
async fn date_found_is_scan_time_not_publication_time() {
    let feed = r#"<rss version="2.0"><channel><item>
        <title>Open source AI notes app</title>
        <link>https://notes.example/launch</link>
        <pubDate>Mon, 01 Jan 2018 00:00:00 +0000</pubDate>
    </item></channel></rss>"#;
    let p = pipeline_with(vec![Box::new(RssFeedProvider::from_fixture_str(
        "launches", feed, 60,
    ))]);
    let mut store = DealStore::open_in_memory().unwrap();

    let before = chrono::Utc::now();
    p.run_once(&mut store).await.unwrap();

    let stored = store.fetch_all().unwrap();
    assert_eq!(stored.len(), 1);
    assert!(stored[0].date_found >= before, "got {}", stored[0].date_found);
    assert!(store.last_found().unwrap().unwrap() >= before);
}
