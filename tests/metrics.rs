// tests/metrics.rs
//
// One test per process: the Prometheus recorder is global.

use std::sync::Arc;

use aisubscalp::config::{AppConfig, KeywordConfig, SourcesConfig};
use aisubscalp::ingest::providers::FixtureProvider;
use aisubscalp::ingest::types::DiscoveryProvider;
use aisubscalp::metrics::Metrics;
use aisubscalp::throttle::RateLimiter;
use aisubscalp::verify::{FetchOutcome, PageFetcher, Verifier};
use aisubscalp::{DealStore, Pipeline};
use async_trait::async_trait;
use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

struct Offline;

#[async_trait]
impl PageFetcher for Offline {
    async fn fetch(&self, _url: &str) -> FetchOutcome {
        FetchOutcome::Transport("offline".into())
    }
}

#[tokio::test]
async fn metrics_endpoint_reports_scan_series() {
    let metrics = Metrics::init().expect("recorder installs once");

    let providers: Vec<Box<dyn DiscoveryProvider>> = vec![Box::new(FixtureProvider::new(
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/items.json"),
        60,
    ))];
    let config = AppConfig {
        keywords: KeywordConfig::default(),
        sources: SourcesConfig::default(),
    };
    let pipeline = Pipeline::new(
        config,
        providers,
        Verifier::new(Offline, Arc::new(RateLimiter::disabled())),
    );
    let mut store = DealStore::open_in_memory().unwrap();
    pipeline.run_once(&mut store).await.unwrap();

    let resp = metrics
        .router()
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for series in [
        "scan_items_discovered_total",
        "scan_rejected_total",
        "scan_deals_accepted_total",
        "scan_dedup_dropped_total",
        "store_upserted_total",
        "scan_last_run_ts",
    ] {
        assert!(text.contains(series), "missing {series} in:\n{text}");
    }
    assert!(text.contains(r#"reason="partial_discount""#));
    assert!(text.contains(r#"status="Unverified""#));
    assert!(Metrics::init().is_err(), "second recorder must be refused");
}
