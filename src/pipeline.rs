// src/pipeline.rs
//! One scan: discovery -> build (classify + verify) -> dedup -> upsert.
//! Every stage runs sequentially; network calls are awaited one at a time.

use anyhow::{Context, Result};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;

use crate::builder::DealBuilder;
use crate::classify::Classifier;
use crate::config::AppConfig;
use crate::dedup::dedup;
use crate::http::{build_client, HttpFetcher};
use crate::ingest::{self, providers, types::DiscoveryProvider};
use crate::model::Deal;
use crate::store::DealStore;
use crate::throttle::RateLimiter;
use crate::verify::{PageFetcher, Verifier};

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("scan_rejected_total", "Items rejected by the classifier, by reason.");
        describe_counter!("scan_deals_accepted_total", "Items that became deals.");
        describe_counter!("scan_verified_total", "Verification outcomes, by status.");
        describe_counter!(
            "scan_dedup_dropped_total",
            "Deals collapsed into an earlier one with the same identity."
        );
        describe_counter!("store_upserted_total", "Deals written to the store.");
        describe_histogram!("scan_duration_ms", "Wall time of a full scan in milliseconds.");
        describe_gauge!("scan_last_run_ts", "Unix ts when the last scan finished.");
    });
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub discovered: usize,
    pub accepted: usize,
    pub unique: usize,
    pub verified: usize,
    pub stored: usize,
}

#[derive(Debug)]
pub struct ScanOutcome {
    /// This run's deduplicated deals, in first-seen order.
    pub deals: Vec<Deal>,
    pub report: ScanReport,
}

pub struct Pipeline<F> {
    classifier: Classifier,
    config: AppConfig,
    providers: Vec<Box<dyn DiscoveryProvider>>,
    verifier: Verifier<F>,
}

impl Pipeline<HttpFetcher> {
    /// Production wiring: one client and one rate limiter shared by every
    /// provider and the verifier. GitHub search is enabled by `GITHUB_TOKEN`.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let [min, max] = config.sources.rate_limit_seconds;
        let limiter = Arc::new(RateLimiter::new(min, max).context("rate limiter")?);
        let http = HttpFetcher::new(build_client()?, Arc::clone(&limiter));
        let github_token = std::env::var(providers::github::ENV_GITHUB_TOKEN).ok();
        let providers = providers::from_config(&config.sources, &http, github_token.as_deref());
        let verifier = Verifier::new(http, limiter);
        Ok(Self::new(config, providers, verifier))
    }
}

impl<F: PageFetcher> Pipeline<F> {
    pub fn new(
        config: AppConfig,
        providers: Vec<Box<dyn DiscoveryProvider>>,
        verifier: Verifier<F>,
    ) -> Self {
        Self {
            classifier: Classifier::default(),
            config,
            providers,
            verifier,
        }
    }

    pub async fn run_once(&self, store: &mut DealStore) -> Result<ScanOutcome> {
        ensure_metrics_described();
        let t0 = std::time::Instant::now();

        tracing::info!(providers = self.providers.len(), "starting discovery");
        let items = ingest::discover_all(&self.providers).await;
        tracing::info!(items = items.len(), "discovered candidate items");

        let builder = DealBuilder::new(&self.classifier, &self.config.keywords, &self.verifier);
        let built = builder.build_all(&items).await;
        let accepted = built.len();
        tracing::info!(accepted, "accepted deals after filtering");

        let deals = dedup(built);
        counter!("scan_dedup_dropped_total").increment((accepted - deals.len()) as u64);

        let stored = store.upsert(&deals).context("storing deals")?;
        counter!("store_upserted_total").increment(stored as u64);
        tracing::info!(stored, "stored deals");

        let report = ScanReport {
            discovered: items.len(),
            accepted,
            unique: deals.len(),
            verified: deals.iter().filter(|d| d.verification.is_verified()).count(),
            stored,
        };

        histogram!("scan_duration_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        gauge!("scan_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

        Ok(ScanOutcome { deals, report })
    }
}
