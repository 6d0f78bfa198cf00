// src/builder.rs
//! Turns one discovered item into a `Deal`: classify, verify, infer, assemble.

use metrics::counter;

use crate::classify::{Classifier, Verdict};
use crate::config::KeywordConfig;
use crate::infer::{infer_category, infer_requirements};
use crate::ingest::types::SourceItem;
use crate::model::Deal;
use crate::verify::{PageFetcher, Verifier};

pub const APP_NAME_MAX_CHARS: usize = 140;

/// `scheme://host[:port]`; inputs without scheme or host come back unchanged.
pub fn normalize_site_url(raw: &str) -> String {
    let Ok(parsed) = url::Url::parse(raw) else {
        return raw.to_string();
    };
    let Some(host) = parsed.host_str() else {
        return raw.to_string();
    };
    match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub struct DealBuilder<'a, F> {
    classifier: &'a Classifier,
    keywords: &'a KeywordConfig,
    verifier: &'a Verifier<F>,
}

impl<'a, F: PageFetcher> DealBuilder<'a, F> {
    pub fn new(
        classifier: &'a Classifier,
        keywords: &'a KeywordConfig,
        verifier: &'a Verifier<F>,
    ) -> Self {
        Self {
            classifier,
            keywords,
            verifier,
        }
    }

    /// `None` when the classifier rejects the item. Verification problems
    /// never surface here; they only downgrade the deal to `Unverified`.
    pub async fn build(&self, item: &SourceItem) -> Option<Deal> {
        let blob = format!("{} {} {}", item.title, item.snippet, item.url)
            .trim()
            .to_string();

        let classification = match self.classifier.classify(&blob) {
            Verdict::Accepted(c) => c,
            Verdict::Rejected(reason) => {
                tracing::debug!(title = %item.title, %reason, "rejected");
                counter!("scan_rejected_total", "reason" => reason.slug()).increment(1);
                return None;
            }
        };

        let verification = self
            .verifier
            .verify(&item.url, &self.keywords.verification_keywords)
            .await;
        counter!("scan_verified_total", "status" => verification.status()).increment(1);

        Some(Deal {
            app_name: truncate_chars(&item.title, APP_NAME_MAX_CHARS),
            website_url: normalize_site_url(&item.url),
            promo_type: classification.promo_type,
            trial_length: classification.trial_length,
            requirements: infer_requirements(&blob).map(str::to_string),
            promo_code: classification.promo_code,
            source_urls: vec![item.url.clone()],
            date_found: item.discovered_at,
            category: infer_category(&blob, &self.keywords.categories).to_string(),
            notes: format!("{}: {}", item.source, item.title),
            verification,
        })
    }

    /// Build every item in order, one at a time. Output is not deduplicated.
    pub async fn build_all(&self, items: &[SourceItem]) -> Vec<Deal> {
        let mut deals = Vec::new();
        for item in items {
            if let Some(d) = self.build(item).await {
                deals.push(d);
            }
        }
        counter!("scan_deals_accepted_total").increment(deals.len() as u64);
        deals
    }
}
