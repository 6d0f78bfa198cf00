// src/verify.rs
//! Landing-page verification: the fetch itself is a collaborator
//! ([`PageFetcher`]); [`assess`] is the pure decision over its outcome.

use async_trait::async_trait;
use std::sync::Arc;

use crate::model::Verification;
use crate::throttle::RateLimiter;

/// What a single page fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 2xx response body.
    Page(String),
    /// Any non-2xx status code.
    Status(u16),
    /// DNS/connect/timeout/body-read failure.
    Transport(String),
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchOutcome;
}

pub fn assess(outcome: FetchOutcome, keywords: &[String]) -> Verification {
    match outcome {
        FetchOutcome::Transport(cause) => {
            Verification::unverified(format!("Request failed: {cause}"))
        }
        FetchOutcome::Status(code) => Verification::unverified(format!("HTTP {code}")),
        FetchOutcome::Page(body) => {
            let content = body.to_lowercase();
            let hit = keywords
                .iter()
                .any(|k| !k.is_empty() && content.contains(&k.to_lowercase()));
            if hit {
                Verification::Verified
            } else {
                Verification::unverified("Verification keywords missing")
            }
        }
    }
}

pub struct Verifier<F> {
    fetcher: F,
    limiter: Arc<RateLimiter>,
}

impl<F: PageFetcher> Verifier<F> {
    pub fn new(fetcher: F, limiter: Arc<RateLimiter>) -> Self {
        Self { fetcher, limiter }
    }

    /// Never fails: every problem becomes an `Unverified` reason.
    pub async fn verify(&self, url: &str, keywords: &[String]) -> Verification {
        self.limiter.acquire().await;
        let outcome = self.fetcher.fetch(url).await;
        let v = assess(outcome, keywords);
        if let Verification::Unverified { reason } = &v {
            tracing::debug!(%url, %reason, "verification failed");
        }
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn kws() -> Vec<String> {
        vec!["Free Trial".into(), "open source".into()]
    }

    #[test]
    fn assess_covers_every_outcome() {
        assert_eq!(
            assess(FetchOutcome::Transport("timed out".into()), &kws()),
            Verification::unverified("Request failed: timed out")
        );
        assert_eq!(
            assess(FetchOutcome::Status(503), &kws()),
            Verification::unverified("HTTP 503")
        );
        assert_eq!(
            assess(FetchOutcome::Page("<h1>Start your FREE TRIAL</h1>".into()), &kws()),
            Verification::Verified
        );
        assert_eq!(
            assess(FetchOutcome::Page("<h1>Pricing</h1>".into()), &kws()),
            Verification::unverified("Verification keywords missing")
        );
    }

    #[test]
    fn empty_keyword_list_never_verifies() {
        assert!(!assess(FetchOutcome::Page("anything".into()), &[]).is_verified());
    }

    struct Recorder(Mutex<Vec<String>>);

    #[async_trait]
    impl PageFetcher for Recorder {
        async fn fetch(&self, url: &str) -> FetchOutcome {
            self.0.lock().unwrap().push(url.to_string());
            FetchOutcome::Page("open source, MIT licensed".into())
        }
    }

    #[tokio::test]
    async fn verifier_fetches_requested_url() {
        let v = Verifier::new(
            Recorder(Mutex::new(Vec::new())),
            Arc::new(RateLimiter::disabled()),
        );
        let out = v.verify("https://tool.example/pricing", &kws()).await;
        assert!(out.is_verified());
        assert_eq!(
            v.fetcher.0.lock().unwrap().as_slice(),
            ["https://tool.example/pricing".to_string()]
        );
    }
}
