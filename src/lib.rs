// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod builder;
pub mod classify;
pub mod config;
pub mod dedup;
pub mod export;
pub mod http;
pub mod infer;
pub mod ingest;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod store;
pub mod throttle;
pub mod verify;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::classify::{Classifier, Verdict};
pub use crate::model::{Deal, PromoType, Verification};
pub use crate::pipeline::{Pipeline, ScanOutcome, ScanReport};
pub use crate::store::DealStore;
