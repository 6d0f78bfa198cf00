// src/api.rs
//! Read-only HTTP view over the deal store.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

use crate::export::{to_flat_records, FlatRecord};
use crate::store::{encode_date, DealStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    store: Arc<Mutex<DealStore>>,
}

impl AppState {
    pub fn new(store: DealStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/api/deals", get(list_deals))
        .route("/api/status", get(status))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Store failures surface as a 500 with a small JSON body.
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "store read failed");
        let body = serde_json::json!({ "error": self.0.to_string() });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct DealsOut {
    deals: Vec<FlatRecord>,
}

async fn list_deals(State(state): State<AppState>) -> Result<Json<DealsOut>, ApiError> {
    let deals = state.store.lock().await.fetch_all()?;
    Ok(Json(DealsOut {
        deals: to_flat_records(&deals),
    }))
}

#[derive(Serialize)]
struct StatusOut {
    status: &'static str,
    deals_count: usize,
    last_updated: Option<String>,
}

async fn status(State(state): State<AppState>) -> Result<Json<StatusOut>, ApiError> {
    let store = state.store.lock().await;
    let deals_count = store.count()?;
    let last_updated = store.last_found()?.as_ref().map(encode_date);
    Ok(Json(StatusOut {
        status: if deals_count == 0 { "empty" } else { "ok" },
        deals_count,
        last_updated,
    }))
}
