pub mod enrich;
pub mod error;
pub mod signature;
pub mod webhook;

use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::info;

use crate::config::TriggerMode;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::pipeline::EnrichmentPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: EnrichmentPipeline,
    pub webhook_secret: Option<String>,
    pub trigger_mode: TriggerMode,
}

impl AppState {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            webhook_secret: ctx.config.linear_webhook_secret.clone(),
            trigger_mode: ctx.config.trigger_mode,
            pipeline: EnrichmentPipeline::new(ctx),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/webhooks/linear", post(webhook::linear_webhook))
        .route("/enrich/{issue_id}", post(enrich::trigger_enrichment))
        .with_state(state)
}

pub async fn serve(state: AppState, address: &str) -> AppResult<()> {
    let listener = TcpListener::bind(address).await?;
    info!(address, "ticket-enricher listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
