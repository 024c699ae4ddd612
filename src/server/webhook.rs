use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::webhook::WebhookEvent;
use crate::error::AppError;
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::server::signature::{SIGNATURE_HEADER, verify};
use crate::workflow::pipeline::Feedback;

/// Acknowledgment for an accepted webhook delivery.
pub struct WebhookAck {
    pub event_type: String,
    pub issue_id: Option<String>,
    /// Background enrichment started by this delivery, if any.
    pub task: Option<JoinHandle<()>>,
}

impl WebhookAck {
    fn body(&self) -> Value {
        json!({
            "accepted": true,
            "eventType": self.event_type,
            "issueId": self.issue_id,
        })
    }
}

/// Authenticates a delivery and starts enrichment for `/enrich` comments.
///
/// Signature checks only apply when a webhook secret is configured. The
/// pipeline is never awaited here; its outcome does not affect the response.
pub fn handle_webhook(
    state: &AppState,
    raw_body: &[u8],
    signature: Option<&str>,
) -> Result<WebhookAck, ApiError> {
    if let Some(secret) = state.webhook_secret.as_deref() {
        if !verify(raw_body, signature, Some(secret)) {
            warn!(signature_present = signature.is_some(), "rejected webhook with invalid signature");
            return Err(ApiError::Unauthorized(AppError::Authentication(
                "invalid Linear signature".to_string(),
            )));
        }
    }

    let event = WebhookEvent::parse(raw_body).unwrap_or_default();
    let event_type = event.event_type().to_string();
    let issue_id = event.subject_id().map(str::to_string);

    let task = match event.enrich_target() {
        Some(target) => {
            info!(issue_id = target, "enrich command received");
            Some(state.pipeline.spawn(target.to_string(), Feedback::Enabled))
        }
        None => {
            debug!(event_type = %event_type, action = ?event.action, "webhook ignored");
            None
        }
    };

    Ok(WebhookAck {
        event_type,
        issue_id,
        task,
    })
}

pub async fn linear_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());
    let ack = handle_webhook(&state, &body, signature)?;
    Ok((StatusCode::ACCEPTED, Json(ack.body())))
}
