use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use crate::config::TriggerMode;
use crate::server::AppState;
use crate::server::error::ApiError;
use crate::workflow::pipeline::Feedback;

#[derive(Debug, Default, Deserialize)]
pub struct EnrichParams {
    #[serde(default)]
    pub feedback: bool,
}

pub async fn trigger_enrichment(
    State(state): State<AppState>,
    Path(issue_id): Path<String>,
    Query(params): Query<EnrichParams>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let feedback = Feedback::from_flag(params.feedback);
    info!(
        issue_id = %issue_id,
        mode = state.trigger_mode.as_str(),
        feedback = params.feedback,
        "enrichment requested"
    );

    match state.trigger_mode {
        TriggerMode::Async => {
            state.pipeline.spawn(issue_id.clone(), feedback);
            Ok((
                StatusCode::ACCEPTED,
                Json(json!({ "status": "accepted", "issueId": issue_id })),
            ))
        }
        TriggerMode::Sync => match state.pipeline.run(&issue_id, feedback).await {
            Ok(outcome) => Ok((
                StatusCode::OK,
                Json(json!({
                    "status": "completed",
                    "issueId": issue_id,
                    "identifier": outcome.identifier,
                    "title": outcome.result.title,
                    "sources": outcome.sources,
                })),
            )),
            Err(error) => Err(ApiError::EnrichmentFailed { issue_id, error }),
        },
    }
}
