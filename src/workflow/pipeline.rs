use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::context::AppContext;
use crate::domain::context::EnrichmentContext;
use crate::domain::ticket::{EnrichmentResult, TicketUpdate};
use crate::error::{AppError, AppResult};
use crate::workflow::context::gather_context;
use crate::workflow::enrich::enrich;

pub const STARTED_COMMENT: &str = "Enrichment in progress...";
pub const COMPLETED_COMMENT: &str = "Enrichment complete: title and description updated.";
pub const FAILED_COMMENT: &str = "Enrichment failed. Check the logs for details.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    GatheringContext,
    Enriching,
    Persisting,
    Notifying,
    Done,
    Failed,
}

/// Whether progress comments are posted on the ticket during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Enabled,
    Disabled,
}

impl Feedback {
    pub fn from_flag(enabled: bool) -> Self {
        if enabled {
            Feedback::Enabled
        } else {
            Feedback::Disabled
        }
    }
}

#[derive(Debug, Clone)]
pub struct EnrichmentOutcome {
    pub identifier: String,
    pub result: EnrichmentResult,
    /// Organizations and similar tickets credited in the description footer.
    pub sources: Vec<String>,
}

#[derive(Clone)]
pub struct EnrichmentPipeline {
    ctx: AppContext,
}

impl EnrichmentPipeline {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Runs the pipeline to completion and reports its outcome.
    pub async fn run(&self, issue_id: &str, feedback: Feedback) -> AppResult<EnrichmentOutcome> {
        if feedback == Feedback::Enabled {
            self.post_feedback(issue_id, STARTED_COMMENT).await;
        }

        let mut stage = Stage::Fetching;
        match self.execute(issue_id, &mut stage).await {
            Ok(outcome) => {
                if feedback == Feedback::Enabled {
                    stage = Stage::Notifying;
                    debug!(issue_id, ?stage, "posting completion feedback");
                    self.post_feedback(issue_id, COMPLETED_COMMENT).await;
                }
                stage = Stage::Done;
                info!(issue_id, identifier = %outcome.identifier, ?stage, "enrichment complete");
                Ok(outcome)
            }
            Err(err) => {
                error!(issue_id, ?stage, error = %err, "enrichment failed");
                if feedback == Feedback::Enabled {
                    self.post_feedback(issue_id, FAILED_COMMENT).await;
                }
                stage = Stage::Failed;
                info!(issue_id, ?stage, "enrichment aborted");
                Err(err)
            }
        }
    }

    /// Starts the pipeline on a background task. The outcome is only logged.
    pub fn spawn(&self, issue_id: String, feedback: Feedback) -> JoinHandle<()> {
        let pipeline = self.clone();
        tokio::spawn(async move {
            if let Err(err) = pipeline.run(&issue_id, feedback).await {
                error!(issue_id = %issue_id, error = %err, "detached enrichment failed");
            }
        })
    }

    async fn execute(&self, issue_id: &str, stage: &mut Stage) -> AppResult<EnrichmentOutcome> {
        *stage = Stage::Fetching;
        let ticket = self
            .ctx
            .issue_tracker
            .get_ticket(issue_id)
            .await
            .map_err(|err| match err {
                AppError::Fetch { .. } => err,
                other => AppError::Fetch {
                    issue_id: issue_id.to_string(),
                    reason: other.to_string(),
                },
            })?;
        info!(issue_id, identifier = %ticket.identifier, "issue fetched, gathering context");

        *stage = Stage::GatheringContext;
        let context = gather_context(&self.ctx, &ticket).await;

        *stage = Stage::Enriching;
        let result = enrich(&self.ctx, &ticket, Some(&context)).await?;

        *stage = Stage::Persisting;
        let sources = credited_sources(&context);
        let update = TicketUpdate {
            title: result.title.clone(),
            description: with_sources_footer(&result.description, &sources),
        };
        self.ctx
            .issue_tracker
            .update_ticket(&ticket.id, &update)
            .await
            .map_err(|err| match err {
                AppError::Persist { .. } => err,
                other => AppError::Persist {
                    issue_id: ticket.id.clone(),
                    reason: other.to_string(),
                },
            })?;

        Ok(EnrichmentOutcome {
            identifier: ticket.identifier,
            result,
            sources,
        })
    }

    /// Posts a feedback comment. Failures are logged and never abort the run.
    async fn post_feedback(&self, issue_id: &str, body: &str) {
        if let Err(err) = self.notify(issue_id, body).await {
            warn!(issue_id, error = %err, "feedback comment not posted");
        }
    }

    async fn notify(&self, issue_id: &str, body: &str) -> AppResult<()> {
        self.ctx
            .issue_tracker
            .post_comment(issue_id, body)
            .await
            .map_err(|err| AppError::Notify(err.to_string()))
    }
}

fn credited_sources(context: &EnrichmentContext) -> Vec<String> {
    let mut sources = Vec::new();
    let organizations = context.organizations();
    if !organizations.is_empty() {
        let names = organizations
            .into_iter()
            .map(|organization| format!("`{organization}`"))
            .collect::<Vec<_>>()
            .join(", ");
        sources.push(format!("Code from GitHub organization {names}"));
    }
    if !context.similar_tickets.is_empty() {
        let identifiers = context
            .similar_tickets
            .iter()
            .map(|similar| similar.identifier.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        sources.push(format!("Similar tickets: {identifiers}"));
    }
    sources
}

fn with_sources_footer(description: &str, sources: &[String]) -> String {
    if sources.is_empty() {
        return description.to_string();
    }
    let lines = sources
        .iter()
        .map(|source| format!("- {source}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{description}\n\n---\n**Sources used**\n{lines}")
}
