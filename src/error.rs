use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("failed to fetch ticket {issue_id}: {reason}")]
    Fetch { issue_id: String, reason: String },
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error("code host error: {0}")]
    CodeHost(String),
    #[error("code host rate limit reached: {0}")]
    RateLimited(String),
    #[error("language model error: {0}")]
    LanguageModel(String),
    #[error("malformed language model response: {0}")]
    MalformedResponse(String),
    #[error("failed to update ticket {issue_id}: {reason}")]
    Persist { issue_id: String, reason: String },
    #[error("failed to post feedback comment: {0}")]
    Notify(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// Rate limits are an expected degraded condition rather than a fault.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::RateLimited(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
