use async_trait::async_trait;

use crate::domain::context::CodeSnippet;
use crate::error::AppResult;

#[async_trait]
pub trait CodeHostService: Send + Sync {
    /// Searches code for `keywords`, returning at most `max_files` snippets.
    ///
    /// With `repository` set the search is limited to that repository,
    /// otherwise to the host's detected organization. Implementations return
    /// [`AppError::RateLimited`](crate::error::AppError::RateLimited) when the
    /// host throttles the request and an empty list when unconfigured.
    async fn search_code(
        &self,
        keywords: &[String],
        max_files: usize,
        repository: Option<&str>,
    ) -> AppResult<Vec<CodeSnippet>>;

    /// Organization or account the search falls back to, if any.
    async fn scope(&self) -> Option<String>;
}
