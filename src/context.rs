use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{CodeHostService, IssueTrackerService, LanguageModelService};

/// Collaborators shared by every request, built once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
    pub code_host: Arc<dyn CodeHostService>,
    pub language_model: Arc<dyn LanguageModelService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        issue_tracker: Arc<dyn IssueTrackerService>,
        code_host: Arc<dyn CodeHostService>,
        language_model: Arc<dyn LanguageModelService>,
    ) -> Self {
        Self {
            config,
            issue_tracker,
            code_host,
            language_model,
        }
    }
}
