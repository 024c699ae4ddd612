//! Hand-written service fakes shared by unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::context::CodeSnippet;
use crate::domain::ticket::{SimilarTicket, SimilarTicketQuery, Ticket, TicketUpdate};
use crate::error::{AppError, AppResult};
use crate::services::{
    CodeHostService, Completion, IssueTrackerService, LanguageModelService, TokenUsage,
};

pub fn sample_ticket(identifier: &str) -> Ticket {
    Ticket {
        id: format!("{identifier}-uuid"),
        identifier: identifier.to_string(),
        title: "Invoice export times out".to_string(),
        description: Some("Exporting more than 500 invoices to CSV fails after 30s.".to_string()),
        status: Some("Todo".to_string()),
        labels: vec!["billing".to_string(), "bug".to_string()],
        assignee: Some("Sam".to_string()),
        project: Some("Payments".to_string()),
        team_id: Some("team-1".to_string()),
    }
}

pub fn similar_ticket(identifier: &str) -> SimilarTicket {
    SimilarTicket {
        identifier: identifier.to_string(),
        title: "Speed up PDF export".to_string(),
        description: Some("Moved export to a background job.".to_string()),
        status: Some("Done".to_string()),
    }
}

pub fn snippet(repository: &str, path: &str) -> CodeSnippet {
    CodeSnippet {
        repository: repository.to_string(),
        path: path.to_string(),
        content: "pub fn export() {}".to_string(),
        match_reason: "Matched: invoice, export".to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackerCall {
    GetTicket(String),
    Update(String, TicketUpdate),
    Comment(String, String),
    Search(String, Option<String>, usize),
    Attachments(String),
}

pub struct FakeTracker {
    ticket: Option<Ticket>,
    similar: Option<Vec<SimilarTicket>>,
    attachment_repository: Option<String>,
    fail_update: bool,
    fail_comments: bool,
    calls: Mutex<Vec<TrackerCall>>,
}

impl FakeTracker {
    pub fn with_ticket(ticket: Ticket) -> Self {
        Self {
            ticket: Some(ticket),
            similar: Some(Vec::new()),
            attachment_repository: None,
            fail_update: false,
            fail_comments: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn missing_ticket() -> Self {
        Self {
            ticket: None,
            ..Self::with_ticket(sample_ticket("ENG-0"))
        }
    }

    pub fn similar(mut self, similar: Vec<SimilarTicket>) -> Self {
        self.similar = Some(similar);
        self
    }

    pub fn failing_search(mut self) -> Self {
        self.similar = None;
        self
    }

    pub fn attachment_repository(mut self, repository: &str) -> Self {
        self.attachment_repository = Some(repository.to_string());
        self
    }

    pub fn failing_update(mut self) -> Self {
        self.fail_update = true;
        self
    }

    pub fn failing_comments(mut self) -> Self {
        self.fail_comments = true;
        self
    }

    pub fn calls(&self) -> Vec<TrackerCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TrackerCall::GetTicket(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(String, TicketUpdate)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TrackerCall::Update(id, update) => Some((id, update)),
                _ => None,
            })
            .collect()
    }

    pub fn comments(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TrackerCall::Comment(_, body) => Some(body),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: TrackerCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IssueTrackerService for FakeTracker {
    async fn get_ticket(&self, issue_id: &str) -> AppResult<Ticket> {
        self.record(TrackerCall::GetTicket(issue_id.to_string()));
        self.ticket.clone().ok_or_else(|| AppError::Fetch {
            issue_id: issue_id.to_string(),
            reason: "issue not found".to_string(),
        })
    }

    async fn update_ticket(&self, issue_id: &str, update: &TicketUpdate) -> AppResult<()> {
        self.record(TrackerCall::Update(issue_id.to_string(), update.clone()));
        if self.fail_update {
            return Err(AppError::Persist {
                issue_id: issue_id.to_string(),
                reason: "update rejected".to_string(),
            });
        }
        Ok(())
    }

    async fn post_comment(&self, issue_id: &str, body: &str) -> AppResult<()> {
        self.record(TrackerCall::Comment(issue_id.to_string(), body.to_string()));
        if self.fail_comments {
            return Err(AppError::IssueTracker("comment rejected".to_string()));
        }
        Ok(())
    }

    async fn search_similar_tickets(
        &self,
        query: &str,
        options: &SimilarTicketQuery,
    ) -> AppResult<Vec<SimilarTicket>> {
        self.record(TrackerCall::Search(
            query.to_string(),
            options.team_id.clone(),
            options.max_results,
        ));
        self.similar
            .clone()
            .ok_or_else(|| AppError::IssueTracker("search unavailable".to_string()))
    }

    async fn repository_from_attachments(&self, issue_id: &str) -> AppResult<Option<String>> {
        self.record(TrackerCall::Attachments(issue_id.to_string()));
        Ok(self.attachment_repository.clone())
    }
}

pub enum CodeOutcome {
    Snippets(Vec<CodeSnippet>),
    RateLimited,
    Fails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSearch {
    pub keywords: Vec<String>,
    pub max_files: usize,
    pub repository: Option<String>,
}

pub struct FakeCodeHost {
    outcome: CodeOutcome,
    scope: Option<String>,
    searches: Mutex<Vec<CodeSearch>>,
}

impl FakeCodeHost {
    pub fn new(outcome: CodeOutcome) -> Self {
        Self {
            outcome,
            scope: None,
            searches: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(CodeOutcome::Snippets(Vec::new()))
    }

    pub fn with_scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    pub fn searches(&self) -> Vec<CodeSearch> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl CodeHostService for FakeCodeHost {
    async fn search_code(
        &self,
        keywords: &[String],
        max_files: usize,
        repository: Option<&str>,
    ) -> AppResult<Vec<CodeSnippet>> {
        self.searches.lock().unwrap().push(CodeSearch {
            keywords: keywords.to_vec(),
            max_files,
            repository: repository.map(str::to_string),
        });
        match &self.outcome {
            CodeOutcome::Snippets(snippets) => Ok(snippets.clone()),
            CodeOutcome::RateLimited => Err(AppError::RateLimited("403 Forbidden".to_string())),
            CodeOutcome::Fails => Err(AppError::CodeHost("search exploded".to_string())),
        }
    }

    async fn scope(&self) -> Option<String> {
        self.scope.clone()
    }
}

pub struct FakeLanguageModel {
    response: Result<String, String>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl FakeLanguageModel {
    pub fn replying(text: &str) -> Self {
        Self {
            response: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModelService for FakeLanguageModel {
    async fn complete(&self, system: &str, prompt: &str) -> AppResult<Completion> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        match &self.response {
            Ok(text) => Ok(Completion {
                text: text.clone(),
                usage: TokenUsage {
                    input_tokens: 100,
                    output_tokens: 50,
                },
            }),
            Err(message) => Err(AppError::LanguageModel(message.clone())),
        }
    }
}

pub fn test_config(webhook_secret: Option<&str>) -> AppConfig {
    let secret = webhook_secret.map(str::to_string);
    AppConfig::from_lookup(|key| match key {
        "LINEAR_WEBHOOK_SECRET" => secret.clone(),
        _ => None,
    })
    .expect("default test config")
}

pub fn app_context(
    config: AppConfig,
    tracker: Arc<FakeTracker>,
    code_host: Arc<FakeCodeHost>,
    language_model: Arc<FakeLanguageModel>,
) -> AppContext {
    AppContext::new(config, tracker, code_host, language_model)
}
