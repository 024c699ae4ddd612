pub mod code_host;
pub mod issue_tracker;
pub mod language_model;

pub use code_host::CodeHostService;
pub use issue_tracker::IssueTrackerService;
pub use language_model::{Completion, LanguageModelService, TokenUsage};
