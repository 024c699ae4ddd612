use async_trait::async_trait;

use crate::error::AppResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
}

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> AppResult<Completion>;
}
