use serde::Deserialize;
use tracing::{debug, info};

use crate::context::AppContext;
use crate::domain::context::EnrichmentContext;
use crate::domain::ticket::{EnrichmentResult, Ticket};
use crate::error::{AppError, AppResult};
use crate::workflow::prompt::build_prompt;

pub const SYSTEM_PROMPT: &str = "You are an expert engineering assistant that enriches development tickets.
Given a ticket's details and additional context (similar past tickets, relevant code), produce an improved title and a rich markdown description that helps the developer get started quickly.

You must respond with a JSON object containing exactly two fields:
- \"title\": a clear, concise ticket title (keep it short, under 80 chars)
- \"description\": a rich markdown description that includes:
  - A summary of the task
  - Technical context: what area of the codebase is likely involved (use the provided code snippets if available)
  - Implementation suggestions: concrete steps or approach (reference similar past tickets if relevant)
  - Clarification questions: anything ambiguous that should be clarified

When similar past tickets are provided, use them to reference how similar work was done before and identify patterns.
When code snippets are provided, use them to identify the specific files and functions likely involved.

Keep it actionable. Write in the same language as the ticket.
Respond ONLY with the JSON object, no other text.";

/// Asks the language model for an improved title and description.
pub async fn enrich(
    ctx: &AppContext,
    ticket: &Ticket,
    context: Option<&EnrichmentContext>,
) -> AppResult<EnrichmentResult> {
    debug!(identifier = %ticket.identifier, "requesting enrichment from language model");

    let prompt = build_prompt(ticket, context);
    let completion = ctx.language_model.complete(SYSTEM_PROMPT, &prompt).await?;

    info!(
        identifier = %ticket.identifier,
        input_tokens = completion.usage.input_tokens,
        output_tokens = completion.usage.output_tokens,
        "enrichment generated"
    );

    parse_enrichment(&completion.text)
}

/// Parses the model's reply, tolerating a surrounding markdown code fence.
pub fn parse_enrichment(text: &str) -> AppResult<EnrichmentResult> {
    let raw: RawEnrichment = serde_json::from_str(strip_code_fence(text))
        .map_err(|err| AppError::MalformedResponse(format!("response is not valid JSON: {err}")))?;

    let title = raw.title.unwrap_or_default();
    let description = raw.description.unwrap_or_default();
    EnrichmentResult::from_parts(&title, &description).ok_or_else(|| {
        AppError::MalformedResponse("missing title or description".to_string())
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // An optional language tag may be followed by a newline or sit inline.
    let body = rest.trim_start_matches(is_tag_char).trim_start();
    body.strip_suffix("```").unwrap_or(body).trim()
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

#[derive(Deserialize)]
struct RawEnrichment {
    title: Option<String>,
    description: Option<String>,
}
