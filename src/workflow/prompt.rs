use crate::domain::context::EnrichmentContext;
use crate::domain::ticket::Ticket;

/// Similar-ticket descriptions are cut to this many characters in the prompt.
pub const SIMILAR_EXCERPT_CHARS: usize = 300;

/// Renders the user prompt for a ticket and its retrieved context.
///
/// The output depends only on the inputs, so identical tickets and contexts
/// always produce identical prompts.
pub fn build_prompt(ticket: &Ticket, context: Option<&EnrichmentContext>) -> String {
    let mut parts = vec![format!(
        "**Ticket**: {} — {}",
        ticket.identifier, ticket.title
    )];

    if let Some(description) = &ticket.description {
        parts.push(format!("**Description**:\n{description}"));
    }
    if let Some(status) = &ticket.status {
        parts.push(format!("**Status**: {status}"));
    }
    if !ticket.labels.is_empty() {
        parts.push(format!("**Labels**: {}", ticket.labels.join(", ")));
    }
    if let Some(assignee) = &ticket.assignee {
        parts.push(format!("**Assignee**: {assignee}"));
    }
    if let Some(project) = &ticket.project {
        parts.push(format!("**Project**: {project}"));
    }

    if let Some(context) = context {
        if !context.similar_tickets.is_empty() {
            parts.push("\n---\n**Similar Past Tickets**:".to_string());
            for similar in &context.similar_tickets {
                let excerpt = similar
                    .description
                    .as_deref()
                    .map(|description| format!("\n  {}", excerpt(description)))
                    .unwrap_or_default();
                parts.push(format!(
                    "- **{}**: {} ({}){excerpt}",
                    similar.identifier,
                    similar.title,
                    similar.status.as_deref().unwrap_or("unknown"),
                ));
            }
        }

        if !context.code_snippets.is_empty() {
            parts.push("\n---\n**Relevant Code Files**:".to_string());
            for snippet in &context.code_snippets {
                parts.push(format!(
                    "\n**File: `{}`** ({})\n```\n{}\n```",
                    snippet.path, snippet.match_reason, snippet.content
                ));
            }
        }
    }

    parts.join("\n\n")
}

fn excerpt(description: &str) -> String {
    let mut chars = description.chars();
    let head: String = chars.by_ref().take(SIMILAR_EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
