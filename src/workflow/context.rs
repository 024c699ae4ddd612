use tracing::{debug, info, warn};

use crate::context::AppContext;
use crate::domain::context::{CodeSnippet, EnrichmentContext};
use crate::domain::keywords::extract_keywords;
use crate::domain::ticket::{SimilarTicket, SimilarTicketQuery, Ticket};

pub const MAX_SIMILAR_TICKETS: usize = 5;
pub const MAX_CODE_FILES: usize = 3;

/// Retrieves similar tickets and code snippets for `ticket`.
///
/// Both searches run concurrently and each one falls back to an empty list on
/// failure, so this never fails.
pub async fn gather_context(ctx: &AppContext, ticket: &Ticket) -> EnrichmentContext {
    let query = search_query(ticket);
    let keywords = extract_keywords(ticket);

    debug!(
        identifier = %ticket.identifier,
        keyword_count = keywords.len(),
        "gathering context"
    );

    let (similar_tickets, (code_snippets, scope)) = tokio::join!(
        similar_tickets(ctx, ticket, &query),
        code_snippets(ctx, ticket, &keywords),
    );

    let context = EnrichmentContext {
        similar_tickets,
        code_snippets,
        scope,
    };

    info!(
        identifier = %ticket.identifier,
        similar_tickets = context.similar_tickets.len(),
        code_snippets = context.code_snippets.len(),
        repositories = ?context.repositories(),
        scope = ?context.scope,
        "context gathered"
    );

    context
}

pub fn search_query(ticket: &Ticket) -> String {
    format!("{} {}", ticket.title, ticket.labels.join(" "))
        .trim()
        .to_string()
}

async fn similar_tickets(ctx: &AppContext, ticket: &Ticket, query: &str) -> Vec<SimilarTicket> {
    let options = SimilarTicketQuery {
        team_id: ticket.team_id.clone(),
        max_results: MAX_SIMILAR_TICKETS,
    };

    match ctx.issue_tracker.search_similar_tickets(query, &options).await {
        Ok(mut found) => {
            found.retain(|similar| similar.identifier != ticket.identifier);
            found.truncate(MAX_SIMILAR_TICKETS);
            found
        }
        Err(err) => {
            warn!(identifier = %ticket.identifier, error = %err, "similar ticket search failed");
            Vec::new()
        }
    }
}

async fn code_snippets(
    ctx: &AppContext,
    ticket: &Ticket,
    keywords: &[String],
) -> (Vec<CodeSnippet>, Option<String>) {
    let repository = match ctx.issue_tracker.repository_from_attachments(&ticket.id).await {
        Ok(repository) => repository,
        Err(err) => {
            debug!(identifier = %ticket.identifier, error = %err, "attachment lookup failed");
            None
        }
    };

    let snippets = match ctx
        .code_host
        .search_code(keywords, MAX_CODE_FILES, repository.as_deref())
        .await
    {
        Ok(mut snippets) => {
            snippets.truncate(MAX_CODE_FILES);
            snippets
        }
        Err(err) if err.is_rate_limited() => {
            info!(identifier = %ticket.identifier, "code search rate limited, continuing without code");
            Vec::new()
        }
        Err(err) => {
            warn!(identifier = %ticket.identifier, error = %err, "code search failed");
            Vec::new()
        }
    };

    let scope = match repository {
        Some(repository) => Some(repository),
        None => ctx.code_host.scope().await,
    };

    (snippets, scope)
}
