use async_trait::async_trait;

use crate::domain::ticket::{SimilarTicket, SimilarTicketQuery, Ticket, TicketUpdate};
use crate::error::AppResult;

#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn get_ticket(&self, issue_id: &str) -> AppResult<Ticket>;
    async fn update_ticket(&self, issue_id: &str, update: &TicketUpdate) -> AppResult<()>;
    async fn post_comment(&self, issue_id: &str, body: &str) -> AppResult<()>;
    async fn search_similar_tickets(
        &self,
        query: &str,
        options: &SimilarTicketQuery,
    ) -> AppResult<Vec<SimilarTicket>>;
    /// First GitHub repository (`owner/name`) linked from the ticket's attachments.
    async fn repository_from_attachments(&self, issue_id: &str) -> AppResult<Option<String>>;
}
