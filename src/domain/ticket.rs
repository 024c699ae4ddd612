/// Titles longer than this are cut before being written back to the tracker.
pub const MAX_TITLE_CHARS: usize = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Tracker-internal id used for API calls.
    pub id: String,
    /// Human-facing key such as `ENG-12`.
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub labels: Vec<String>,
    pub assignee: Option<String>,
    pub project: Option<String>,
    pub team_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarTicket {
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SimilarTicketQuery {
    pub team_id: Option<String>,
    pub max_results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentResult {
    pub title: String,
    pub description: String,
}

impl EnrichmentResult {
    /// Builds a result from raw model fields, rejecting blank values.
    pub fn from_parts(title: &str, description: &str) -> Option<Self> {
        let title = title.trim();
        let description = description.trim();
        if title.is_empty() || description.is_empty() {
            return None;
        }
        Some(Self {
            title: title.chars().take(MAX_TITLE_CHARS).collect(),
            description: description.to_string(),
        })
    }
}

/// Fields written back to the tracker at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketUpdate {
    pub title: String,
    pub description: String,
}
