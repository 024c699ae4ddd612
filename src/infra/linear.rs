use async_trait::async_trait;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::domain::ticket::{SimilarTicket, SimilarTicketQuery, Ticket, TicketUpdate};
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

const LINEAR_GRAPHQL_URL: &str = "https://api.linear.app/graphql";

const ISSUE_QUERY: &str = r#"
query Issue($id: String!) {
  issue(id: $id) {
    id
    identifier
    title
    description
    state { name }
    assignee { displayName }
    project { name }
    team { id }
    labels { nodes { name } }
  }
}"#;

const SEARCH_ISSUES_QUERY: &str = r#"
query SearchIssues($term: String!, $first: Int, $teamId: String) {
  searchIssues(term: $term, first: $first, teamId: $teamId) {
    nodes {
      identifier
      title
      description
      state { name }
    }
  }
}"#;

const ISSUE_ATTACHMENTS_QUERY: &str = r#"
query IssueAttachments($id: String!) {
  issue(id: $id) {
    attachments { nodes { url } }
  }
}"#;

const ISSUE_UPDATE_MUTATION: &str = r#"
mutation IssueUpdate($id: String!, $input: IssueUpdateInput!) {
  issueUpdate(id: $id, input: $input) { success }
}"#;

const COMMENT_CREATE_MUTATION: &str = r#"
mutation CommentCreate($input: CommentCreateInput!) {
  commentCreate(input: $input) { success }
}"#;

pub struct LinearClient {
    http: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl LinearClient {
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_endpoint(LINEAR_GRAPHQL_URL, api_key)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            api_key,
        }
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration("Linear API key not configured".to_string()))
    }

    async fn graphql<T: DeserializeOwned>(&self, query: &str, variables: Value) -> AppResult<T> {
        let api_key = self.api_key()?;
        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, api_key)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&GraphqlRequest { query, variables })
            .send()
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Linear: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::IssueTracker(format!(
                "Linear responded with {status}: {body}"
            )));
        }

        let payload: GraphqlResponse<T> = response.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse Linear response: {err}"))
        })?;

        if let Some(errors) = payload.errors.filter(|errors| !errors.is_empty()) {
            let messages = errors
                .into_iter()
                .map(|error| error.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Err(AppError::IssueTracker(messages));
        }

        payload
            .data
            .ok_or_else(|| AppError::IssueTracker("Linear returned no data".to_string()))
    }
}

#[async_trait]
impl IssueTrackerService for LinearClient {
    async fn get_ticket(&self, issue_id: &str) -> AppResult<Ticket> {
        let data: IssueData = self
            .graphql(ISSUE_QUERY, json!({ "id": issue_id }))
            .await
            .map_err(|err| AppError::Fetch {
                issue_id: issue_id.to_string(),
                reason: err.to_string(),
            })?;

        let issue = data.issue.ok_or_else(|| AppError::Fetch {
            issue_id: issue_id.to_string(),
            reason: "issue not found".to_string(),
        })?;

        debug!(issue_id, identifier = %issue.identifier, "fetched issue from Linear");
        Ok(issue.into_ticket())
    }

    async fn update_ticket(&self, issue_id: &str, update: &TicketUpdate) -> AppResult<()> {
        let data: IssueUpdateData = self
            .graphql(
                ISSUE_UPDATE_MUTATION,
                json!({
                    "id": issue_id,
                    "input": { "title": update.title, "description": update.description },
                }),
            )
            .await
            .map_err(|err| AppError::Persist {
                issue_id: issue_id.to_string(),
                reason: err.to_string(),
            })?;

        if !data.issue_update.success {
            return Err(AppError::Persist {
                issue_id: issue_id.to_string(),
                reason: "Linear rejected the update".to_string(),
            });
        }

        info!(issue_id, "updated Linear issue title and description");
        Ok(())
    }

    async fn post_comment(&self, issue_id: &str, body: &str) -> AppResult<()> {
        let data: CommentCreateData = self
            .graphql(
                COMMENT_CREATE_MUTATION,
                json!({ "input": { "issueId": issue_id, "body": body } }),
            )
            .await?;

        if !data.comment_create.success {
            return Err(AppError::IssueTracker(format!(
                "Linear rejected the comment on {issue_id}"
            )));
        }

        debug!(issue_id, "posted comment on Linear issue");
        Ok(())
    }

    async fn search_similar_tickets(
        &self,
        query: &str,
        options: &SimilarTicketQuery,
    ) -> AppResult<Vec<SimilarTicket>> {
        let data: SearchIssuesData = self
            .graphql(
                SEARCH_ISSUES_QUERY,
                json!({
                    "term": query,
                    "first": options.max_results,
                    "teamId": options.team_id,
                }),
            )
            .await?;

        let results = data
            .search_issues
            .nodes
            .into_iter()
            .take(options.max_results)
            .map(|node| SimilarTicket {
                identifier: node.identifier,
                title: node.title,
                description: node.description,
                status: node.state.map(|state| state.name),
            })
            .collect::<Vec<_>>();

        debug!(count = results.len(), query, "found similar issues");
        Ok(results)
    }

    async fn repository_from_attachments(&self, issue_id: &str) -> AppResult<Option<String>> {
        let data: IssueAttachmentsData = self
            .graphql(ISSUE_ATTACHMENTS_QUERY, json!({ "id": issue_id }))
            .await?;

        let repository = data
            .issue
            .into_iter()
            .flat_map(|issue| issue.attachments.nodes)
            .filter_map(|attachment| attachment.url)
            .find_map(|url| github_repository(&url));

        if let Some(repository) = &repository {
            debug!(issue_id, repository = %repository, "detected GitHub repository from attachment");
        }
        Ok(repository)
    }
}

/// Extracts `owner/name` from a `github.com/owner/name/...` URL.
fn github_repository(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("github.com/")?;
    let mut segments = rest.split('/');
    let owner = segments.next().filter(|owner| !owner.is_empty())?;
    let name = segments
        .next()
        .map(|name| name.split(['?', '#']).next().unwrap_or(name))
        .map(|name| name.trim_end_matches(".git"))
        .filter(|name| !name.is_empty())?;
    Some(format!("{owner}/{name}"))
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
struct IssueData {
    issue: Option<LinearIssue>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinearIssue {
    id: String,
    identifier: String,
    title: String,
    description: Option<String>,
    state: Option<Named>,
    assignee: Option<LinearUser>,
    project: Option<Named>,
    team: Option<LinearTeam>,
    labels: Option<Connection<Named>>,
}

impl LinearIssue {
    fn into_ticket(self) -> Ticket {
        Ticket {
            id: self.id,
            identifier: self.identifier,
            title: self.title,
            description: self.description.filter(|text| !text.trim().is_empty()),
            status: self.state.map(|state| state.name),
            labels: self
                .labels
                .map(|labels| labels.nodes.into_iter().map(|label| label.name).collect())
                .unwrap_or_default(),
            assignee: self.assignee.map(|user| user.display_name),
            project: self.project.map(|project| project.name),
            team_id: self.team.map(|team| team.id),
        }
    }
}

#[derive(Deserialize)]
struct Named {
    name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LinearUser {
    display_name: String,
}

#[derive(Deserialize)]
struct LinearTeam {
    id: String,
}

#[derive(Deserialize)]
struct Connection<T> {
    nodes: Vec<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchIssuesData {
    search_issues: Connection<SearchNode>,
}

#[derive(Deserialize)]
struct SearchNode {
    identifier: String,
    title: String,
    description: Option<String>,
    state: Option<Named>,
}

#[derive(Deserialize)]
struct IssueAttachmentsData {
    issue: Option<AttachmentIssue>,
}

#[derive(Deserialize)]
struct AttachmentIssue {
    attachments: Connection<Attachment>,
}

#[derive(Deserialize)]
struct Attachment {
    url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IssueUpdateData {
    issue_update: MutationPayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentCreateData {
    comment_create: MutationPayload,
}

#[derive(Deserialize)]
struct MutationPayload {
    success: bool,
}
