use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use futures::future::join_all;
use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, USER_AGENT},
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::cache::DetectedScope;
use crate::domain::context::CodeSnippet;
use crate::error::{AppError, AppResult};
use crate::services::CodeHostService;

const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_API_VERSION: &str = "2022-11-28";
const CLIENT_USER_AGENT: &str = "ticket-enricher";

/// Maximum number of characters kept from each fetched file.
pub const MAX_CONTENT_CHARS: usize = 2000;
/// Number of leading keywords used in a code search query.
pub const QUERY_KEYWORDS: usize = 3;

pub struct GithubClient {
    http: Client,
    base_url: String,
    token: Option<String>,
    explicit_org: bool,
    scope: DetectedScope,
}

impl GithubClient {
    pub fn new(token: Option<String>, org: Option<String>) -> Self {
        Self::with_base_url(GITHUB_API_URL, token, org)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        token: Option<String>,
        org: Option<String>,
    ) -> Self {
        let explicit_org = org.is_some();
        let scope = match org {
            Some(org) => DetectedScope::preset(org),
            None => DetectedScope::new(),
        };
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            token,
            explicit_org,
            scope,
        }
    }

    fn request(&self, builder: RequestBuilder, token: &str) -> RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/vnd.github+json")
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
    }

    async fn send(&self, builder: RequestBuilder, token: &str) -> AppResult<Response> {
        let response = self
            .request(builder, token)
            .send()
            .await
            .map_err(|err| AppError::CodeHost(format!("failed to call GitHub: {err}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unable to read response>".to_string());
        Err(status_error(status, &body))
    }

    /// Search qualifier for the organization fallback: `org:` when configured,
    /// `user:` for the token owner's login.
    async fn owner_qualifier(&self, token: &str) -> AppResult<String> {
        let login = self
            .scope
            .get_or_detect(|| self.detect_login(token))
            .await?;
        let kind = if self.explicit_org { "org" } else { "user" };
        Ok(format!("{kind}:{login}"))
    }

    async fn detect_login(&self, token: &str) -> AppResult<String> {
        let url = format!("{}/user", self.base_url);
        let user: GithubUser = self
            .send(self.http.get(url), token)
            .await?
            .json()
            .await
            .map_err(|err| AppError::CodeHost(format!("failed to parse GitHub user: {err}")))?;
        info!(login = %user.login, "detected GitHub account for code search");
        Ok(user.login)
    }

    async fn fetch_snippet(
        &self,
        token: &str,
        item: &SearchItem,
        match_reason: &str,
    ) -> AppResult<CodeSnippet> {
        let url = format!(
            "{}/repos/{}/contents/{}",
            self.base_url, item.repository.full_name, item.path
        );
        let file: FileContent = self
            .send(self.http.get(url), token)
            .await?
            .json()
            .await
            .map_err(|err| AppError::CodeHost(format!("failed to parse file content: {err}")))?;

        let content = decode_content(&file)?;
        Ok(CodeSnippet {
            repository: item.repository.full_name.clone(),
            path: item.path.clone(),
            content: content.chars().take(MAX_CONTENT_CHARS).collect(),
            match_reason: match_reason.to_string(),
        })
    }
}

#[async_trait]
impl CodeHostService for GithubClient {
    async fn search_code(
        &self,
        keywords: &[String],
        max_files: usize,
        repository: Option<&str>,
    ) -> AppResult<Vec<CodeSnippet>> {
        let Some(token) = self.token.as_deref() else {
            return Ok(Vec::new());
        };
        let terms = &keywords[..keywords.len().min(QUERY_KEYWORDS)];
        if terms.is_empty() || max_files == 0 {
            return Ok(Vec::new());
        }

        let qualifier = match repository {
            Some(repository) => format!("repo:{repository}"),
            None => self.owner_qualifier(token).await?,
        };
        let query = format!("{} {qualifier}", terms.join(" "));

        let url = format!("{}/search/code", self.base_url);
        let per_page = max_files.to_string();
        let search: SearchResponse = self
            .send(
                self.http
                    .get(url)
                    .query(&[("q", query.as_str()), ("per_page", per_page.as_str())]),
                token,
            )
            .await?
            .json()
            .await
            .map_err(|err| AppError::CodeHost(format!("failed to parse search results: {err}")))?;

        let match_reason = format!("Matched: {}", terms.join(", "));
        let fetches = search
            .items
            .iter()
            .take(max_files)
            .map(|item| self.fetch_snippet(token, item, &match_reason));

        let mut snippets = Vec::new();
        for (item, result) in search.items.iter().zip(join_all(fetches).await) {
            match result {
                Ok(snippet) => snippets.push(snippet),
                Err(err) => debug!(path = %item.path, error = %err, "failed to fetch file from GitHub"),
            }
        }

        debug!(count = snippets.len(), query = %query, "fetched code snippets from GitHub");
        Ok(snippets)
    }

    async fn scope(&self) -> Option<String> {
        let token = self.token.as_deref()?;
        self.owner_qualifier(token).await.ok()
    }
}

fn status_error(status: StatusCode, body: &str) -> AppError {
    if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
        AppError::RateLimited(format!("GitHub responded with {status}"))
    } else {
        AppError::CodeHost(format!("GitHub responded with {status}: {body}"))
    }
}

fn decode_content(file: &FileContent) -> AppResult<String> {
    let Some(content) = file.content.as_deref() else {
        return Err(AppError::CodeHost("file has no inline content".to_string()));
    };
    if file.encoding.as_deref().is_some_and(|encoding| encoding != "base64") {
        return Ok(content.to_string());
    }
    // GitHub wraps base64 payloads at 60 columns.
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64_STANDARD
        .decode(compact)
        .map_err(|err| AppError::CodeHost(format!("invalid base64 file content: {err}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[derive(Deserialize)]
struct GithubUser {
    login: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    path: String,
    repository: SearchRepository,
}

#[derive(Deserialize)]
struct SearchRepository {
    full_name: String,
}

#[derive(Deserialize)]
struct FileContent {
    content: Option<String>,
    encoding: Option<String>,
}
