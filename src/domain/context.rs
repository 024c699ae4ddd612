use std::collections::BTreeSet;

use crate::domain::ticket::SimilarTicket;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSnippet {
    /// Originating repository as `owner/name`.
    pub repository: String,
    pub path: String,
    pub content: String,
    pub match_reason: String,
}

impl CodeSnippet {
    pub fn organization(&self) -> &str {
        self.repository
            .split_once('/')
            .map(|(owner, _)| owner)
            .unwrap_or(&self.repository)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrichmentContext {
    pub similar_tickets: Vec<SimilarTicket>,
    pub code_snippets: Vec<CodeSnippet>,
    /// Organization or repository the code search was scoped to, if any.
    pub scope: Option<String>,
}

impl EnrichmentContext {
    pub fn is_empty(&self) -> bool {
        self.similar_tickets.is_empty() && self.code_snippets.is_empty()
    }

    pub fn repositories(&self) -> BTreeSet<&str> {
        self.code_snippets
            .iter()
            .map(|snippet| snippet.repository.as_str())
            .collect()
    }

    pub fn organizations(&self) -> BTreeSet<&str> {
        self.code_snippets
            .iter()
            .map(CodeSnippet::organization)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(repository: &str, path: &str) -> CodeSnippet {
        CodeSnippet {
            repository: repository.to_string(),
            path: path.to_string(),
            content: String::new(),
            match_reason: String::new(),
        }
    }

    #[test]
    fn collects_distinct_repositories_and_organizations() {
        let context = EnrichmentContext {
            code_snippets: vec![
                snippet("acme/api", "src/a.rs"),
                snippet("acme/api", "src/b.rs"),
                snippet("acme/web", "app.ts"),
                snippet("other/tool", "main.go"),
            ],
            ..Default::default()
        };

        assert_eq!(
            context.repositories().into_iter().collect::<Vec<_>>(),
            vec!["acme/api", "acme/web", "other/tool"]
        );
        assert_eq!(
            context.organizations().into_iter().collect::<Vec<_>>(),
            vec!["acme", "other"]
        );
    }

    #[test]
    fn default_context_is_empty() {
        assert!(EnrichmentContext::default().is_empty());
    }
}
