use serde::Deserialize;

pub const ENRICH_COMMAND: &str = "/enrich";

/// Inbound Linear webhook payload. Only the fields the trigger rule reads
/// are modelled; everything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEvent {
    #[serde(rename = "type", default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Option<WebhookData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookData {
    pub id: Option<String>,
    pub issue_id: Option<String>,
    pub body: Option<String>,
}

impl WebhookEvent {
    pub fn parse(raw_body: &[u8]) -> Option<Self> {
        serde_json::from_slice(raw_body).ok()
    }

    pub fn event_type(&self) -> &str {
        self.event_type.as_deref().unwrap_or("unknown")
    }

    /// The id reported back in the acknowledgment: the id of the entity the
    /// event is about, which is the comment itself for comment events.
    pub fn subject_id(&self) -> Option<&str> {
        self.data.as_ref()?.id.as_deref()
    }

    /// Returns the ticket to enrich when this event is a newly created
    /// comment starting with the `/enrich` command.
    pub fn enrich_target(&self) -> Option<&str> {
        if self.event_type.as_deref() != Some("Comment") || self.action.as_deref() != Some("create")
        {
            return None;
        }
        let data = self.data.as_ref()?;
        let body = data.body.as_deref()?;
        if !body.trim().starts_with(ENRICH_COMMAND) {
            return None;
        }
        data.issue_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(json: &str) -> WebhookEvent {
        WebhookEvent::parse(json.as_bytes()).expect("valid event")
    }

    #[test]
    fn enrich_comment_targets_its_issue() {
        let event = event(
            r#"{"type":"Comment","action":"create","data":{"id":"c1","body":"  /enrich please","issueId":"ENG-9"}}"#,
        );
        assert_eq!(event.enrich_target(), Some("ENG-9"));
        assert_eq!(event.subject_id(), Some("c1"));
    }

    #[test]
    fn ignores_other_comments_and_actions() {
        let plain = event(r#"{"type":"Comment","action":"create","data":{"body":"looks good","issueId":"ENG-9"}}"#);
        assert_eq!(plain.enrich_target(), None);

        let edited = event(r#"{"type":"Comment","action":"update","data":{"body":"/enrich","issueId":"ENG-9"}}"#);
        assert_eq!(edited.enrich_target(), None);

        let issue = event(r#"{"type":"Issue","action":"create","data":{"id":"ENG-9","body":"/enrich"}}"#);
        assert_eq!(issue.enrich_target(), None);
        assert_eq!(issue.subject_id(), Some("ENG-9"));
    }

    #[test]
    fn command_without_issue_id_is_ignored() {
        let event = event(r#"{"type":"Comment","action":"create","data":{"body":"/enrich"}}"#);
        assert_eq!(event.enrich_target(), None);
        assert_eq!(event.subject_id(), None);
    }

    #[test]
    fn unparseable_body_yields_none() {
        assert!(WebhookEvent::parse(b"not json").is_none());
        assert_eq!(WebhookEvent::default().event_type(), "unknown");
    }
}
