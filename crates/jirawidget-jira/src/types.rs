//! JIRA API types

use jirawidget_core::models::{Issue, IssueLink};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields requested on every issue lookup
pub const ISSUE_FIELDS: &str = "summary,status,issuelinks";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssue {
    pub key: String,
    #[serde(default)]
    pub fields: Option<JiraFields>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JiraFields {
    pub summary: Option<String>,
    pub status: Option<JiraStatus>,
    #[serde(rename = "issuelinks", default)]
    pub issue_links: Option<Vec<JiraIssueLink>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraStatus {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraIssueLink {
    #[serde(rename = "type")]
    pub link_type: Option<JiraLinkType>,
    #[serde(rename = "outwardIssue")]
    pub outward_issue: Option<JiraLinkedIssue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraLinkType {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraLinkedIssue {
    pub key: Option<String>,
    pub fields: Option<JiraLinkedFields>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraLinkedFields {
    pub status: Option<JiraStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JiraSearchResult {
    #[serde(default)]
    pub issues: Vec<JiraIssue>,
}

/// Error body returned by Jira on failed requests
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct JiraErrorResponse {
    #[serde(rename = "errorMessages", default)]
    pub error_messages: Vec<String>,
    /// Field errors in document order
    #[serde(default)]
    pub errors: Map<String, Value>,
}

impl JiraErrorResponse {
    /// The first `errorMessages` entry, or else the first `errors` value.
    /// Only that one entry is considered; if it is blank there is no message.
    pub fn first_message(&self) -> Option<&str> {
        let first = match self.error_messages.first() {
            Some(message) => Some(message.as_str()),
            None => self.errors.values().next().and_then(Value::as_str),
        };
        first.map(str::trim).filter(|m| !m.is_empty())
    }
}

impl JiraIssueLink {
    fn into_link(self) -> IssueLink {
        IssueLink {
            link_type_name: self.link_type.and_then(|t| t.name),
            linked_status_name: self
                .outward_issue
                .and_then(|issue| issue.fields)
                .and_then(|fields| fields.status)
                .and_then(|status| status.name),
        }
    }
}

impl From<JiraIssue> for Issue {
    fn from(issue: JiraIssue) -> Self {
        let fields = issue.fields.unwrap_or_default();
        Issue {
            key: issue.key,
            summary: fields.summary,
            links: fields
                .issue_links
                .unwrap_or_default()
                .into_iter()
                .map(JiraIssueLink::into_link)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ISSUE_JSON: &str = r#"{
        "id": "10001",
        "key": "PC-123",
        "fields": {
            "summary": "Ship the widget",
            "status": {"name": "In Progress"},
            "issuelinks": [
                {
                    "id": "1",
                    "type": {"name": "Activities", "inward": "is activity of", "outward": "has activity"},
                    "outwardIssue": {"key": "PC-124", "fields": {"status": {"name": "Done"}}}
                },
                {
                    "id": "2",
                    "type": {"name": "Activities"},
                    "inwardIssue": {"key": "PC-99", "fields": {"status": {"name": "Done"}}}
                },
                {
                    "id": "3",
                    "type": {"name": "Blocks"},
                    "outwardIssue": {"key": "PC-200", "fields": {"status": {"name": "Open"}}}
                }
            ]
        }
    }"#;

    #[test]
    fn test_issue_conversion() {
        let raw: JiraIssue = serde_json::from_str(ISSUE_JSON).unwrap();
        let issue: Issue = raw.into();

        assert_eq!(issue.key, "PC-123");
        assert_eq!(issue.summary.as_deref(), Some("Ship the widget"));
        assert_eq!(issue.links.len(), 3);
        assert_eq!(issue.links[0], IssueLink::new(Some("Activities"), Some("Done")));
        // inward links carry no outward status
        assert_eq!(issue.links[1], IssueLink::new(Some("Activities"), None));
        assert_eq!(issue.activity_links().count(), 1);
    }

    #[test]
    fn test_issue_without_fields() {
        let raw: JiraIssue = serde_json::from_str(r#"{"key":"PC-1"}"#).unwrap();
        let issue: Issue = raw.into();
        assert!(issue.summary.is_none());
        assert!(issue.links.is_empty());
    }

    #[test]
    fn test_error_response_priority() {
        let payload: JiraErrorResponse = serde_json::from_str(
            r#"{"errorMessages":["Issue does not exist","second"],"errors":{"a":"ignored"}}"#,
        )
        .unwrap();
        assert_eq!(payload.first_message(), Some("Issue does not exist"));

        let payload: JiraErrorResponse = serde_json::from_str(
            r#"{"errorMessages":["  ","Issue does not exist"],"errors":{"a":"ignored"}}"#,
        )
        .unwrap();
        assert_eq!(payload.first_message(), None);

        let payload: JiraErrorResponse =
            serde_json::from_str(r#"{"errors":{"summary":"required"}}"#).unwrap();
        assert_eq!(payload.first_message(), Some("required"));

        assert_eq!(JiraErrorResponse::default().first_message(), None);
    }

    #[test]
    fn test_errors_map_keeps_document_order() {
        let payload: JiraErrorResponse = serde_json::from_str(
            r#"{"errorMessages":[],"errors":{"summary":"Summary is required","assignee":"User does not exist"}}"#,
        )
        .unwrap();
        assert_eq!(payload.first_message(), Some("Summary is required"));
    }
}
