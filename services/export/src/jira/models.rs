use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry from the tenant's field catalog (`/rest/api/3/field`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Issue assignee as returned inside the search payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JiraUser {
    pub account_id: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueType {
    #[serde(default)]
    pub name: String,
}

/// The fields block of a search hit. Custom fields have tenant-specific ids
/// (`customfield_NNNNN`), so anything not statically known lands in `custom`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IssueFields {
    pub issuetype: Option<IssueType>,
    pub summary: Option<String>,
    pub assignee: Option<JiraUser>,
    #[serde(flatten)]
    pub custom: serde_json::Map<String, Value>,
}

impl IssueFields {
    pub fn issue_type_name(&self) -> &str {
        self.issuetype.as_ref().map(|t| t.name.as_str()).unwrap_or("")
    }

    /// Render a custom field value as a single CSV cell.
    ///
    /// Strings pass through unchanged (multi-line logs keep their newlines),
    /// lists are joined with `"; "`, and null/missing become the empty string.
    pub fn custom_cell(&self, field_id: &str) -> String {
        match self.custom.get(field_id) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(items)) => items
                .iter()
                .map(scalar_to_string)
                .collect::<Vec<_>>()
                .join("; "),
            Some(other) => scalar_to_string(other),
        }
    }
}

fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// A raw issue from the search endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub fields: IssueFields,
}

/// One page of a token-paginated search response.
///
/// A missing `isLast` means the page is final, matching the tracker's
/// behavior when the flag is omitted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub issues: Vec<Issue>,
    #[serde(default = "default_true")]
    pub is_last: bool,
    pub next_page_token: Option<String>,
}

fn default_true() -> bool {
    true
}
