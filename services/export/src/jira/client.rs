use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::json;

use reopens_common::{ReopenError, ReopenResult};
use reopens_config::get_var;

use super::models::{FieldDefinition, Issue, SearchPage};

/// Search endpoint paths, in fallback priority order. A path that fails at
/// any page boundary aborts entirely and the next path restarts from page one.
pub const SEARCH_PATHS: [&str; 2] = ["/rest/api/3/search/jql", "/rest/api/3/jql/search"];

const PAGE_SIZE: u32 = 100;
const CATALOG_TIMEOUT_SECS: u64 = 60;
const SEARCH_TIMEOUT_SECS: u64 = 90;

#[derive(Debug, Clone)]
pub struct JiraClientConfig {
    pub base_url: String,
    pub email: String,
    pub api_token: String,
}

impl JiraClientConfig {
    /// Load Jira credentials from environment.
    ///
    /// All three of `JIRA_BASE_URL`, `JIRA_EMAIL` and `JIRA_API_TOKEN` are
    /// required; a missing one is a configuration error (fail-fast).
    pub fn from_env() -> ReopenResult<Self> {
        let base_url = get_var("JIRA_BASE_URL")?
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            base_url,
            email: get_var("JIRA_EMAIL")?,
            api_token: get_var("JIRA_API_TOKEN")?,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JiraClientError {
    #[error("HTTP {status}: {body}")]
    HttpError { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("all search endpoints failed; last error: {last_error}")]
    AllEndpointsFailed { last_error: String },
}

impl From<JiraClientError> for ReopenError {
    fn from(e: JiraClientError) -> Self {
        ReopenError::Transport(e.to_string())
    }
}

#[derive(Clone)]
pub struct JiraClient {
    client: Client,
    config: JiraClientConfig,
}

impl JiraClient {
    pub fn new(config: JiraClientConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    /// For testing: create a client pointing at a specific base URL (e.g., wiremock).
    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.config.base_url = base_url.to_string();
        self
    }

    /// Fetch the tenant's full field catalog.
    pub async fn fetch_fields(&self) -> Result<Vec<FieldDefinition>, JiraClientError> {
        let url = format!("{}/rest/api/3/field", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .timeout(Duration::from_secs(CATALOG_TIMEOUT_SECS))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JiraClientError::HttpError { status, body });
        }

        response
            .json::<Vec<FieldDefinition>>()
            .await
            .map_err(JiraClientError::RequestError)
    }

    /// Search issues, trying each endpoint path in order.
    ///
    /// The first path that completes pagination wins; issues from different
    /// paths are never mixed. If every path fails, the error carries the last
    /// failure seen.
    pub async fn search_issues(
        &self,
        jql: &str,
        field_ids: &[String],
    ) -> Result<Vec<Issue>, JiraClientError> {
        let mut last_error = String::new();

        for path in SEARCH_PATHS {
            tracing::info!(path, "trying search endpoint");
            match self.search_via(path, jql, field_ids).await {
                Ok(issues) => {
                    tracing::info!(path, count = issues.len(), "search completed");
                    return Ok(issues);
                }
                Err(e) => {
                    tracing::warn!(path, error = %e, "search endpoint failed");
                    last_error = e.to_string();
                }
            }
        }

        Err(JiraClientError::AllEndpointsFailed { last_error })
    }

    /// Run one endpoint path to completion, following continuation tokens.
    ///
    /// Stops when the page reports `isLast` or supplies no further token.
    /// Issues keep the tracker's order.
    async fn search_via(
        &self,
        path: &str,
        jql: &str,
        field_ids: &[String],
    ) -> Result<Vec<Issue>, JiraClientError> {
        let mut all_issues = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page = self
                .search_page(path, jql, field_ids, next_token.as_deref())
                .await?;
            all_issues.extend(page.issues);

            if page.is_last {
                break;
            }
            match page.next_page_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(all_issues)
    }

    async fn search_page(
        &self,
        path: &str,
        jql: &str,
        field_ids: &[String],
        next_token: Option<&str>,
    ) -> Result<SearchPage, JiraClientError> {
        let url = format!("{}{}", self.config.base_url, path);

        let mut body = json!({
            "jql": jql,
            "maxResults": PAGE_SIZE,
            "fields": field_ids,
        });
        if let Some(token) = next_token {
            body["nextPageToken"] = json!(token);
        }

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.email, Some(&self.config.api_token))
            .timeout(Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(JiraClientError::HttpError { status, body });
        }

        response
            .json::<SearchPage>()
            .await
            .map_err(JiraClientError::RequestError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> JiraClientConfig {
        JiraClientConfig {
            base_url: "http://localhost".to_string(),
            email: "test@example.com".to_string(),
            api_token: "fake-token".to_string(),
        }
    }

    fn test_client(server: &MockServer) -> JiraClient {
        JiraClient::new(test_config())
            .unwrap()
            .with_base_url(&server.uri())
    }

    fn field_ids() -> Vec<String> {
        vec![
            "issuetype".to_string(),
            "key".to_string(),
            "summary".to_string(),
            "customfield_10050".to_string(),
        ]
    }

    fn make_issue(key: &str) -> serde_json::Value {
        serde_json::json!({
            "key": key,
            "id": "1",
            "fields": { "summary": format!("Issue {key}") }
        })
    }

    fn make_page(
        keys: &[&str],
        is_last: bool,
        token: Option<&str>,
    ) -> serde_json::Value {
        let issues: Vec<_> = keys.iter().map(|k| make_issue(k)).collect();
        let mut page = serde_json::json!({ "issues": issues, "isLast": is_last });
        if let Some(t) = token {
            page["nextPageToken"] = serde_json::json!(t);
        }
        page
    }

    #[tokio::test]
    async fn fetch_fields_returns_catalog() {
        let server = MockServer::start().await;

        let catalog = serde_json::json!([
            { "id": "summary", "name": "Summary" },
            { "id": "customfield_10050", "name": "Reopen Count" }
        ]);

        Mock::given(method("GET"))
            .and(path("/rest/api/3/field"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&catalog))
            .mount(&server)
            .await;

        let fields = test_client(&server).fetch_fields().await.unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].id, "customfield_10050");
        assert_eq!(fields[1].name, "Reopen Count");
    }

    #[tokio::test]
    async fn fetch_fields_surfaces_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/api/3/field"))
            .respond_with(ResponseTemplate::new(401).set_body_string("unauthorized"))
            .mount(&server)
            .await;

        let err = test_client(&server).fetch_fields().await.unwrap_err();
        match err {
            JiraClientError::HttpError { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "unauthorized");
            }
            other => panic!("expected HttpError, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_single_page_via_primary() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .and(body_partial_json(serde_json::json!({ "maxResults": 100 })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(make_page(&["ABC-1", "ABC-2"], true, None)),
            )
            .mount(&server)
            .await;

        let issues = test_client(&server)
            .search_issues("jql", &field_ids())
            .await
            .unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].key, "ABC-1");
        assert_eq!(issues[1].key, "ABC-2");
    }

    #[tokio::test]
    async fn search_three_pages_concatenates_in_order() {
        let server = MockServer::start().await;

        // Mount token-specific pages first (more specific), first page last.
        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .and(body_partial_json(serde_json::json!({ "nextPageToken": "t2" })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(make_page(&["ABC-3", "ABC-4"], false, Some("t3"))),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .and(body_partial_json(serde_json::json!({ "nextPageToken": "t3" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(make_page(&["ABC-5"], true, None)),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(make_page(&["ABC-1", "ABC-2"], false, Some("t2"))),
            )
            .mount(&server)
            .await;

        let issues = test_client(&server)
            .search_issues("jql", &field_ids())
            .await
            .unwrap();
        let keys: Vec<&str> = issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["ABC-1", "ABC-2", "ABC-3", "ABC-4", "ABC-5"]);
    }

    #[tokio::test]
    async fn search_stops_without_is_last_or_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "issues": [make_issue("ABC-1")] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let issues = test_client(&server)
            .search_issues("jql", &field_ids())
            .await
            .unwrap();
        assert_eq!(issues.len(), 1);
    }

    #[tokio::test]
    async fn fallback_to_secondary_path_on_first_page_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .respond_with(ResponseTemplate::new(410).set_body_string("gone"))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/jql/search"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(make_page(&["XYZ-9"], true, None)),
            )
            .mount(&server)
            .await;

        let issues = test_client(&server)
            .search_issues("jql", &field_ids())
            .await
            .unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].key, "XYZ-9");
    }

    #[tokio::test]
    async fn mid_pagination_failure_restarts_on_secondary_without_mixing() {
        let server = MockServer::start().await;

        // Primary: page one succeeds, page two fails.
        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .and(body_partial_json(serde_json::json!({ "nextPageToken": "p2" })))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(make_page(&["OLD-1"], false, Some("p2"))),
            )
            .mount(&server)
            .await;

        // Secondary: two clean pages.
        Mock::given(method("POST"))
            .and(path("/rest/api/3/jql/search"))
            .and(body_partial_json(serde_json::json!({ "nextPageToken": "q2" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(make_page(&["NEW-2"], true, None)),
            )
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/jql/search"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(make_page(&["NEW-1"], false, Some("q2"))),
            )
            .mount(&server)
            .await;

        let issues = test_client(&server)
            .search_issues("jql", &field_ids())
            .await
            .unwrap();
        let keys: Vec<&str> = issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(keys, vec!["NEW-1", "NEW-2"], "must not mix paths");
    }

    #[tokio::test]
    async fn all_paths_failing_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/search/jql"))
            .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/rest/api/3/jql/search"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let err = test_client(&server)
            .search_issues("jql", &field_ids())
            .await
            .unwrap_err();
        match err {
            JiraClientError::AllEndpointsFailed { last_error } => {
                assert!(last_error.contains("503"), "got: {last_error}");
            }
            other => panic!("expected AllEndpointsFailed, got: {other:?}"),
        }
    }
}
