mod jira;
mod writer;

use reopens_common::ReopenResult;
use reopens_config::{init_tracing, ExportConfig};

use crate::jira::client::{JiraClient, JiraClientConfig};
use crate::jira::fields::{self, require_field_id};
use crate::jira::query::build_reopen_jql;
use crate::writer::ExportRow;

#[tokio::main]
async fn main() {
    init_tracing("info");
    let _ = dotenvy::dotenv();

    tracing::info!(service = "reopens-export", "starting");

    if let Err(e) = run().await {
        tracing::error!(error = %e, "export failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> ReopenResult<()> {
    let config = ExportConfig::from_env()?;
    let client = JiraClient::new(JiraClientConfig::from_env()?)
        .map_err(|e| reopens_common::ReopenError::Transport(e.to_string()))?;

    let catalog = client.fetch_fields().await?;
    tracing::info!(count = catalog.len(), "fetched field catalog");

    let count_resolution = fields::resolve(&config.count_field, &catalog);
    let log_resolution = fields::resolve(&config.log_field, &catalog);
    tracing::info!(note = %count_resolution.note, "reopen count resolution");
    tracing::info!(note = %log_resolution.note, "reopen log resolution");

    // Unresolved fields stop the run before any search request goes out.
    let cf_count = require_field_id(&count_resolution)?;
    let cf_log = require_field_id(&log_resolution)?;

    let jql = build_reopen_jql(&config.month, &config.log_field);
    tracing::info!(jql = %jql, "searching jira issues");

    let field_ids: Vec<String> = ["issuetype", "key", "id", "summary", "assignee"]
        .iter()
        .map(|s| s.to_string())
        .chain([cf_count.clone(), cf_log.clone()])
        .collect();

    let issues = client.search_issues(&jql, &field_ids).await?;
    tracing::info!(count = issues.len(), "fetched issues");

    let rows: Vec<ExportRow> = issues
        .iter()
        .map(|issue| ExportRow::from_issue(issue, &cf_count, &cf_log))
        .collect();

    writer::write_export(&config.out_path, &rows)?;
    tracing::info!(
        path = %config.out_path,
        rows = rows.len(),
        month = %config.month,
        "wrote export"
    );
    Ok(())
}
