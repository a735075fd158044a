use reopens_common::{ReopenError, ReopenResult};

use crate::jira::models::Issue;

/// Intermediate export columns. The trailing space inside the last header is
/// historical and consumers key on it byte-for-byte.
pub const EXPORT_HEADERS: [&str; 8] = [
    "Issue key",
    "Issue Type",
    "Issue id",
    "Summary",
    "Assignee",
    "Assignee Id",
    "Custom field (Reopen Count)",
    "Custom field (Reopen log )",
];

/// One row of the intermediate export table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub issue_key: String,
    pub issue_type: String,
    pub issue_id: String,
    pub summary: String,
    pub assignee: String,
    pub assignee_id: String,
    pub reopen_count: String,
    pub reopen_log: String,
}

impl ExportRow {
    /// Flatten a raw issue into a row, given the two resolved custom field ids.
    /// Missing sub-fields become empty strings.
    pub fn from_issue(issue: &Issue, count_field_id: &str, log_field_id: &str) -> Self {
        let f = &issue.fields;
        let assignee = f.assignee.as_ref();
        Self {
            issue_key: issue.key.clone(),
            issue_type: f.issue_type_name().to_string(),
            issue_id: issue.id.clone(),
            summary: f.summary.clone().unwrap_or_default(),
            assignee: assignee
                .and_then(|a| a.display_name.clone())
                .unwrap_or_default(),
            assignee_id: assignee
                .and_then(|a| a.account_id.clone())
                .unwrap_or_default(),
            reopen_count: f.custom_cell(count_field_id),
            reopen_log: f.custom_cell(log_field_id),
        }
    }

    fn as_record(&self) -> [&str; 8] {
        [
            &self.issue_key,
            &self.issue_type,
            &self.issue_id,
            &self.summary,
            &self.assignee,
            &self.assignee_id,
            &self.reopen_count,
            &self.reopen_log,
        ]
    }
}

/// Write the intermediate export CSV (header row always present).
pub fn write_export(path: &str, rows: &[ExportRow]) -> ReopenResult<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| ReopenError::Io(format!("cannot create {path}: {e}")))?;

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|e| ReopenError::Io(format!("write {path}: {e}")))?;
    for row in rows {
        writer
            .write_record(row.as_record())
            .map_err(|e| ReopenError::Io(format!("write {path}: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| ReopenError::Io(format!("flush {path}: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue_json(json: serde_json::Value) -> Issue {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn from_issue_maps_all_columns() {
        let issue = issue_json(serde_json::json!({
            "key": "ABC-7",
            "id": "10007",
            "fields": {
                "summary": "Login broken again",
                "issuetype": { "name": "Bug" },
                "assignee": { "displayName": "Alice", "accountId": "acc-1" },
                "customfield_10050": 2,
                "customfield_10051": "2024-03-05 reopened Assignee: Alice"
            }
        }));

        let row = ExportRow::from_issue(&issue, "customfield_10050", "customfield_10051");
        assert_eq!(row.issue_key, "ABC-7");
        assert_eq!(row.issue_type, "Bug");
        assert_eq!(row.issue_id, "10007");
        assert_eq!(row.summary, "Login broken again");
        assert_eq!(row.assignee, "Alice");
        assert_eq!(row.assignee_id, "acc-1");
        assert_eq!(row.reopen_count, "2");
        assert_eq!(row.reopen_log, "2024-03-05 reopened Assignee: Alice");
    }

    #[test]
    fn from_issue_defaults_missing_fields_to_empty() {
        let issue = issue_json(serde_json::json!({
            "key": "ABC-8",
            "id": "10008",
            "fields": {}
        }));

        let row = ExportRow::from_issue(&issue, "customfield_10050", "customfield_10051");
        assert_eq!(row.issue_type, "");
        assert_eq!(row.summary, "");
        assert_eq!(row.assignee, "");
        assert_eq!(row.assignee_id, "");
        assert_eq!(row.reopen_count, "");
        assert_eq!(row.reopen_log, "");
    }

    #[test]
    fn from_issue_joins_list_valued_log() {
        let issue = issue_json(serde_json::json!({
            "key": "ABC-9",
            "id": "10009",
            "fields": {
                "customfield_10051": ["2024-03-05 first", "2024-03-09 second"]
            }
        }));

        let row = ExportRow::from_issue(&issue, "customfield_10050", "customfield_10051");
        assert_eq!(row.reopen_log, "2024-03-05 first; 2024-03-09 second");
    }

    #[test]
    fn write_export_round_trips_multiline_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let path_str = path.to_str().unwrap();

        let row = ExportRow {
            issue_key: "ABC-1".to_string(),
            issue_type: "Bug".to_string(),
            issue_id: "1".to_string(),
            summary: "multi, line".to_string(),
            assignee: "Bob".to_string(),
            assignee_id: "acc-2".to_string(),
            reopen_count: "1".to_string(),
            reopen_log: "2024-03-05 one\n2024-03-06 two".to_string(),
        };
        write_export(path_str, std::slice::from_ref(&row)).unwrap();

        let mut reader = csv::Reader::from_path(path_str).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.get(7), Some("Custom field (Reopen log )"));

        let records: Vec<csv::StringRecord> =
            reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get(3), Some("multi, line"));
        assert_eq!(records[0].get(7), Some("2024-03-05 one\n2024-03-06 two"));
    }

    #[test]
    fn write_export_empty_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        let path_str = path.to_str().unwrap();

        write_export(path_str, &[]).unwrap();

        let content = std::fs::read_to_string(path_str).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("Issue key,Issue Type,"));
    }
}
