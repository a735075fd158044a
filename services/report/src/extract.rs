use std::sync::LazyLock;

use regex::Regex;

use crate::io::ExportRecord;

// Pre-compiled patterns for the free-text reopen log. The log is an audit
// trail, not a schema: one line per reopen, a bare date somewhere in the
// line, optionally an inline "Assignee: <name>" marker.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"(\d{4}-\d{2}-\d{2})") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    });
static ASSIGNEE_RE: LazyLock<Regex> =
    LazyLock::new(|| match Regex::new(r"Assignee:\s*(.*)") {
        Ok(re) => re,
        Err(_) => unreachable!("static regex pattern"),
    });

/// One reopen occurrence, detected from a single log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReopenEvent {
    pub issue_key: String,
    pub issue_type: String,
    pub summary: String,
    pub assignee: String,
    pub date: String,
}

/// Scan a row's reopen log line by line and emit one event per dated line.
///
/// Lines without a date are skipped silently. The inline assignee marker
/// wins when present (even if its value is empty after trimming); otherwise
/// the row-level assignee is attributed.
pub fn extract_events(record: &ExportRecord) -> Vec<ReopenEvent> {
    let mut events = Vec::new();

    for line in record.reopen_log.lines() {
        let Some(caps) = DATE_RE.captures(line) else {
            continue;
        };
        let date = caps[1].to_string();

        let assignee = match ASSIGNEE_RE.captures(line) {
            Some(a) => a[1].trim().to_string(),
            None => record.assignee.clone(),
        };

        events.push(ReopenEvent {
            issue_key: record.issue_key.clone(),
            issue_type: record.issue_type.clone(),
            summary: record.summary.clone(),
            assignee,
            date,
        });
    }

    events
}
