use reopens_common::{Month, ReopenError, ReopenResult};

use crate::aggregate::{aggregate, TicketRow, UserRow};
use crate::extract::extract_events;

/// The export column the whole stage hinges on. The trailing space inside
/// the parens is part of the historical header.
pub const LOG_COLUMN: &str = "Custom field (Reopen log )";

pub const USER_HEADERS: [&str; 3] = ["Project", "Assignee", "Reopens Count"];
pub const TICKET_HEADERS: [&str; 5] =
    ["Issue key", "Issue Type", "Summary", "Reopens Count", "Assignee"];

/// One row of the intermediate export, reduced to the columns this stage uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    pub issue_key: String,
    pub issue_type: String,
    pub summary: String,
    pub assignee: String,
    pub reopen_log: String,
}

/// Read the intermediate export CSV.
///
/// The reopen-log column must be present; every other column defaults to
/// the empty string when absent (the source data is noisy by contract).
pub fn read_export(path: &str) -> ReopenResult<Vec<ExportRecord>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| ReopenError::Io(format!("cannot open {path}: {e}")))?;

    let headers = reader
        .headers()
        .map_err(|e| ReopenError::DataFormat(format!("bad header row in {path}: {e}")))?
        .clone();
    let column = |name: &str| headers.iter().position(|h| h == name);

    let log_idx = column(LOG_COLUMN).ok_or_else(|| {
        ReopenError::DataFormat(format!("expected column '{LOG_COLUMN}' not found"))
    })?;
    let key_idx = column("Issue key");
    let type_idx = column("Issue Type");
    let summary_idx = column("Summary");
    let assignee_idx = column("Assignee");

    let mut records = Vec::new();
    for result in reader.records() {
        let record =
            result.map_err(|e| ReopenError::DataFormat(format!("malformed row in {path}: {e}")))?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i)).unwrap_or("").to_string()
        };
        records.push(ExportRecord {
            issue_key: cell(key_idx),
            issue_type: cell(type_idx),
            summary: cell(summary_idx),
            assignee: cell(assignee_idx),
            reopen_log: cell(Some(log_idx)),
        });
    }
    Ok(records)
}

pub fn write_by_user(path: &str, rows: &[UserRow]) -> ReopenResult<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| ReopenError::Io(format!("cannot create {path}: {e}")))?;
    writer
        .write_record(USER_HEADERS)
        .map_err(|e| ReopenError::Io(format!("write {path}: {e}")))?;
    for row in rows {
        writer
            .write_record([
                row.project.as_str(),
                row.assignee.as_str(),
                &row.reopens_count.to_string(),
            ])
            .map_err(|e| ReopenError::Io(format!("write {path}: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| ReopenError::Io(format!("flush {path}: {e}")))
}

pub fn write_by_ticket(path: &str, rows: &[TicketRow]) -> ReopenResult<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| ReopenError::Io(format!("cannot create {path}: {e}")))?;
    writer
        .write_record(TICKET_HEADERS)
        .map_err(|e| ReopenError::Io(format!("write {path}: {e}")))?;
    for row in rows {
        writer
            .write_record([
                row.issue_key.as_str(),
                row.issue_type.as_str(),
                row.summary.as_str(),
                &row.reopens_count.to_string(),
                row.assignee.as_str(),
            ])
            .map_err(|e| ReopenError::Io(format!("write {path}: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| ReopenError::Io(format!("flush {path}: {e}")))
}

/// Run the whole report stage: read the export, extract events, aggregate
/// them for the month, write both tables. Returns the table row counts.
pub fn process(
    export_path: &str,
    out_user: &str,
    out_ticket: &str,
    month: &Month,
) -> ReopenResult<(usize, usize)> {
    let records = read_export(export_path)?;

    let events: Vec<_> = records.iter().flat_map(extract_events).collect();
    tracing::info!(rows = records.len(), events = events.len(), "extracted reopen events");

    let (users, tickets) = aggregate(&events, month);
    write_by_user(out_user, &users)?;
    write_by_ticket(out_ticket, &tickets)?;

    Ok((users.len(), tickets.len()))
}
