use reopens_common::Month;

/// Status whose transitions mark a reopen. Fixed by the report's contract,
/// not user-editable.
pub const REOPEN_STATUS: &str = "Reopen";

/// Build the fixed-shape JQL selecting issues reopened within the month
/// whose log field is non-empty.
///
/// Generates:
/// `status CHANGED TO "Reopen" DURING ("2024-03-01", "2024-03-31") AND "Reopen log [Short text]" IS NOT EMPTY`
pub fn build_reopen_jql(month: &Month, log_field: &str) -> String {
    let start = month.first_day().format("%Y-%m-%d");
    let end = month.last_day().format("%Y-%m-%d");
    format!(
        "status CHANGED TO \"{REOPEN_STATUS}\" DURING (\"{start}\", \"{end}\") AND {} IS NOT EMPTY",
        escape_jql_value(log_field)
    )
}

/// Escape a JQL value — wrap in quotes if it contains special characters.
fn escape_jql_value(value: &str) -> String {
    if value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        value.to_string()
    } else {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
