use std::collections::BTreeMap;

use chrono::NaiveDate;

use reopens_common::Month;

use crate::extract::ReopenEvent;

/// Reopens per (project, assignee).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub project: String,
    pub assignee: String,
    pub reopens_count: u64,
}

/// Reopens per ticket, split by the assignee attributed to the events.
/// A ticket reassigned mid-history appears once per distinct assignee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketRow {
    pub issue_key: String,
    pub issue_type: String,
    pub summary: String,
    pub reopens_count: u64,
    pub assignee: String,
}

/// Project prefix of an issue key (`ABC-123` -> `ABC`). Keys without a
/// hyphen, or with a leading hyphen, have no project.
pub fn issue_key_project(key: &str) -> &str {
    match key.find('-') {
        Some(i) if i > 0 => &key[..i],
        _ => "",
    }
}

/// Reduce events to the two report tables for the target month.
///
/// Events with unparseable dates or dates outside the month are dropped,
/// never errored. Both tables come out sorted on their leading key columns
/// (project then assignee; assignee then issue key).
pub fn aggregate(events: &[ReopenEvent], month: &Month) -> (Vec<UserRow>, Vec<TicketRow>) {
    let mut by_user: BTreeMap<(String, String), u64> = BTreeMap::new();
    let mut by_ticket: BTreeMap<(String, String, String, String), u64> = BTreeMap::new();

    for event in events {
        let Ok(date) = NaiveDate::parse_from_str(&event.date, "%Y-%m-%d") else {
            continue;
        };
        if !month.contains(date) {
            continue;
        }

        let project = issue_key_project(&event.issue_key).to_string();
        *by_user
            .entry((project, event.assignee.clone()))
            .or_insert(0) += 1;
        *by_ticket
            .entry((
                event.assignee.clone(),
                event.issue_key.clone(),
                event.issue_type.clone(),
                event.summary.clone(),
            ))
            .or_insert(0) += 1;
    }

    let users = by_user
        .into_iter()
        .map(|((project, assignee), reopens_count)| UserRow {
            project,
            assignee,
            reopens_count,
        })
        .collect();

    let tickets = by_ticket
        .into_iter()
        .map(
            |((assignee, issue_key, issue_type, summary), reopens_count)| TicketRow {
                issue_key,
                issue_type,
                summary,
                reopens_count,
                assignee,
            },
        )
        .collect();

    (users, tickets)
}
