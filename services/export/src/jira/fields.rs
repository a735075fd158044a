use reopens_common::{ReopenError, ReopenResult};

use super::models::FieldDefinition;

/// Outcome of resolving one display name against the field catalog.
///
/// Resolution never fails; an absent `field_id` is reported through the
/// return value and it is the caller's decision to treat it as fatal.
#[derive(Debug, Clone)]
pub struct ResolvedField {
    pub requested: String,
    pub field_id: Option<String>,
    pub note: String,
}

/// How a candidate key matched the target, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchRank {
    Exact,
    Prefix,
    Substring,
}

/// Normalize a field name: lowercase, trim, and truncate at the first `[`
/// to strip bracketed type annotations such as `[Short text]`.
pub fn normalize(name: &str) -> String {
    let s = name.trim().to_lowercase();
    match s.split_once('[') {
        Some((head, _)) => head.trim().to_string(),
        None => s,
    }
}

/// Build the (normalized name, field id) index in catalog order.
///
/// Definitions sharing a normalized name collide; the first one seen keeps
/// the slot, the rest are dropped. Entries with an empty normalized name or
/// an empty id are skipped.
fn index_catalog(catalog: &[FieldDefinition]) -> Vec<(String, String)> {
    let mut index: Vec<(String, String)> = Vec::new();
    for def in catalog {
        let norm = normalize(&def.name);
        if norm.is_empty() || def.id.is_empty() {
            continue;
        }
        if index.iter().any(|(k, _)| *k == norm) {
            continue;
        }
        index.push((norm, def.id.clone()));
    }
    index
}

fn rank(key: &str, target: &str) -> Option<MatchRank> {
    if key == target {
        Some(MatchRank::Exact)
    } else if key.starts_with(target) {
        Some(MatchRank::Prefix)
    } else if !target.is_empty() && key.contains(target) {
        Some(MatchRank::Substring)
    } else {
        None
    }
}

/// Resolve a human-readable display name to the tracker's opaque field id.
///
/// All candidates are ranked exact > prefix > substring; within a rank the
/// first definition by catalog order wins. The catalog-order tie-break is
/// deliberately coarse (the original tool behaves the same way); the chosen
/// key is surfaced in the note so an unexpected pick shows up in the logs.
pub fn resolve(display: &str, catalog: &[FieldDefinition]) -> ResolvedField {
    let target = normalize(display);
    let index = index_catalog(catalog);

    let mut best: Option<(MatchRank, &str, &str)> = None;
    for (key, id) in &index {
        if let Some(r) = rank(key, &target) {
            if best.map_or(true, |(b, _, _)| r < b) {
                best = Some((r, key.as_str(), id.as_str()));
            }
        }
    }

    match best {
        Some((MatchRank::Exact, _, id)) => ResolvedField {
            requested: display.to_string(),
            field_id: Some(id.to_string()),
            note: format!("resolved by exact name: '{display}'"),
        },
        Some((_, key, id)) => ResolvedField {
            requested: display.to_string(),
            field_id: Some(id.to_string()),
            note: format!("resolved by fuzzy: '{display}' -> '{key}'"),
        },
        None => ResolvedField {
            requested: display.to_string(),
            field_id: None,
            note: format!("not found for '{display}'"),
        },
    }
}

/// Promote an absent resolution to a fatal configuration error. Called by
/// the orchestration layer before any search request is issued.
pub fn require_field_id(resolved: &ResolvedField) -> ReopenResult<String> {
    resolved.field_id.clone().ok_or_else(|| {
        ReopenError::Config(format!(
            "could not resolve custom field id ({})",
            resolved.note
        ))
    })
}
