//! Simplified path resolution over raw records
//!
//! Paths look like `/A/B/C`. There are no predicates or wildcards and a path
//! yields at most one node: lists are entered through their first element
//! and keys match case-insensitively.

use crate::models::RawRecord;

/// Non-empty segments of a path (`//A/B/` → `["A", "B"]`)
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Resolve `path` against `root`, returning `None` when any step misses.
///
/// # Examples
///
/// ```
/// use case_warehouse::mapping::resolve_path;
/// use case_warehouse::models::RawRecord;
///
/// let case = RawRecord::map([("Diagnosis", RawRecord::scalar("fracture"))]);
/// let record = RawRecord::map([("Case", case)]);
/// let found = resolve_path(&record, "/case/DIAGNOSIS").and_then(RawRecord::as_scalar);
/// assert_eq!(found, Some("fracture"));
/// assert!(resolve_path(&record, "/case/diag").is_none());
/// ```
pub fn resolve_path<'a>(root: &'a RawRecord, path: &str) -> Option<&'a RawRecord> {
    let mut current = root;
    for segment in path_segments(path) {
        if let RawRecord::List(items) = current {
            current = items.first()?;
        }
        let RawRecord::Map(entries) = current else {
            return None;
        };
        let segment = segment.to_lowercase();
        current = entries
            .iter()
            .find(|(key, _)| key.to_lowercase() == segment)
            .map(|(_, value)| value)?;
    }
    match current {
        RawRecord::List(items) => items.first(),
        other => Some(other),
    }
}
