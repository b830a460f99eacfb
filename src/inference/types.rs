//! Column-name normalization and sample type classification

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::ColumnType;

static RE_NON_IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").expect("Invalid regex"));
static RE_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("Invalid regex"));
static RE_FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+\.[0-9]+$").expect("Invalid regex"));
static RE_ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("Invalid regex"));

/// Name used when a tag normalizes to nothing
pub const UNKNOWN_COLUMN: &str = "unknown";

/// Normalize a source tag into a column identifier.
///
/// Runs of characters outside `[A-Za-z0-9_]` collapse to `_`, surrounding
/// underscores are stripped and the result is lowercased. Idempotent.
///
/// # Examples
///
/// ```
/// use case_warehouse::inference::normalize_column_name;
///
/// assert_eq!(normalize_column_name("Clinical Presentation"), "clinical_presentation");
/// assert_eq!(normalize_column_name("  KeyWords "), "keywords");
/// assert_eq!(normalize_column_name("***"), "unknown");
/// ```
pub fn normalize_column_name(raw: &str) -> String {
    let replaced = RE_NON_IDENT.replace_all(raw.trim(), "_");
    let name = replaced.trim_matches('_').to_ascii_lowercase();
    if name.is_empty() {
        UNKNOWN_COLUMN.to_string()
    } else {
        name
    }
}

/// Classify a sample value.
///
/// Checked in order: integer, float, ISO date that exists on the calendar,
/// string. Empty samples are strings.
pub fn classify_sample(value: &str) -> ColumnType {
    let value = value.trim();
    if value.is_empty() {
        ColumnType::String
    } else if RE_INT.is_match(value) {
        ColumnType::Int
    } else if RE_FLOAT.is_match(value) {
        ColumnType::Float
    } else if RE_ISO_DATE.is_match(value) && NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok() {
        ColumnType::Date
    } else {
        ColumnType::String
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in [
            "ClinicalPresentation",
            "Birth-Date",
            "__weird__name__",
            "Âge du patient",
            "a__b",
            "",
            "x:y:z",
        ] {
            let once = normalize_column_name(raw);
            assert_eq!(normalize_column_name(&once), once, "not idempotent for {raw:?}");
            assert!(
                once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'),
                "bad characters in {once:?}"
            );
        }
    }

    #[test]
    fn test_normalize_examples() {
        assert_eq!(normalize_column_name("Birth-Date"), "birth_date");
        assert_eq!(normalize_column_name("Âge"), "ge");
        assert_eq!(normalize_column_name(""), "unknown");
    }

    #[test]
    fn test_classify_order() {
        assert_eq!(classify_sample("42"), ColumnType::Int);
        assert_eq!(classify_sample("-7"), ColumnType::Int);
        assert_eq!(classify_sample("3.14"), ColumnType::Float);
        assert_eq!(classify_sample("2023-01-05"), ColumnType::Date);
        assert_eq!(classify_sample("foo"), ColumnType::String);
        assert_eq!(classify_sample(" 12 "), ColumnType::Int);
        assert_eq!(classify_sample(""), ColumnType::String);
    }

    #[test]
    fn test_invalid_calendar_date_is_string() {
        assert_eq!(classify_sample("2023-02-30"), ColumnType::String);
        assert_eq!(classify_sample("2023-13-01"), ColumnType::String);
    }
}
