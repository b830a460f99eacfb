//! Age recovery
//!
//! Precedence, first success wins:
//! 1. an existing numeric age in [1, 120]
//! 2. an age phrase in the candidate text fields, scanned in field order
//! 3. exam year minus birth year, when both dates parse

use once_cell::sync::Lazy;
use regex::Regex;

use super::dates::value_year;
use super::text::scan_form;
use crate::models::{TypedRow, Value};

/// Youngest accepted age
pub const MIN_AGE: i64 = 1;
/// Oldest accepted age
pub const MAX_AGE: i64 = 120;

// "homme de 45 ans", "patient 12 ans", "16 yo"
static RE_AGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\b[0-9]{1,2})\s*(ans|an|yo|years?)\b").expect("Invalid regex")
});

// "douleurs depuis 10 ans" is an elapsed time, not an age
static RE_DURATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"depuis\s+[0-9]{1,2}\s+ans").expect("Invalid regex"));

/// Disease-course terms that make a field's numbers durations
pub const DISEASE_COURSE_TERMS: &[&str] = &["évolution"];

fn in_range(age: i64) -> Option<i64> {
    (MIN_AGE..=MAX_AGE).contains(&age).then_some(age)
}

/// Age already present in the row's age column
pub fn existing_age(value: &Value) -> Option<i64> {
    let age = match value {
        Value::Int(i) => *i,
        Value::Float(f) if f.is_finite() => f.trunc() as i64,
        Value::Float(_) => return None,
        Value::Text(s) | Value::Date(s) => s.trim().parse::<i64>().ok()?,
    };
    in_range(age)
}

/// Age stated in free text, if the text does not describe a duration.
///
/// # Examples
///
/// ```
/// use case_warehouse::enrichment::extract_age_from_text;
///
/// assert_eq!(extract_age_from_text("patient de 45 ans"), Some(45));
/// assert_eq!(extract_age_from_text("douleurs depuis 10 ans"), None);
/// ```
pub fn extract_age_from_text(text: &str) -> Option<i64> {
    let text = scan_form(text);
    if RE_DURATION.is_match(&text) {
        return None;
    }
    if DISEASE_COURSE_TERMS.iter().any(|term| text.contains(term)) {
        return None;
    }
    let captures = RE_AGE.captures(&text)?;
    let age = captures.get(1)?.as_str().parse::<i64>().ok()?;
    in_range(age)
}

/// Exam year minus birth year, within the accepted range
pub fn computed_age(birth: &Value, exam: &Value) -> Option<i64> {
    let birth_year = value_year(birth)?;
    let exam_year = value_year(exam)?;
    in_range(i64::from(exam_year) - i64::from(birth_year))
}

/// Columns consulted by [`resolve_age`]
#[derive(Debug, Clone, Copy)]
pub struct AgeColumns<'a> {
    pub age: &'a str,
    pub text_fields: &'a [String],
    pub birthdate: &'a str,
    pub exam_date: &'a str,
}

/// Resolve a row's age with the fixed precedence
pub fn resolve_age(row: &TypedRow, columns: AgeColumns<'_>) -> Option<i64> {
    if let Some(age) = row.get(columns.age).and_then(existing_age) {
        return Some(age);
    }

    for field in columns.text_fields {
        if let Some(age) = row.get_text(field).and_then(extract_age_from_text) {
            return Some(age);
        }
    }

    match (row.get(columns.birthdate), row.get(columns.exam_date)) {
        (Some(birth), Some(exam)) => computed_age(birth, exam),
        _ => None,
    }
}
