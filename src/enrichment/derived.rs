//! Derived analysis columns

use super::dates::value_year;
use crate::models::Value;

/// Age bins as half-open ranges `[lower, upper)` with their labels
pub const AGE_GROUPS: &[(i64, i64, &str)] = &[
    (0, 20, "0–20"),
    (20, 40, "21–40"),
    (40, 60, "41–60"),
    (60, 80, "61–80"),
    (80, 120, "80+"),
];

/// Label of the bin containing `age`
pub fn age_group(age: i64) -> Option<&'static str> {
    AGE_GROUPS
        .iter()
        .find(|(lower, upper, _)| (*lower..*upper).contains(&age))
        .map(|(_, _, label)| *label)
}

/// Exam year derived from the exam date value
pub fn exam_year(exam_date: Option<&Value>) -> Option<i64> {
    exam_date.and_then(value_year).map(i64::from)
}
