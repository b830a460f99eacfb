//! Lenient date reading for birth and exam dates
//!
//! Day-first formats win over month-first ones, matching how French case
//! records write dates.

use chrono::{Datelike, NaiveDate};

use crate::models::Value;

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
];

/// Parse a date written in one of the supported formats
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    // Timestamps keep only their date part
    let date_part = text.split(['T', ' ']).next().unwrap_or(text);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

/// Year of a date-like value: a parsed date, a bare four-digit year, or an
/// integer year
pub fn value_year(value: &Value) -> Option<i32> {
    match value {
        Value::Int(year) => i32::try_from(*year).ok().filter(|y| (1000..=9999).contains(y)),
        Value::Float(_) => None,
        Value::Text(text) | Value::Date(text) => {
            let trimmed = text.trim();
            if trimmed.len() == 4 && trimmed.chars().all(|c| c.is_ascii_digit()) {
                return trimmed.parse().ok();
            }
            parse_date(trimmed).map(|d| d.year())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formats() {
        let expected = NaiveDate::from_ymd_opt(2004, 3, 12).unwrap();
        let formats = [
            "2004-03-12",
            "12/03/2004",
            "12-03-2004",
            "12.03.2004",
            "2004/03/12",
            "2004-03-12T10:00:00",
        ];
        for text in formats {
            assert_eq!(parse_date(text), Some(expected), "{text}");
        }
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("31/02/2004"), None);
    }

    #[test]
    fn test_value_year() {
        assert_eq!(value_year(&Value::Date("12/03/2004".into())), Some(2004));
        assert_eq!(value_year(&Value::Text("1960".into())), Some(1960));
        assert_eq!(value_year(&Value::Int(1975)), Some(1975));
        assert_eq!(value_year(&Value::Int(12)), None);
        assert_eq!(value_year(&Value::Text("hier".into())), None);
    }
}
