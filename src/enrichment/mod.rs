//! Heuristic enrichment of projected case rows
//!
//! Duplicate rows are dropped first. Rows are then normalized, and age and
//! sex are recovered from structured columns or free text. Rows without any
//! recoverable age are dropped.

pub mod age;
pub mod dates;
pub mod derived;
pub mod qcm;
pub mod sex;
pub mod text;

pub use age::{AgeColumns, extract_age_from_text, resolve_age};
pub use dates::parse_date;
pub use derived::{age_group, exam_year};
pub use qcm::flatten_qcm;
pub use sex::{Sex, infer_sex_from_text, resolve_sex};
pub use text::{normalize_text, scan_form};

use std::collections::HashSet;
use tracing::debug;

use crate::config::EnrichmentSection;
use crate::models::{TypedRow, Value};

/// Result of enriching a batch of rows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichmentOutcome {
    /// Kept rows in input order
    pub rows: Vec<TypedRow>,
    /// Rows dropped for lack of any recoverable age
    pub dropped_no_age: usize,
    /// Rows dropped as identical to an earlier row
    pub dropped_duplicates: usize,
}

/// Keep the first of each group of identical rows, in input order.
///
/// Returns the kept rows and the number removed.
pub fn drop_duplicate_rows(rows: Vec<TypedRow>) -> (Vec<TypedRow>, usize) {
    let total = rows.len();
    let mut seen = HashSet::with_capacity(total);
    let kept: Vec<TypedRow> = rows
        .into_iter()
        .filter(|row| seen.insert(row.clone()))
        .collect();
    let removed = total - kept.len();
    (kept, removed)
}

/// Applies the enrichment rules configured in [`EnrichmentSection`]
#[derive(Debug, Clone, Default)]
pub struct Enricher {
    settings: EnrichmentSection,
}

impl Enricher {
    pub fn new(settings: EnrichmentSection) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &EnrichmentSection {
        &self.settings
    }

    /// Enrich one row, or `None` when no age can be recovered
    pub fn enrich(&self, row: &TypedRow) -> Option<TypedRow> {
        let s = &self.settings;
        let mut row = row.clone();

        for column in &s.normalize_columns {
            if let Some(Value::Text(text)) = row.get(column) {
                let normalized = normalize_text(text);
                row.set(column.as_str(), Some(Value::Text(normalized)));
            }
        }

        let age = resolve_age(
            &row,
            AgeColumns {
                age: &s.age_column,
                text_fields: &s.age_text_fields,
                birthdate: &s.birthdate_column,
                exam_date: &s.exam_date_column,
            },
        )?;
        row.set(s.age_column.as_str(), Some(Value::Int(age)));

        let sex = resolve_sex(&row, &s.sex_column, &s.sex_text_fields)
            .map(|sex| sex.as_str())
            .unwrap_or_default();
        row.set(s.sex_column.as_str(), Some(Value::from(sex)));

        if s.derive_columns {
            let year = exam_year(row.get(&s.exam_date_column)).map(Value::Int);
            row.set(s.year_column.as_str(), year);
            let group = age_group(age).map(Value::from);
            row.set(s.age_group_column.as_str(), group);
        }

        Some(row)
    }

    /// Drop duplicate rows when configured, returning the number removed
    pub fn deduplicate(&self, rows: Vec<TypedRow>) -> (Vec<TypedRow>, usize) {
        if !self.settings.drop_duplicates {
            return (rows, 0);
        }
        let (rows, removed) = drop_duplicate_rows(rows);
        if removed > 0 {
            debug!("Dropped {} duplicate rows", removed);
        }
        (rows, removed)
    }

    /// Deduplicate then enrich a batch, counting every dropped row
    pub fn enrich_all(&self, rows: &[TypedRow]) -> EnrichmentOutcome {
        let (unique, dropped_duplicates) = self.deduplicate(rows.to_vec());
        let mut outcome = EnrichmentOutcome {
            dropped_duplicates,
            ..Default::default()
        };
        for row in &unique {
            match self.enrich(row) {
                Some(row) => outcome.rows.push(row),
                None => outcome.dropped_no_age += 1,
            }
        }
        if outcome.dropped_no_age > 0 {
            debug!("Dropped {} rows without a recoverable age", outcome.dropped_no_age);
        }
        outcome
    }
}
