//! Heuristic mapping inference from sampled tag/value pairs

use std::collections::BTreeMap;

use super::structure::StructureSummary;
use super::types::{classify_sample, normalize_column_name};
use crate::models::{ColumnMapping, ColumnType, MappingSpec};

/// Default target table name
pub const DEFAULT_TARGET_TABLE: &str = "casimage_cases";

/// Most tags turned into synthetic samples from a summary
pub const MAX_SUMMARY_SAMPLES: usize = 30;

/// Sample used when nothing else is available, and after a failed delegation
pub fn fixed_fallback_samples() -> Vec<(String, String)> {
    vec![
        ("id".to_string(), "1".to_string()),
        ("diagnosis".to_string(), "text".to_string()),
    ]
}

/// Build a mapping from `(tag, value)` samples.
///
/// One column per distinct normalized name, read from `/<name>`, sorted by
/// name. When a name repeats, its first non-empty sample decides the type.
/// An empty sample list falls back to [`fixed_fallback_samples`] so the
/// result always has columns.
pub fn infer_mapping(samples: &[(String, String)], target_table: &str) -> MappingSpec {
    if samples.is_empty() {
        return infer_mapping(&fixed_fallback_samples(), target_table);
    }

    let mut schema: BTreeMap<String, Option<ColumnType>> = BTreeMap::new();
    for (tag, value) in samples {
        let name = normalize_column_name(tag);
        let decided = schema.entry(name).or_insert(None);
        if decided.is_none() && !value.trim().is_empty() {
            *decided = Some(classify_sample(value));
        }
    }

    let columns = schema
        .into_iter()
        .map(|(name, column_type)| {
            let path = format!("/{}", name);
            ColumnMapping::new(name, column_type.unwrap_or_default(), path)
        })
        .collect();

    MappingSpec::new(target_table, columns)
}

/// Synthetic samples built from summary tags: `123` for identifier-like tags,
/// `text` otherwise.
pub fn samples_from_summary(summary: &StructureSummary) -> Vec<(String, String)> {
    summary
        .tags()
        .into_iter()
        .take(MAX_SUMMARY_SAMPLES)
        .map(|tag| {
            let value = if tag.to_lowercase().contains("id") {
                "123"
            } else {
                "text"
            };
            (tag.to_string(), value.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::structure::TagCount;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(t, v)| (t.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_types_classify_own_samples() {
        let spec = infer_mapping(
            &pairs(&[
                ("ExamDate", "2023-01-05"),
                ("Count", "42"),
                ("Ratio", "3.14"),
                ("Label", "foo"),
            ]),
            DEFAULT_TARGET_TABLE,
        );
        assert_eq!(spec.target_table, "casimage_cases");
        assert_eq!(spec.column("examdate").unwrap().column_type, ColumnType::Date);
        assert_eq!(spec.column("count").unwrap().column_type, ColumnType::Int);
        assert_eq!(spec.column("ratio").unwrap().column_type, ColumnType::Float);
        assert_eq!(spec.column("label").unwrap().column_type, ColumnType::String);
    }

    #[test]
    fn test_columns_sorted_with_paths() {
        let spec = infer_mapping(&pairs(&[("Title", "x"), ("Age", "3"), ("ID", "1")]), "t");
        assert_eq!(spec.column_names(), vec!["age", "id", "title"]);
        assert_eq!(spec.columns[0].source_path, "/age");
    }

    #[test]
    fn test_first_non_empty_sample_decides() {
        let spec = infer_mapping(
            &pairs(&[("Age", ""), ("Age", "1"), ("AGE", "34 ans")]),
            "t",
        );
        assert_eq!(spec.columns.len(), 1);
        assert_eq!(spec.columns[0].column_type, ColumnType::Int);
    }

    #[test]
    fn test_empty_samples_use_fixed_fallback() {
        let spec = infer_mapping(&[], "t");
        assert_eq!(spec.column_names(), vec!["diagnosis", "id"]);
        assert_eq!(spec.column("id").unwrap().column_type, ColumnType::Int);
    }

    #[test]
    fn test_samples_from_summary() {
        let summary = StructureSummary {
            entries: vec![
                TagCount { tag: "CaseID".into(), depth: 0, count: 1 },
                TagCount { tag: "Title".into(), depth: 0, count: 1 },
            ],
            truncated: false,
        };
        assert_eq!(
            samples_from_summary(&summary),
            pairs(&[("CaseID", "123"), ("Title", "text")])
        );
    }
}
