//! Record projection: raw record + mapping → typed row

use super::resolver::resolve_path;
use crate::models::{ColumnMapping, ColumnType, MappingSpec, RawRecord, TypedRow, Value};

/// Key holding the text of an element that also has attributes or children
pub const TEXT_KEY: &str = "#text";

/// Applies one mapping to many records
#[derive(Debug, Clone)]
pub struct RecordProjector<'a> {
    spec: &'a MappingSpec,
}

impl<'a> RecordProjector<'a> {
    pub fn new(spec: &'a MappingSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &MappingSpec {
        self.spec
    }

    pub fn project(&self, record: &RawRecord) -> TypedRow {
        project_record(record, self.spec)
    }
}

/// Project a record onto the mapping's columns.
///
/// Total: a missing path or a value that does not parse as the declared type
/// becomes null, and the row always has exactly the mapping's columns in the
/// mapping's order.
pub fn project_record(record: &RawRecord, spec: &MappingSpec) -> TypedRow {
    TypedRow::from_cells(
        spec.columns
            .iter()
            .map(|column| (column.name.clone(), project_column(record, column))),
    )
}

fn project_column(record: &RawRecord, column: &ColumnMapping) -> Option<Value> {
    let node = resolve_path(record, &column.source_path)?;
    let text = scalar_text(node)?;
    coerce(text, column.column_type)
}

fn scalar_text(node: &RawRecord) -> Option<&str> {
    match node {
        RawRecord::Scalar(text) => Some(text),
        RawRecord::Map(_) => node.get(TEXT_KEY).and_then(RawRecord::as_scalar),
        RawRecord::List(_) => None,
    }
}

/// Coerce raw text to a declared type; `None` when it is blank or does not parse
pub fn coerce(text: &str, column_type: ColumnType) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    match column_type {
        ColumnType::Int => trimmed.parse::<i64>().ok().map(Value::Int),
        ColumnType::Float => trimmed
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float),
        ColumnType::Date => Some(Value::Date(trimmed.to_string())),
        ColumnType::String => Some(Value::Text(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> MappingSpec {
        MappingSpec::new(
            "cases",
            vec![
                ColumnMapping::new("id", ColumnType::Int, "/ID"),
                ColumnMapping::new("age", ColumnType::Int, "/Age"),
                ColumnMapping::new("weight", ColumnType::Float, "/Weight"),
                ColumnMapping::new("date", ColumnType::Date, "/Date"),
                ColumnMapping::new("title", ColumnType::String, "/Title"),
                ColumnMapping::new("missing", ColumnType::String, "/Nowhere/Deep"),
            ],
        )
    }

    #[test]
    fn test_projection_is_total() {
        let irregular = [
            RawRecord::empty_map(),
            RawRecord::scalar("not even a map"),
            RawRecord::List(Vec::new()),
            RawRecord::map([("ID", RawRecord::map([("X", RawRecord::scalar("1"))]))]),
        ];
        for record in &irregular {
            let row = project_record(record, &spec());
            assert_eq!(row.columns().collect::<Vec<_>>(), spec().column_names());
        }
    }

    #[test]
    fn test_coercion() {
        let record = RawRecord::map([
            ("ID", RawRecord::scalar(" 12 ")),
            ("Age", RawRecord::scalar("34 ans")),
            ("Weight", RawRecord::scalar("70.5")),
            ("Date", RawRecord::scalar("12/03/2004")),
            (
                "Title",
                RawRecord::map([
                    ("@lang", RawRecord::scalar("fr")),
                    ("#text", RawRecord::scalar(" Cas ")),
                ]),
            ),
        ]);
        let row = project_record(&record, &spec());
        assert_eq!(row.get("id"), Some(&Value::Int(12)));
        assert_eq!(row.get("age"), None);
        assert!(row.has_column("age"));
        assert_eq!(row.get("weight"), Some(&Value::Float(70.5)));
        assert_eq!(row.get("date"), Some(&Value::Date("12/03/2004".into())));
        assert_eq!(row.get("title"), Some(&Value::Text("Cas".into())));
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(coerce("inf", ColumnType::Float), None);
        assert_eq!(coerce("NaN", ColumnType::Float), None);
        assert_eq!(coerce("abc", ColumnType::Int), None);
    }

    #[test]
    fn test_blank_text_is_null_for_every_type() {
        let types = [ColumnType::Int, ColumnType::Float, ColumnType::Date, ColumnType::String];
        for column_type in types {
            assert_eq!(coerce("", column_type), None, "{column_type:?}");
            assert_eq!(coerce(" \t\n", column_type), None, "{column_type:?}");
        }

        let record = RawRecord::map([
            ("Date", RawRecord::scalar("")),
            ("Title", RawRecord::scalar(" ")),
        ]);
        let row = project_record(&record, &spec());
        assert!(row.has_column("date"));
        assert_eq!(row.get("date"), None);
        assert_eq!(row.get("title"), None);
    }
}
