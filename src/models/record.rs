//! Raw hierarchical record model
//!
//! A [`RawRecord`] is the tree produced by a source parser for one case
//! document. It is read-only for every stage after import.

/// Hierarchical node parsed from a semi-structured source document.
///
/// Maps keep their entries in document order and never hold the same key
/// twice at one level: [`RawRecord::insert`] turns a repeated key into a
/// [`RawRecord::List`].
///
/// # Example
///
/// ```rust
/// use case_warehouse::models::RawRecord;
///
/// let record = RawRecord::map([
///     ("ID", RawRecord::scalar("12")),
///     ("Diagnosis", RawRecord::scalar("fracture")),
/// ]);
/// assert_eq!(record.get("diagnosis").and_then(RawRecord::as_scalar), Some("fracture"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    /// Leaf text value
    Scalar(String),
    /// Ordered repetition of nodes
    List(Vec<RawRecord>),
    /// Ordered key → node mapping, keys unique per level
    Map(Vec<(String, RawRecord)>),
}

impl RawRecord {
    /// Create a scalar node
    pub fn scalar(text: impl Into<String>) -> Self {
        RawRecord::Scalar(text.into())
    }

    /// Create a map node from key/value pairs, merging repeated keys into lists
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawRecord)>,
    {
        let mut node = RawRecord::Map(Vec::new());
        for (key, value) in entries {
            node.insert(key, value);
        }
        node
    }

    /// Create an empty map node
    pub fn empty_map() -> Self {
        RawRecord::Map(Vec::new())
    }

    /// Insert an entry into a map node.
    ///
    /// A key already present is promoted to a list holding every value in
    /// insertion order. Inserting into a non-map node is a no-op.
    pub fn insert(&mut self, key: impl Into<String>, value: RawRecord) {
        let RawRecord::Map(entries) = self else {
            return;
        };
        let key = key.into();
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, RawRecord::List(items))) => items.push(value),
            Some((_, existing)) => {
                let first = std::mem::replace(existing, RawRecord::List(Vec::new()));
                *existing = RawRecord::List(vec![first, value]);
            }
            None => entries.push((key, value)),
        }
    }

    /// Text of a scalar node
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            RawRecord::Scalar(text) => Some(text),
            _ => None,
        }
    }

    /// Entries of a map node
    pub fn entries(&self) -> Option<&[(String, RawRecord)]> {
        match self {
            RawRecord::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// First map entry whose key equals `key` ignoring case
    pub fn get(&self, key: &str) -> Option<&RawRecord> {
        let needle = key.to_lowercase();
        self.entries()?
            .iter()
            .find(|(k, _)| k.to_lowercase() == needle)
            .map(|(_, v)| v)
    }

    /// Returns true for scalar nodes
    pub fn is_scalar(&self) -> bool {
        matches!(self, RawRecord::Scalar(_))
    }
}
