//! Structure census of a raw record
//!
//! Produces the sample hints fed to mapping synthesis. Nothing downstream
//! depends on it for correctness.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::RawRecord;

/// Default node-visit budget
pub const DEFAULT_MAX_NODES: usize = 5000;

/// Occurrences of one tag at one depth
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub depth: usize,
    pub count: usize,
}

/// Census of tag occurrences by depth, sorted by (depth, tag)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructureSummary {
    pub entries: Vec<TagCount>,
    /// Set when the node budget stopped the walk early
    pub truncated: bool,
}

impl StructureSummary {
    /// Human-readable rendering, one indented line per entry
    pub fn to_text(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{}- {} ({} occurrences)", "  ".repeat(e.depth), e.tag, e.count))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Tags in summary order
    pub fn tags(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.tag.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Census {
    counts: HashMap<(String, usize), usize>,
    seen: usize,
    max_nodes: usize,
    truncated: bool,
}

impl Census {
    fn visit_children(&mut self, node: &RawRecord, depth: usize) {
        let Some(entries) = node.entries() else {
            return;
        };
        for (tag, child) in entries {
            match child {
                RawRecord::List(items) => {
                    for item in items {
                        self.visit_tagged(tag, item, depth);
                    }
                }
                _ => self.visit_tagged(tag, child, depth),
            }
        }
    }

    fn visit_tagged(&mut self, tag: &str, node: &RawRecord, depth: usize) {
        if self.seen >= self.max_nodes {
            self.truncated = true;
            return;
        }
        *self.counts.entry((tag.to_string(), depth)).or_insert(0) += 1;
        self.seen += 1;
        self.visit_children(node, depth + 1);
    }
}

/// Count tag occurrences per depth, visiting at most `max_nodes` tagged nodes.
///
/// Entries of the root map sit at depth 0. Each element of a list under key
/// `K` counts as one occurrence of `K`.
pub fn summarize_structure(root: &RawRecord, max_nodes: usize) -> StructureSummary {
    let mut census = Census {
        counts: HashMap::new(),
        seen: 0,
        max_nodes,
        truncated: false,
    };
    census.visit_children(root, 0);

    let truncated = census.truncated;
    let mut entries: Vec<TagCount> = census
        .counts
        .into_iter()
        .map(|((tag, depth), count)| TagCount { tag, depth, count })
        .collect();
    entries.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.tag.cmp(&b.tag)));

    StructureSummary { entries, truncated }
}

/// Collect `(tag, value)` samples from scalar leaves in document order.
///
/// Only the first occurrence of each tag is sampled; a list contributes its
/// first element. At most `limit` samples are returned.
pub fn collect_samples(record: &RawRecord, limit: usize) -> Vec<(String, String)> {
    let mut samples = Vec::new();
    collect_into(record, limit, &mut samples);
    samples
}

fn collect_into(node: &RawRecord, limit: usize, out: &mut Vec<(String, String)>) {
    let Some(entries) = node.entries() else {
        return;
    };
    for (tag, child) in entries {
        if out.len() >= limit {
            return;
        }
        let child = match child {
            RawRecord::List(items) => match items.first() {
                Some(first) => first,
                None => continue,
            },
            other => other,
        };
        match child {
            RawRecord::Scalar(text) => {
                if !out.iter().any(|(t, _)| t == tag) {
                    out.push((tag.clone(), text.clone()));
                }
            }
            nested => collect_into(nested, limit, out),
        }
    }
}
