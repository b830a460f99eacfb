//! Free-text normalization

use once_cell::sync::Lazy;
use regex::Regex;

static RE_CONTROL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\x00-\x1F\x7F-\x{9F}]").expect("Invalid regex"));
static RE_WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("Invalid regex"));

/// Replace control characters and `***` artifacts with spaces, collapse
/// whitespace runs and trim.
///
/// # Examples
///
/// ```
/// use case_warehouse::enrichment::normalize_text;
///
/// assert_eq!(normalize_text("  Homme\tde ***45\u{0}ans  "), "Homme de 45 ans");
/// ```
pub fn normalize_text(text: &str) -> String {
    let text = RE_CONTROL.replace_all(text, " ");
    let text = text.replace("***", " ");
    RE_WHITESPACE.replace_all(&text, " ").trim().to_string()
}

/// Normalized, lowercased text used by every pattern scan
pub fn scan_form(text: &str) -> String {
    normalize_text(text).to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_characters_removed() {
        assert_eq!(normalize_text("a\u{1}b\u{7f}c\u{85}d"), "a b c d");
    }

    #[test]
    fn test_artifacts_and_spacing() {
        assert_eq!(normalize_text("***Fracture***  du\n\nfémur"), "Fracture du fémur");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_scan_form_lowercases() {
        assert_eq!(scan_form("PATIENTE de 30 ANS"), "patiente de 30 ans");
    }
}
