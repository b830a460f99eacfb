//! Sex recovery
//!
//! An explicit `M`/`F` value always wins. Otherwise each candidate field is
//! scanned in order; inside a field the lexical patterns (masculine table
//! first) are tried before the anatomical keywords (masculine table first).
//! Table order and field order decide ambiguous texts.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use super::text::scan_form;
use crate::models::{TypedRow, Value};

/// Patient sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    M,
    F,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
        }
    }

    /// Parse an explicit value; anything other than `M`/`F` counts as unset
    pub fn from_value(value: &Value) -> Option<Self> {
        match value.to_string().trim().to_uppercase().as_str() {
            "M" => Some(Sex::M),
            "F" => Some(Sex::F),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lexical cue with an optional negative lookahead
#[derive(Debug)]
pub struct SexPattern {
    regex: Regex,
    not_followed_by: Option<&'static str>,
}

impl SexPattern {
    fn new(pattern: &str, not_followed_by: Option<&'static str>) -> Self {
        Self {
            regex: Regex::new(pattern).expect("Invalid regex"),
            not_followed_by,
        }
    }

    /// Whether any occurrence in `text` satisfies the lookahead
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.find_iter(text).any(|m| match self.not_followed_by {
            Some(suffix) => !text[m.end()..].starts_with(suffix),
            None => true,
        })
    }
}

static MALE_PATTERNS: Lazy<Vec<SexPattern>> = Lazy::new(|| {
    vec![
        SexPattern::new(r"\bhomme\b", None),
        SexPattern::new(r"\bgarçon\b", None),
        // patient but not patiente
        SexPattern::new(r"\bpatient\b", Some("e")),
        SexPattern::new(r"\bmasculin\b", None),
        SexPattern::new(r"\bil présente\b", None),
        SexPattern::new(r"\bil consulte\b", None),
        SexPattern::new(r"\bil s'agit\b", None),
        SexPattern::new(r"\bil a\b", None),
        SexPattern::new(r"\ble patient\b", Some("e")),
        SexPattern::new(r"\bd['’]un homme\b", None),
        SexPattern::new(r"\bchez lui\b", None),
        SexPattern::new(r"\bmr\b", None),
        SexPattern::new(r"\bm\.\b", None),
    ]
});

static FEMALE_PATTERNS: Lazy<Vec<SexPattern>> = Lazy::new(|| {
    vec![
        SexPattern::new(r"\bfemme\b", None),
        SexPattern::new(r"\bfille\b", None),
        SexPattern::new(r"\bpatiente\b", None),
        SexPattern::new(r"\bpatientes\b", None),
        SexPattern::new(r"\bféminin\b", None),
        SexPattern::new(r"\belle présente\b", None),
        SexPattern::new(r"\belle consulte\b", None),
        SexPattern::new(r"\belle s'agit\b", None),
        SexPattern::new(r"\belle a\b", None),
        SexPattern::new(r"\bla patiente\b", None),
        SexPattern::new(r"\bd['’]une femme\b", None),
        SexPattern::new(r"\bchez elle\b", None),
        SexPattern::new(r"\bmme\b", None),
        SexPattern::new(r"\bmme\.\b", None),
        SexPattern::new(r"\bmademoiselle\b", None),
        SexPattern::new(r"\bmle\b", None),
    ]
});

/// Anatomy and pathology strongly associated with male patients
pub const MALE_KEYWORDS: &[&str] = &[
    "prostate",
    "testicule",
    "scrotum",
    "verge",
    "pénis",
    "penis",
    "epididyme",
    "épididyme",
    "andropause",
];

/// Anatomy and pathology strongly associated with female patients
pub const FEMALE_KEYWORDS: &[&str] = &[
    "ovaire",
    "ovaires",
    "utérus",
    "uterus",
    "grossesse",
    "endomètre",
    "endometre",
    "fœtus",
    "foetus",
    "ménopause",
    "menopause",
    "gynécologie",
    "gynecologie",
    "mamelle",
];

/// Sex suggested by one free-text field
pub fn infer_sex_from_text(text: &str) -> Option<Sex> {
    let text = scan_form(text);
    if text.is_empty() {
        return None;
    }

    let lexical = [(Sex::M, &*MALE_PATTERNS), (Sex::F, &*FEMALE_PATTERNS)];
    for (sex, patterns) in lexical {
        if patterns.iter().any(|p| p.is_match(&text)) {
            return Some(sex);
        }
    }

    let anatomical = [(Sex::M, MALE_KEYWORDS), (Sex::F, FEMALE_KEYWORDS)];
    for (sex, keywords) in anatomical {
        if keywords.iter().any(|kw| text.contains(kw)) {
            return Some(sex);
        }
    }

    None
}

/// Resolve a row's sex: explicit value first, then the text fields in order
pub fn resolve_sex(row: &TypedRow, sex_column: &str, text_fields: &[String]) -> Option<Sex> {
    if let Some(sex) = row.get(sex_column).and_then(Sex::from_value) {
        return Some(sex);
    }
    text_fields
        .iter()
        .filter_map(|field| row.get_text(field))
        .find_map(infer_sex_from_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> Vec<String> {
        ["clinicalpresentation", "description", "commentary", "title", "keywords"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_lexical_cues() {
        assert_eq!(infer_sex_from_text("Homme de 45 ans"), Some(Sex::M));
        assert_eq!(infer_sex_from_text("La patiente consulte"), Some(Sex::F));
        assert_eq!(infer_sex_from_text("Patient de 30 ans"), Some(Sex::M));
        assert_eq!(infer_sex_from_text("Mme X., 52 ans"), Some(Sex::F));
        assert_eq!(infer_sex_from_text("Elle présente une masse"), Some(Sex::F));
        assert_eq!(infer_sex_from_text("d’une femme enceinte"), Some(Sex::F));
    }

    #[test]
    fn test_patient_lookahead() {
        let pattern = SexPattern::new(r"\bpatient", Some("e"));
        assert!(pattern.is_match("le patient"));
        assert!(!pattern.is_match("la patiente"));
        assert!(pattern.is_match("la patiente et le patient"));
    }

    #[test]
    fn test_keywords() {
        assert_eq!(infer_sex_from_text("Adénome de la prostate"), Some(Sex::M));
        assert_eq!(infer_sex_from_text("Kyste de l'ovaire"), Some(Sex::F));
        assert_eq!(infer_sex_from_text("Fracture du fémur"), None);
    }

    #[test]
    fn test_patterns_beat_keywords_within_field() {
        assert_eq!(infer_sex_from_text("femme, douleur de la prostate ?"), Some(Sex::F));
    }

    #[test]
    fn test_explicit_value_beats_keywords() {
        let row = TypedRow::from_cells([
            ("sex", Some(Value::from(" f "))),
            ("description", Some(Value::from("Carcinome de la prostate"))),
        ]);
        assert_eq!(resolve_sex(&row, "sex", &fields()), Some(Sex::F));
    }

    #[test]
    fn test_field_order() {
        let row = TypedRow::from_cells([
            ("sex", Some(Value::from("?"))),
            ("clinicalpresentation", Some(Value::from("Kyste de l'ovaire"))),
            ("description", Some(Value::from("homme de 40 ans"))),
        ]);
        assert_eq!(resolve_sex(&row, "sex", &fields()), Some(Sex::F));
    }

    #[test]
    fn test_unknown_sex() {
        let row = TypedRow::from_cells([("title", Some(Value::from("Fracture")))]);
        assert_eq!(resolve_sex(&row, "sex", &fields()), None);
    }
}
