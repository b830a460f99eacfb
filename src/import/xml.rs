//! XML import
//!
//! Builds the same tree shape as xmltodict: an element with only text is a
//! scalar, attributes become `@name` entries, repeated child tags become a
//! list and text mixed with children is kept under `#text`. The document
//! itself is a map holding the root element.

use once_cell::sync::Lazy;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, warn};

use super::{ImportError, ImportReport, ImportResult, SourceDocument};
use crate::mapping::projector::TEXT_KEY;
use crate::models::RawRecord;

static RE_NAMED_ENTITY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&([A-Za-z][A-Za-z0-9]*);").expect("Invalid regex"));

/// HTML entities found in case archives, with their replacement
const HTML_ENTITIES: &[(&str, &str)] = &[
    ("nbsp", " "),
    ("eacute", "é"),
    ("ecirc", "ê"),
    ("egrave", "è"),
    ("agrave", "à"),
    ("acirc", "â"),
    ("ccedil", "ç"),
    ("ocirc", "ô"),
    ("icirc", "î"),
    ("iuml", "ï"),
    ("ucirc", "û"),
    ("ugrave", "ù"),
    ("euml", "ë"),
    ("Eacute", "É"),
    ("Egrave", "È"),
    ("laquo", "«"),
    ("raquo", "»"),
    ("deg", "°"),
    ("micro", "µ"),
];

/// Entities the XML parser resolves itself
const XML_ENTITIES: &[&str] = &["amp", "lt", "gt", "quot", "apos"];

/// Replace HTML named entities so the document parses as XML.
///
/// XML built-ins are left for the parser; unknown names become a space.
pub fn clean_entities(raw: &str) -> Cow<'_, str> {
    RE_NAMED_ENTITY.replace_all(raw, |caps: &Captures<'_>| {
        let name = &caps[1];
        if XML_ENTITIES.contains(&name) {
            return caps[0].to_string();
        }
        HTML_ENTITIES
            .iter()
            .find(|(entity, _)| *entity == name)
            .map(|(_, text)| text.to_string())
            .unwrap_or_else(|| " ".to_string())
    })
}

/// Decode document bytes as UTF-8, falling back to ISO-8859-1
pub fn decode_bytes(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        // Every latin-1 byte is the code point of the same value
        Err(_) => Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect()),
    }
}

/// Element under construction
struct Frame {
    name: String,
    node: RawRecord,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> ImportResult<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut node = RawRecord::empty_map();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ImportError::StructuralParse(e.to_string()))?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr
                .unescape_value()
                .map_err(|e| ImportError::StructuralParse(e.to_string()))?;
            node.insert(key, RawRecord::scalar(value.into_owned()));
        }
        Ok(Self {
            name,
            node,
            text: String::new(),
        })
    }

    fn close(self) -> (String, RawRecord) {
        let Frame { name, mut node, text } = self;
        let childless = node.entries().is_none_or(|e| e.is_empty());
        if childless {
            return (name, RawRecord::scalar(text));
        }
        if !text.is_empty() {
            node.insert(TEXT_KEY, RawRecord::scalar(text));
        }
        (name, node)
    }

    fn push_text(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(text);
    }
}

/// Parse one XML document into a record holding its root element
pub fn parse_xml(content: &str) -> ImportResult<RawRecord> {
    let cleaned = clean_entities(content);
    let mut reader = Reader::from_str(&cleaned);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut document = RawRecord::empty_map();
    let mut has_root = false;

    let mut attach = |stack: &mut Vec<Frame>, frame: Frame| {
        let (name, node) = frame.close();
        match stack.last_mut() {
            Some(parent) => parent.node.insert(name, node),
            None => {
                has_root = true;
                document.insert(name, node);
            }
        }
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Frame::open(&e)?),
            Ok(Event::Empty(e)) => {
                let frame = Frame::open(&e)?;
                attach(&mut stack, frame);
            }
            Ok(Event::Text(e)) => {
                let text = e
                    .unescape()
                    .map_err(|e| ImportError::StructuralParse(e.to_string()))?;
                if let Some(frame) = stack.last_mut() {
                    frame.push_text(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(frame) = stack.last_mut() {
                    frame.push_text(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::End(_)) => {
                let frame = stack.pop().ok_or_else(|| {
                    ImportError::StructuralParse("unexpected closing tag".to_string())
                })?;
                attach(&mut stack, frame);
            }
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(e) => {
                return Err(ImportError::StructuralParse(format!(
                    "{} at position {}",
                    e,
                    reader.buffer_position()
                )));
            }
        }
    }

    if let Some(frame) = stack.last() {
        return Err(ImportError::StructuralParse(format!(
            "unclosed element <{}>",
            frame.name
        )));
    }
    if !has_root {
        return Err(ImportError::StructuralParse("document has no root element".to_string()));
    }
    Ok(document)
}

/// Reads XML case documents from disk
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlImporter;

impl XmlImporter {
    pub fn new() -> Self {
        Self
    }

    /// Parse XML content
    pub fn import(&self, content: &str) -> ImportResult<RawRecord> {
        parse_xml(content)
    }

    /// Read and parse one file
    pub fn import_file(&self, path: &Path) -> ImportResult<SourceDocument> {
        let bytes = std::fs::read(path)
            .map_err(|e| ImportError::IoError(format!("{}: {}", path.display(), e)))?;
        let record = parse_xml(&decode_bytes(&bytes))?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(SourceDocument { source, record })
    }
}

/// Load a batch of files, skipping and counting the ones that fail
pub fn load_documents<P: AsRef<Path>>(paths: &[P]) -> (Vec<SourceDocument>, ImportReport) {
    let importer = XmlImporter::new();
    let mut documents = Vec::with_capacity(paths.len());
    let mut report = ImportReport::default();

    for path in paths {
        let path = path.as_ref();
        match importer.import_file(path) {
            Ok(doc) => {
                debug!("Loaded {}", doc.source);
                documents.push(doc);
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                report.skipped.push((path.display().to_string(), e.to_string()));
            }
        }
    }

    report.loaded = documents.len();
    (documents, report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xmltodict_shape() {
        let xml = r#"<?xml version="1.0"?>
<CASIMAGE_CASE lang="fr">
  <ID>12</ID>
  <Keyword>os</Keyword>
  <Keyword>fracture</Keyword>
  <Empty/>
</CASIMAGE_CASE>"#;
        let doc = parse_xml(xml).unwrap();
        let case = doc.get("CASIMAGE_CASE").unwrap();
        assert_eq!(case.get("@lang").and_then(RawRecord::as_scalar), Some("fr"));
        assert_eq!(case.get("ID").and_then(RawRecord::as_scalar), Some("12"));
        assert_eq!(
            case.get("Keyword"),
            Some(&RawRecord::List(vec![
                RawRecord::scalar("os"),
                RawRecord::scalar("fracture"),
            ]))
        );
        assert_eq!(case.get("Empty").and_then(RawRecord::as_scalar), Some(""));
    }

    #[test]
    fn test_mixed_text_is_kept() {
        let doc = parse_xml("<A>note<B>x</B></A>").unwrap();
        let a = doc.get("A").unwrap();
        assert_eq!(a.get(TEXT_KEY).and_then(RawRecord::as_scalar), Some("note"));
        assert_eq!(a.get("B").and_then(RawRecord::as_scalar), Some("x"));
    }

    #[test]
    fn test_html_entities_cleaned() {
        let doc = parse_xml("<T>Fracture&nbsp;du f&eacute;mur &amp; &hellip;</T>").unwrap();
        assert_eq!(
            doc.get("T").and_then(RawRecord::as_scalar),
            Some("Fracture du fémur &")
        );
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(
            parse_xml("<A><B></A>"),
            Err(ImportError::StructuralParse(_))
        ));
        assert!(parse_xml("<A>").is_err());
        assert!(parse_xml("").is_err());
    }

    #[test]
    fn test_latin1_fallback() {
        let bytes = b"<T>f\xE9mur</T>";
        assert_eq!(decode_bytes(bytes), "<T>fémur</T>");
        assert_eq!(decode_bytes("<T>é</T>".as_bytes()), "<T>é</T>");
    }
}
