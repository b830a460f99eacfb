//! XML import tests

#![cfg(feature = "xml")]

use case_warehouse::config::PipelineConfig;
use case_warehouse::import::{load_documents, parse_xml};
use case_warehouse::mapping::LocalSynthesizer;
use case_warehouse::models::{RawRecord, Value};
use case_warehouse::pipeline::Pipeline;
use tempfile::tempdir;

const CASE_XML: &str = r#"<?xml version="1.0" encoding="ISO-8859-1"?>
<CASIMAGE_CASE>
  <ID>101</ID>
  <Age></Age>
  <Sex></Sex>
  <Date>12/03/2004</Date>
  <Diagnosis>Kyste de l&apos;ovaire</Diagnosis>
  <ClinicalPresentation>Patiente de 52&nbsp;ans, douleur pelvienne</ClinicalPresentation>
</CASIMAGE_CASE>"#;

#[test]
fn test_parse_case_document() {
    let doc = parse_xml(CASE_XML).unwrap();
    let case = doc.get("CASIMAGE_CASE").unwrap();
    assert_eq!(case.get("id").and_then(RawRecord::as_scalar), Some("101"));
    assert_eq!(
        case.get("clinicalpresentation").and_then(RawRecord::as_scalar),
        Some("Patiente de 52 ans, douleur pelvienne")
    );
    assert_eq!(
        case.get("diagnosis").and_then(RawRecord::as_scalar),
        Some("Kyste de l'ovaire")
    );
}

#[test]
fn test_batch_skips_malformed_documents() {
    let dir = tempdir().unwrap();
    let good = dir.path().join("good.xml");
    let latin1 = dir.path().join("latin1.xml");
    let broken = dir.path().join("broken.xml");
    std::fs::write(&good, CASE_XML).unwrap();
    let latin1_bytes = b"<CASIMAGE_CASE><ID>7</ID><Title>F\xE9mur</Title></CASIMAGE_CASE>";
    std::fs::write(&latin1, latin1_bytes).unwrap();
    std::fs::write(&broken, "<CASIMAGE_CASE><ID>8</CASIMAGE_CASE>").unwrap();
    let missing = dir.path().join("missing.xml");

    let (documents, report) = load_documents(&[good, broken, latin1, missing]);
    assert_eq!(report.loaded, 2);
    assert_eq!(report.skipped_count(), 2);
    assert_eq!(documents[0].source, "good.xml");
    assert_eq!(documents[1].source, "latin1.xml");

    let title = documents[1]
        .record
        .get("CASIMAGE_CASE")
        .and_then(|c| c.get("Title"))
        .and_then(RawRecord::as_scalar);
    assert_eq!(title, Some("Fémur"));
}

#[test]
fn test_xml_through_pipeline() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("case.xml");
    std::fs::write(&path, CASE_XML).unwrap();
    let (documents, _) = load_documents(&[path]);

    let pipeline =
        Pipeline::with_synthesizer(PipelineConfig::default(), Box::new(LocalSynthesizer::default()))
            .unwrap();
    let output = pipeline.run(&documents).unwrap();

    assert_eq!(output.rows.len(), 1);
    let row = &output.rows[0];
    assert_eq!(row.get("id"), Some(&Value::Int(101)));
    assert_eq!(row.get("age"), Some(&Value::Int(52)));
    assert_eq!(row.get_text("sex"), Some("F"));
    assert_eq!(row.get("year"), Some(&Value::Int(2004)));
    assert_eq!(row.get_text("age_group"), Some("41–60"));
    assert_eq!(row.get_text("source_file"), Some("case.xml"));
    assert_eq!(output.star.fact.rows[0].natural_key, "101");
}

#[test]
fn test_empty_and_absent_elements_share_dimension_members() {
    let dir = tempdir().unwrap();
    let with_empty = dir.path().join("a.xml");
    let without = dir.path().join("b.xml");
    std::fs::write(
        &with_empty,
        concat!(
            "<CASIMAGE_CASE><ID>1</ID><Age>40</Age>",
            "<Diagnosis></Diagnosis><Date> </Date></CASIMAGE_CASE>",
        ),
    )
    .unwrap();
    std::fs::write(&without, "<CASIMAGE_CASE><ID>2</ID><Age>40</Age></CASIMAGE_CASE>").unwrap();
    let (documents, _) = load_documents(&[with_empty, without]);

    let pipeline =
        Pipeline::with_synthesizer(PipelineConfig::default(), Box::new(LocalSynthesizer::default()))
            .unwrap();
    let output = pipeline.run(&documents).unwrap();

    assert!(output.rows[0].has_column("diagnosis"));
    assert_eq!(output.rows[0].get("diagnosis"), None);
    assert_eq!(output.rows[0].get("date"), None);

    let star = &output.star;
    assert_eq!(star.dimension("dim_pathology").unwrap().len(), 1);
    assert_eq!(star.dimension("dim_exam").unwrap().len(), 1);
    assert_eq!(star.fact.len(), 2);
    assert_eq!(star.fact.rows[0].foreign_keys, star.fact.rows[1].foreign_keys);
}

#[test]
fn test_qcms_from_xml() {
    let xml = r#"<CASIMAGE_CASE>
  <ID>5</ID>
  <Age>61</Age>
  <QCM><QUESTION>Localisation ?</QUESTION><ANSWERA>Foie</ANSWERA><ANSWERB>Rate</ANSWERB></QCM>
  <QCM><QUESTION>Examen ?</QUESTION><ANSWER><TEXT>Scanner</TEXT></ANSWER></QCM>
  <QCM><QUESTION>Suivi ?</QUESTION></QCM>
</CASIMAGE_CASE>"#;
    let dir = tempdir().unwrap();
    let path = dir.path().join("qcm.xml");
    std::fs::write(&path, xml).unwrap();
    let (documents, _) = load_documents(&[path]);

    let pipeline =
        Pipeline::with_synthesizer(PipelineConfig::default(), Box::new(LocalSynthesizer::default()))
            .unwrap();
    let output = pipeline.run(&documents).unwrap();

    assert_eq!(
        output.rows[0].get_text("qcms"),
        Some(concat!(
            "Localisation ? | Réponses: Foie; Rate",
            " || Examen ? | Réponses: Scanner",
            " || Suivi ? | Réponses: Aucune réponse",
        ))
    );
    assert_eq!(output.rows[0].get_text("age_group"), Some("61–80"));
}
