//! Cross-module integration tests that exercise the extraction pipeline
//! and document builder together, without a backend.

use docpolish::pipeline::docx::extract_docx;
use docpolish::pipeline::extract::extract_text;
use docpolish::{build_docx, DocumentKind, EnhanceConfig, NoOcr, DOCUMENT_HEADING};
use std::sync::Arc;

fn config() -> EnhanceConfig {
    EnhanceConfig::builder().build().unwrap()
}

#[test]
fn built_documents_survive_extraction() {
    let docx = build_docx("Hello\n\nWorld").unwrap();
    let text = extract_docx(&docx).unwrap();
    assert_eq!(text, format!("{DOCUMENT_HEADING}\nHello\nWorld"));
}

#[test]
fn built_documents_preserve_special_characters() {
    let docx = build_docx("Tom & Jerry <draft> \"v2\"").unwrap();
    let text = extract_docx(&docx).unwrap();
    assert!(text.contains("Tom & Jerry <draft> \"v2\""));
}

#[tokio::test]
async fn plain_text_uploads_pass_through_extraction() {
    let text = extract_text("notes.TXT", b"line one\nline two", &config(), Arc::new(NoOcr))
        .await
        .unwrap();
    assert_eq!(text, "line one\nline two");
}

#[tokio::test]
async fn generated_docx_can_be_resubmitted_as_an_upload() {
    let docx = build_docx("Second pass").unwrap();
    let text = extract_text("enhanced.docx", &docx, &config(), Arc::new(NoOcr))
        .await
        .unwrap();
    assert_eq!(text, format!("{DOCUMENT_HEADING}\nSecond pass"));
}

#[test]
fn suffix_dispatch_is_case_insensitive() {
    assert_eq!(
        DocumentKind::from_filename("Report.PDF").unwrap(),
        DocumentKind::Pdf
    );
    assert_eq!(
        DocumentKind::from_filename("letter.Docx").unwrap(),
        DocumentKind::Docx
    );
}

#[test]
fn unknown_suffixes_name_the_extension() {
    let err = DocumentKind::from_filename("image.webp").unwrap_err();
    assert!(err.to_string().contains("webp"));
}
