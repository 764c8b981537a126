//! Format dispatch: decide once, at the boundary, which extractor runs.
//!
//! The upload's format is decided exactly once from the filename suffix and
//! captured in the closed [`DocumentKind`] enum; everything downstream
//! matches on the variant instead of re-sniffing strings. Unknown suffixes
//! fail here with [`DocPolishError::UnsupportedFormat`] before any bytes are
//! touched.

use crate::config::EnhanceConfig;
use crate::error::DocPolishError;
use crate::pipeline::{docx, ocr::OcrEngine, pdf};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// The three supported upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    /// `.txt` — raw UTF-8 text.
    PlainText,
    /// `.docx` — WordprocessingML in a ZIP container.
    Docx,
    /// `.pdf` — text layer per page, OCR fallback for scanned pages.
    Pdf,
}

impl DocumentKind {
    /// Classify a filename by its suffix (case-insensitive).
    ///
    /// # Errors
    /// [`DocPolishError::UnsupportedFormat`] naming the rejected extension.
    pub fn from_filename(filename: &str) -> Result<Self, DocPolishError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "txt" => Ok(DocumentKind::PlainText),
            "docx" => Ok(DocumentKind::Docx),
            "pdf" => Ok(DocumentKind::Pdf),
            _ => Err(DocPolishError::UnsupportedFormat { extension }),
        }
    }

    /// Short label for logs and stats.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::PlainText => "txt",
            DocumentKind::Docx => "docx",
            DocumentKind::Pdf => "pdf",
        }
    }
}

/// Extract the text of an uploaded file.
///
/// Dispatches on the filename suffix; the bytes are borrowed for the
/// duration of the call and nothing is retained afterwards. PDF extraction
/// is offloaded to the blocking thread pool.
///
/// # Errors
/// * [`DocPolishError::UnsupportedFormat`] — unknown suffix
/// * [`DocPolishError::ExtractionFailed`] — any parse/decode/OCR failure;
///   no partial text is returned
pub async fn extract_text(
    filename: &str,
    bytes: &[u8],
    config: &EnhanceConfig,
    ocr: Arc<dyn OcrEngine>,
) -> Result<String, DocPolishError> {
    let kind = DocumentKind::from_filename(filename)?;
    debug!("Extracting '{}' as {}", filename, kind.as_str());

    match kind {
        DocumentKind::PlainText => decode_plain_text(bytes),
        DocumentKind::Docx => docx::extract_docx(bytes),
        DocumentKind::Pdf => {
            let bytes = bytes.to_vec();
            let config = config.clone();
            tokio::task::spawn_blocking(move || pdf::extract_pdf(&bytes, &config, ocr.as_ref()))
                .await
                .map_err(|e| DocPolishError::Internal(format!("Extraction task panicked: {e}")))?
        }
    }
}

/// Decode raw bytes as UTF-8 text, verbatim.
fn decode_plain_text(bytes: &[u8]) -> Result<String, DocPolishError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| DocPolishError::extraction(format!("file is not valid UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ocr::NoOcr;

    #[test]
    fn classifies_supported_suffixes() {
        assert_eq!(
            DocumentKind::from_filename("notes.txt").unwrap(),
            DocumentKind::PlainText
        );
        assert_eq!(
            DocumentKind::from_filename("report.docx").unwrap(),
            DocumentKind::Docx
        );
        assert_eq!(
            DocumentKind::from_filename("scan.pdf").unwrap(),
            DocumentKind::Pdf
        );
    }

    #[test]
    fn classification_is_case_insensitive() {
        assert_eq!(
            DocumentKind::from_filename("REPORT.PDF").unwrap(),
            DocumentKind::Pdf
        );
    }

    #[test]
    fn rejects_unknown_suffix_naming_it() {
        let err = DocumentKind::from_filename("slides.odt").unwrap_err();
        match err {
            DocPolishError::UnsupportedFormat { extension } => assert_eq!(extension, "odt"),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_suffix() {
        let err = DocumentKind::from_filename("README").unwrap_err();
        assert!(matches!(err, DocPolishError::UnsupportedFormat { .. }));
    }

    #[test]
    fn plain_text_is_verbatim() {
        let text = decode_plain_text("héllo\nworld\n".as_bytes()).unwrap();
        assert_eq!(text, "héllo\nworld\n");
    }

    #[test]
    fn plain_text_rejects_invalid_utf8() {
        let err = decode_plain_text(&[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, DocPolishError::ExtractionFailed { .. }));
    }

    #[tokio::test]
    async fn dispatch_routes_plain_text() {
        let config = EnhanceConfig::default();
        let text = extract_text("a.txt", b"hello", &config, Arc::new(NoOcr))
            .await
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn dispatch_rejects_unknown_before_reading_bytes() {
        let config = EnhanceConfig::default();
        let err = extract_text("a.rtf", b"garbage", &config, Arc::new(NoOcr))
            .await
            .unwrap_err();
        assert!(matches!(err, DocPolishError::UnsupportedFormat { .. }));
    }
}
