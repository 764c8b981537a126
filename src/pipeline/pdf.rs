//! PDF extraction: per-page text layer with OCR fallback.
//!
//! pdfium wants a file-system path, so the uploaded bytes are materialised
//! into a [`tempfile::NamedTempFile`] scoped to this one call — RAII deletes
//! it on every exit path, including panics. Pages are walked in order; a
//! page whose text layer is empty (a scanned image page) is rasterised
//! under the configured pixel cap and handed to the OCR engine. The
//! fallback is per page: pages that already yielded text are never
//! re-processed, so mixed text/scan documents come out without duplicates.
//!
//! Everything here blocks; the caller runs it inside `spawn_blocking`
//! because pdfium is not async-safe.

use crate::config::EnhanceConfig;
use crate::error::DocPolishError;
use crate::pipeline::ocr::OcrEngine;
use pdfium_render::prelude::*;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Extract the text of a PDF, falling back to OCR per scanned page.
///
/// # Errors
/// [`DocPolishError::ExtractionFailed`] for any open/parse/render/OCR
/// failure; no partial text is returned.
pub(crate) fn extract_pdf(
    bytes: &[u8],
    config: &EnhanceConfig,
    ocr: &dyn OcrEngine,
) -> Result<String, DocPolishError> {
    let tmp = materialize(bytes)?;
    extract_pdf_at(tmp.path(), config, ocr)
    // `tmp` drops here — the temp file is gone whether extraction
    // succeeded or not.
}

/// Write the upload into a named temp file pdfium can open.
fn materialize(bytes: &[u8]) -> Result<NamedTempFile, DocPolishError> {
    let mut tmp = NamedTempFile::new()
        .map_err(|e| DocPolishError::extraction(format!("temp file for PDF: {e}")))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| DocPolishError::extraction(format!("writing temp PDF: {e}")))?;
    Ok(tmp)
}

fn extract_pdf_at(
    path: &Path,
    config: &EnhanceConfig,
    ocr: &dyn OcrEngine,
) -> Result<String, DocPolishError> {
    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| DocPolishError::extraction(format!("pdfium library unavailable: {e:?}")))?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium
        .load_pdf_from_file(path, None)
        .map_err(|e| DocPolishError::extraction(format!("cannot open PDF: {e:?}")))?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let cap = config.ocr_max_pixels as i32;
    let render_config = PdfRenderConfig::new()
        .set_target_width(cap)
        .set_maximum_height(cap);

    let mut text = String::new();
    let mut ocr_pages = 0usize;

    for (index, page) in pages.iter().enumerate() {
        let page_text = page
            .text()
            .map_err(|e| {
                DocPolishError::extraction(format!("text extraction on page {}: {e:?}", index + 1))
            })?
            .all();

        if !page_text.trim().is_empty() {
            text.push_str(&page_text);
            text.push('\n');
            continue;
        }

        // No text layer on this page — rasterise it and OCR the image.
        debug!("Page {} has no text layer, running OCR", index + 1);
        let image = page
            .render_with_config(&render_config)
            .map_err(|e| {
                DocPolishError::extraction(format!("rasterising page {}: {e:?}", index + 1))
            })?
            .as_image();

        let recognized = ocr.recognize(&image)?;
        text.push_str(&recognized);
        text.push('\n');
        ocr_pages += 1;
    }

    if ocr_pages > 0 {
        info!("OCR fallback used on {ocr_pages} page(s)");
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ocr::NoOcr;

    #[test]
    fn temp_file_exists_only_while_held() {
        let tmp = materialize(b"%PDF-1.4 not really").unwrap();
        let path = tmp.path().to_path_buf();
        assert!(path.exists());
        drop(tmp);
        assert!(!path.exists());
    }

    #[test]
    fn garbage_bytes_fail_without_leaking_text() {
        let config = EnhanceConfig::default();
        let err = extract_pdf(b"not a pdf at all", &config, &NoOcr).unwrap_err();
        // Binding failure and parse failure both surface as ExtractionFailed;
        // either way no partial text escapes.
        assert!(matches!(err, DocPolishError::ExtractionFailed { .. }));
    }
}
