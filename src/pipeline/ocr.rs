//! The OCR seam: recognise text in a rendered page image.
//!
//! The engine is an external collaborator, so it sits behind a trait that
//! tests can script. The default engine shells out to the `tesseract`
//! executable via a scoped temp file — the binary is ubiquitous, and a
//! subprocess keeps the build free of native library bindings.

use crate::config::EnhanceConfig;
use crate::error::DocPolishError;
use image::DynamicImage;
use std::process::Command;
use tracing::debug;

/// Recognises text in a page image.
///
/// Implementations must be `Send + Sync`: PDF extraction runs on the
/// blocking thread pool and the engine is shared through an `Arc`.
pub trait OcrEngine: Send + Sync {
    /// Return the recognised text for one page image.
    ///
    /// # Errors
    /// [`DocPolishError::ExtractionFailed`] when the engine cannot run or
    /// the recognition itself fails. A blank page is not an error — it
    /// yields empty text.
    fn recognize(&self, image: &DynamicImage) -> Result<String, DocPolishError>;
}

/// OCR via the `tesseract` command-line tool.
pub struct TesseractOcr {
    command: String,
    language: String,
}

impl TesseractOcr {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    pub fn from_config(config: &EnhanceConfig) -> Self {
        Self::new(config.tesseract_command.as_str(), config.ocr_language.as_str())
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String, DocPolishError> {
        // tesseract reads from a path; hand it a PNG in a scoped temp dir
        // that is removed when this call returns, success or failure.
        let dir = tempfile::tempdir()
            .map_err(|e| DocPolishError::extraction(format!("temp dir for OCR: {e}")))?;
        let png_path = dir.path().join("page.png");
        image
            .save_with_format(&png_path, image::ImageFormat::Png)
            .map_err(|e| DocPolishError::extraction(format!("writing OCR input image: {e}")))?;

        let output = Command::new(&self.command)
            .arg(&png_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .map_err(|e| {
                DocPolishError::extraction(format!(
                    "failed to run '{}': {e} (is tesseract installed?)",
                    self.command
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocPolishError::extraction(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!("OCR produced {} chars", text.len());
        Ok(text)
    }
}

/// Engine for callers that want scanned pages to fail instead of OCRing.
///
/// Also the stand-in in tests that never reach the OCR path.
pub struct NoOcr;

impl OcrEngine for NoOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String, DocPolishError> {
        Err(DocPolishError::extraction(
            "page has no text layer and OCR is disabled",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    #[test]
    fn missing_binary_is_an_extraction_error() {
        let engine = TesseractOcr::new("definitely-not-a-real-ocr-binary", "eng");
        let img = DynamicImage::ImageRgba8(RgbaImage::new(8, 8));
        let err = engine.recognize(&img).unwrap_err();
        assert!(matches!(err, DocPolishError::ExtractionFailed { .. }));
        assert!(err.to_string().contains("definitely-not-a-real-ocr-binary"));
    }

    #[test]
    fn no_ocr_always_fails() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        assert!(NoOcr.recognize(&img).is_err());
    }
}
