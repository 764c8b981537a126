//! Error types for the docpolish library.
//!
//! The taxonomy mirrors the failure boundaries of the pipeline:
//!
//! * Extraction errors ([`DocPolishError::UnsupportedFormat`],
//!   [`DocPolishError::ExtractionFailed`]) — fatal to the upload; the caller
//!   must retry with a different or repaired file.
//! * Backend errors ([`DocPolishError::BackendUnavailable`],
//!   [`DocPolishError::BackendRequestFailed`]) — fatal to one enhancement
//!   attempt. `BackendUnavailable` means the probe-and-bootstrap cycle could
//!   not reach the server at all; `BackendRequestFailed` means the server was
//!   reachable but every retried request failed at the transport level.
//!
//! One failure mode is deliberately *not* an error: when the backend answers
//! but the response cannot be interpreted (malformed body, missing field),
//! the client logs a diagnostic and hands back the original text flagged as
//! degraded. Only transport failures retry; see [`crate::client`].

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the docpolish library.
#[derive(Debug, Error)]
pub enum DocPolishError {
    // ── Extraction errors ─────────────────────────────────────────────────
    /// The filename suffix names no supported format.
    #[error("Unsupported file format: '.{extension}'\nSupported formats: .txt, .docx, .pdf")]
    UnsupportedFormat { extension: String },

    /// Parsing or OCR failed somewhere in the extraction pipeline.
    ///
    /// Carries the original failure's description; no partial text is
    /// returned alongside this error.
    #[error("Failed to extract text: {detail}")]
    ExtractionFailed { detail: String },

    // ── Backend errors ────────────────────────────────────────────────────
    /// The model server did not answer the liveness probe, even after the
    /// bootstrap attempt.
    #[error(
        "Model server at '{url}' is unavailable.\n\
         Make sure Ollama is installed and running (try: ollama serve),\n\
         or pass a different --base-url."
    )]
    BackendUnavailable { url: String },

    /// Every retried request failed at the transport level.
    #[error("Enhancement request failed after {attempts} attempts: {detail}")]
    BackendRequestFailed { attempts: u32, detail: String },

    // ── Persistence errors ────────────────────────────────────────────────
    /// The document store rejected the record write.
    #[error("Failed to save document record: {detail}")]
    StoreFailed { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{}'\nCheck the path exists and is readable.", .path.display())]
    FileNotFound { path: PathBuf },

    /// Could not create or write the output document.
    #[error("Failed to write output file '{}': {source}", .path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DocPolishError {
    /// Wrap an arbitrary failure as an extraction error, preserving its
    /// description. Used at every seam of the extraction pipeline so callers
    /// see one uniform error kind regardless of which parser failed.
    pub(crate) fn extraction(detail: impl std::fmt::Display) -> Self {
        DocPolishError::ExtractionFailed {
            detail: detail.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_names_extension() {
        let e = DocPolishError::UnsupportedFormat {
            extension: "odt".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains(".odt"), "got: {msg}");
        assert!(msg.contains(".docx"));
    }

    #[test]
    fn backend_unavailable_mentions_url() {
        let e = DocPolishError::BackendUnavailable {
            url: "http://localhost:11434".into(),
        };
        assert!(e.to_string().contains("http://localhost:11434"));
    }

    #[test]
    fn request_failed_display() {
        let e = DocPolishError::BackendRequestFailed {
            attempts: 3,
            detail: "connection reset".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("3 attempts"));
        assert!(msg.contains("connection reset"));
    }

    #[test]
    fn extraction_wrapper_preserves_detail() {
        let e = DocPolishError::extraction("bad xref table");
        assert!(e.to_string().contains("bad xref table"));
    }
}
