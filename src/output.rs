//! Result types returned by the enhancement entry points.

use crate::pipeline::extract::DocumentKind;
use serde::{Deserialize, Serialize};

/// The result of enhancing one uploaded document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceOutput {
    /// Full extracted text, before any truncation.
    pub original_text: String,
    /// The model's rewrite, post-processed. Equal to `original_text` when
    /// the call degraded (see [`EnhanceStats::degraded`]).
    pub enhanced_text: String,
    /// Which extractor handled the upload.
    pub kind: DocumentKind,
    /// Timing and retry accounting for this call.
    pub stats: EnhanceStats,
}

/// Accounting for one enhancement call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnhanceStats {
    /// Characters of extracted text.
    pub input_chars: usize,
    /// Characters of enhanced text.
    pub output_chars: usize,
    /// Whether the request body was truncated to the input cap.
    pub input_truncated: bool,
    /// Request attempts made against the backend (1..=max_retries).
    pub attempts: u32,
    /// True when the backend answered but the response could not be
    /// interpreted, so the original text was returned unchanged.
    pub degraded: bool,
    /// Wall-clock time spent in extraction.
    pub extract_duration_ms: u64,
    /// Wall-clock time spent in the backend call, including retries.
    pub enhance_duration_ms: u64,
    /// Total wall-clock time for the call.
    pub total_duration_ms: u64,
}
