//! Extraction pipeline: uploaded bytes → one text string.
//!
//! Each submodule implements exactly one concern, so every stage is
//! independently testable and the OCR engine can be swapped without touching
//! format dispatch:
//!
//! 1. [`extract`] — closed format dispatch by filename suffix; plain-text
//!    decoding lives here too
//! 2. [`docx`] — WordprocessingML paragraph extraction from the ZIP container
//! 3. [`pdf`] — per-page text-layer extraction with OCR fallback; the only
//!    stage that touches the file system (scoped temp file) and runs in
//!    `spawn_blocking` because pdfium is not async-safe
//! 4. [`ocr`] — the OCR seam: a trait plus the tesseract-CLI engine
//! 5. [`postprocess`] — deterministic cleanup of *model* output (not
//!    extraction output); lives here because it is the same kind of pure
//!    string stage

pub mod docx;
pub mod extract;
pub mod ocr;
pub mod pdf;
pub mod postprocess;
