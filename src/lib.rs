//! # docpolish
//!
//! Enhance documents with a locally-hosted language model (Ollama).
//!
//! ## Why this crate?
//!
//! Cloud rewriting services require shipping your documents to someone
//! else's servers. This crate keeps the whole flow local: it extracts text
//! from an uploaded TXT, DOCX, or PDF file (OCR-ing scanned pages with
//! tesseract), sends it to an Ollama server on this machine for editorial
//! improvement, and hands back the polished text — optionally packaged as
//! a downloadable `.docx` or persisted as a per-user document record.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload (txt / docx / pdf)
//!  │
//!  ├─ 1. Extract   suffix-dispatched text extraction
//!  │               (pdfium text layer, OCR fallback per scanned page)
//!  ├─ 2. Enhance   POST /api/chat to Ollama, bounded retries with
//!  │               doubling timeouts, optional server autostart
//!  ├─ 3. Clean     strip reasoning blocks, normalise whitespace
//!  └─ 4. Deliver   EnhanceOutput / .docx file / DocumentStore record
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docpolish::{enhance_bytes, EnhanceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Talks to Ollama at http://localhost:11434, starting it if needed.
//!     let config = EnhanceConfig::default();
//!     let bytes = std::fs::read("draft.txt")?;
//!     let output = enhance_bytes("draft.txt", bytes, &config).await?;
//!     println!("{}", output.enhanced_text);
//!     eprintln!(
//!         "{} chars in / {} out, {} attempt(s)",
//!         output.stats.input_chars,
//!         output.stats.output_chars,
//!         output.stats.attempts
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docpolish` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docpolish = { version = "0.2", default-features = false }
//! ```
//!
//! ## Failure Model
//!
//! Transport failures (refused connections, timeouts, 5xx) are retried up
//! to `max_retries` times with a doubling per-attempt timeout, and the
//! server is re-probed before every attempt. A backend that answers but
//! cannot be interpreted does not fail the call: the original text comes
//! back unchanged with `stats.degraded` set, so an upload is never lost to
//! a misbehaving model.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod docbuild;
pub mod enhance;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{Enhancement, OllamaClient};
pub use config::{EnhanceConfig, EnhanceConfigBuilder};
pub use docbuild::{build_docx, DOCUMENT_HEADING, DOCX_MIME};
pub use enhance::{
    enhance_and_store, enhance_bytes, enhance_bytes_sync, enhance_bytes_with_ocr, enhance_to_file,
    enhance_to_file_sync,
};
pub use error::DocPolishError;
pub use output::{EnhanceOutput, EnhanceStats};
pub use pipeline::extract::DocumentKind;
pub use pipeline::ocr::{NoOcr, OcrEngine, TesseractOcr};
pub use store::{DocumentRecord, DocumentStore, MemoryStore, STATUS_PROCESSED};
