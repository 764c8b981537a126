//! High-level entry points: bytes in, enhanced document out.
//!
//! Everything here composes the lower layers in a fixed order:
//! extract text from the upload, send it through the language model
//! client, clean the reply, then hand the result back as an
//! [`EnhanceOutput`] (or a `.docx` file, or a store record).

use crate::client::OllamaClient;
use crate::config::EnhanceConfig;
use crate::docbuild::build_docx;
use crate::error::DocPolishError;
use crate::output::{EnhanceOutput, EnhanceStats};
use crate::pipeline::extract::extract_text;
use crate::pipeline::ocr::{OcrEngine, TesseractOcr};
use crate::pipeline::postprocess::clean_model_output;
use crate::store::{DocumentRecord, DocumentStore};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Enhance an in-memory upload.
///
/// `filename` selects the extractor by suffix; `bytes` is the raw file
/// content. Scanned PDF pages fall back to tesseract OCR.
pub async fn enhance_bytes(
    filename: &str,
    bytes: Vec<u8>,
    config: &EnhanceConfig,
) -> Result<EnhanceOutput, DocPolishError> {
    let ocr: Arc<dyn OcrEngine> = Arc::new(TesseractOcr::from_config(config));
    enhance_bytes_with_ocr(filename, bytes, config, ocr).await
}

/// Like [`enhance_bytes`] but with a caller-supplied OCR engine.
pub async fn enhance_bytes_with_ocr(
    filename: &str,
    bytes: Vec<u8>,
    config: &EnhanceConfig,
    ocr: Arc<dyn OcrEngine>,
) -> Result<EnhanceOutput, DocPolishError> {
    let started = Instant::now();

    let kind = crate::pipeline::extract::DocumentKind::from_filename(filename)?;
    debug!(filename, kind = kind.as_str(), "extracting text");

    let extract_started = Instant::now();
    let original_text = extract_text(filename, &bytes, config, ocr).await?;
    let extract_duration_ms = extract_started.elapsed().as_millis() as u64;

    let input_chars = original_text.chars().count();
    info!(input_chars, "extraction complete");

    let client = OllamaClient::new(config)?;
    let enhance_started = Instant::now();
    let enhancement = client.enhance(&original_text).await?;
    let enhance_duration_ms = enhance_started.elapsed().as_millis() as u64;

    // Cleanup rules exist for model output only. A degraded call carries the
    // user's own document back, and that must stay byte-for-byte intact.
    let enhanced_text = if enhancement.degraded {
        enhancement.text
    } else {
        clean_model_output(&enhancement.text, config.strip_reasoning)
    };
    let output_chars = enhanced_text.chars().count();
    info!(
        output_chars,
        attempts = enhancement.attempts,
        degraded = enhancement.degraded,
        "enhancement complete"
    );

    Ok(EnhanceOutput {
        original_text,
        enhanced_text,
        kind,
        stats: EnhanceStats {
            input_chars,
            output_chars,
            input_truncated: enhancement.truncated,
            attempts: enhancement.attempts,
            degraded: enhancement.degraded,
            extract_duration_ms,
            enhance_duration_ms,
            total_duration_ms: started.elapsed().as_millis() as u64,
        },
    })
}

/// Enhance a file on disk and write the result as a `.docx` next to it.
///
/// The output file appears atomically: content goes to a temporary file
/// in the destination directory first, then a rename moves it in place.
pub async fn enhance_to_file(
    input: &Path,
    output: &Path,
    config: &EnhanceConfig,
) -> Result<EnhanceStats, DocPolishError> {
    if !input.exists() {
        return Err(DocPolishError::FileNotFound {
            path: input.to_path_buf(),
        });
    }

    let filename = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| DocPolishError::FileNotFound {
            path: input.to_path_buf(),
        })?
        .to_string();

    let bytes = tokio::fs::read(input)
        .await
        .map_err(|_| DocPolishError::FileNotFound {
            path: input.to_path_buf(),
        })?;

    let result = enhance_bytes(&filename, bytes, config).await?;
    let docx = build_docx(&result.enhanced_text)?;
    write_atomic(output, &docx).await?;

    info!(output = %output.display(), "wrote enhanced document");
    Ok(result.stats)
}

/// Enhance an upload and persist the before/after pair for a user.
///
/// Returns the output together with the new record's id. Both stored
/// texts are truncated to `max_stored_chars`.
pub async fn enhance_and_store(
    filename: &str,
    bytes: Vec<u8>,
    user_id: &str,
    store: &dyn DocumentStore,
    config: &EnhanceConfig,
) -> Result<(EnhanceOutput, String), DocPolishError> {
    let result = enhance_bytes(filename, bytes, config).await?;
    let record = DocumentRecord::new(
        filename,
        &result.original_text,
        &result.enhanced_text,
        config.max_stored_chars,
    );
    let doc_id = store.save(user_id, record)?;
    debug!(doc_id = %doc_id, user_id, "saved document record");
    Ok((result, doc_id))
}

/// Blocking wrapper around [`enhance_bytes`] for non-async callers.
pub fn enhance_bytes_sync(
    filename: &str,
    bytes: Vec<u8>,
    config: &EnhanceConfig,
) -> Result<EnhanceOutput, DocPolishError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| DocPolishError::Internal(format!("failed to start async runtime: {e}")))?;
    runtime.block_on(enhance_bytes(filename, bytes, config))
}

/// Blocking wrapper around [`enhance_to_file`] for non-async callers.
pub fn enhance_to_file_sync(
    input: &Path,
    output: &Path,
    config: &EnhanceConfig,
) -> Result<EnhanceStats, DocPolishError> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| DocPolishError::Internal(format!("failed to start async runtime: {e}")))?;
    runtime.block_on(enhance_to_file(input, output, config))
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), DocPolishError> {
    let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
    let io_err = |e: std::io::Error| DocPolishError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    // The temp file must live in the destination directory: persist() is a
    // rename, and renames do not cross filesystems.
    let tmp = match dir {
        Some(d) => tempfile::NamedTempFile::new_in(d),
        None => tempfile::NamedTempFile::new_in("."),
    }
    .map_err(io_err)?;

    tokio::fs::write(tmp.path(), bytes).await.map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
