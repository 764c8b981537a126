//! Configuration for document enhancement.
//!
//! Every knob lives in one [`EnhanceConfig`] struct built via its
//! [`EnhanceConfigBuilder`]. Keeping the whole surface in one place makes it
//! trivial to share a config between the extractor, the client, and the CLI,
//! and to diff two runs to understand why their outputs differ.

use crate::error::DocPolishError;
use serde::{Deserialize, Serialize};

/// Configuration for one enhancement pipeline.
///
/// Built via [`EnhanceConfig::builder()`] or [`EnhanceConfig::default()`].
///
/// # Example
/// ```rust
/// use docpolish::EnhanceConfig;
///
/// let config = EnhanceConfig::builder()
///     .model("llama3.2")
///     .max_retries(2)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhanceConfig {
    /// Base URL of the Ollama server. Default: `http://localhost:11434`.
    pub base_url: String,

    /// Model identifier passed in the chat request. Default: `deepseek-r1:7b`.
    pub model: String,

    /// Total request attempts per enhancement call (not "extra retries").
    /// Default: 3.
    ///
    /// Only transport-level failures consume attempts; a malformed response
    /// body short-circuits into the degrade path without retrying.
    pub max_retries: u32,

    /// Per-request timeout for the *first* attempt, in seconds. Default: 30.
    ///
    /// Local models routinely take tens of seconds on long documents, so the
    /// timeout doubles after each failed attempt (30 → 60 → 120 with the
    /// default backoff factor) rather than staying flat.
    pub initial_timeout_secs: u64,

    /// Multiplier applied to the request timeout after each transport
    /// failure. Default: 2.
    pub backoff_factor: u32,

    /// Timeout for the liveness probe (`GET /api/tags`), in seconds.
    /// Default: 5. Deliberately short — the probe exists to fail fast.
    pub probe_timeout_secs: u64,

    /// Whether an unreachable server may be bootstrapped by spawning
    /// [`EnhanceConfig::serve_command`]. Default: true.
    pub autostart: bool,

    /// Command spawned to bootstrap the server, argv form.
    /// Default: `["ollama", "serve"]`.
    pub serve_command: Vec<String>,

    /// Grace period after spawning the serve command before re-probing, in
    /// seconds. Default: 3.
    pub startup_grace_secs: u64,

    /// Maximum characters of extracted text sent to the model. Default: 20000.
    ///
    /// Text beyond the cap is truncated in the request only; the full
    /// extracted text is kept for display and persistence.
    pub max_input_chars: usize,

    /// Maximum characters of original/enhanced text kept in a stored
    /// document record. Default: 10000.
    pub max_stored_chars: usize,

    /// Sampling temperature. Default: 0.7.
    pub temperature: f32,

    /// Nucleus-sampling threshold. Default: 0.9.
    pub top_p: f32,

    /// Repetition penalty. Default: 1.1.
    pub repeat_penalty: f32,

    /// Custom system prompt. If None, uses [`crate::prompts::EDITOR_SYSTEM_PROMPT`].
    pub system_prompt: Option<String>,

    /// Strip `<think>…</think>` reasoning blocks from the model output.
    /// Default: true (the default model is a reasoning model and emits them).
    pub strip_reasoning: bool,

    /// Longest-edge pixel cap when rasterising a PDF page for OCR.
    /// Default: 2000.
    ///
    /// A safety cap independent of page size: an A0 poster could otherwise
    /// produce an image large enough to exhaust memory before tesseract ever
    /// sees it.
    pub ocr_max_pixels: u32,

    /// OCR language code handed to tesseract. Default: `eng`.
    pub ocr_language: String,

    /// Name or path of the tesseract executable. Default: `tesseract`.
    pub tesseract_command: String,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "deepseek-r1:7b".to_string(),
            max_retries: 3,
            initial_timeout_secs: 30,
            backoff_factor: 2,
            probe_timeout_secs: 5,
            autostart: true,
            serve_command: vec!["ollama".to_string(), "serve".to_string()],
            startup_grace_secs: 3,
            max_input_chars: 20_000,
            max_stored_chars: 10_000,
            temperature: 0.7,
            top_p: 0.9,
            repeat_penalty: 1.1,
            system_prompt: None,
            strip_reasoning: true,
            ocr_max_pixels: 2000,
            ocr_language: "eng".to_string(),
            tesseract_command: "tesseract".to_string(),
        }
    }
}

impl EnhanceConfig {
    /// Create a new builder for `EnhanceConfig`.
    pub fn builder() -> EnhanceConfigBuilder {
        EnhanceConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`EnhanceConfig`].
#[derive(Debug)]
pub struct EnhanceConfigBuilder {
    config: EnhanceConfig,
}

impl EnhanceConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        // A trailing slash would produce "//api/chat" when joining routes.
        self.config.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_retries(mut self, n: u32) -> Self {
        self.config.max_retries = n.max(1);
        self
    }

    pub fn initial_timeout_secs(mut self, secs: u64) -> Self {
        self.config.initial_timeout_secs = secs.max(1);
        self
    }

    pub fn backoff_factor(mut self, factor: u32) -> Self {
        self.config.backoff_factor = factor.max(1);
        self
    }

    pub fn probe_timeout_secs(mut self, secs: u64) -> Self {
        self.config.probe_timeout_secs = secs.max(1);
        self
    }

    pub fn autostart(mut self, v: bool) -> Self {
        self.config.autostart = v;
        self
    }

    pub fn serve_command(mut self, argv: Vec<String>) -> Self {
        self.config.serve_command = argv;
        self
    }

    pub fn startup_grace_secs(mut self, secs: u64) -> Self {
        self.config.startup_grace_secs = secs;
        self
    }

    pub fn max_input_chars(mut self, n: usize) -> Self {
        self.config.max_input_chars = n.max(1);
        self
    }

    pub fn max_stored_chars(mut self, n: usize) -> Self {
        self.config.max_stored_chars = n.max(1);
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn top_p(mut self, p: f32) -> Self {
        self.config.top_p = p.clamp(0.0, 1.0);
        self
    }

    pub fn repeat_penalty(mut self, p: f32) -> Self {
        self.config.repeat_penalty = p.max(0.0);
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn strip_reasoning(mut self, v: bool) -> Self {
        self.config.strip_reasoning = v;
        self
    }

    pub fn ocr_max_pixels(mut self, px: u32) -> Self {
        self.config.ocr_max_pixels = px.max(100);
        self
    }

    pub fn ocr_language(mut self, lang: impl Into<String>) -> Self {
        self.config.ocr_language = lang.into();
        self
    }

    pub fn tesseract_command(mut self, cmd: impl Into<String>) -> Self {
        self.config.tesseract_command = cmd.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EnhanceConfig, DocPolishError> {
        let c = &self.config;
        if c.base_url.is_empty() {
            return Err(DocPolishError::InvalidConfig(
                "base_url must not be empty".into(),
            ));
        }
        if !c.base_url.starts_with("http://") && !c.base_url.starts_with("https://") {
            return Err(DocPolishError::InvalidConfig(format!(
                "base_url must be an HTTP/HTTPS URL, got '{}'",
                c.base_url
            )));
        }
        if c.max_retries == 0 {
            return Err(DocPolishError::InvalidConfig(
                "max_retries must be ≥ 1".into(),
            ));
        }
        if c.backoff_factor < 2 {
            return Err(DocPolishError::InvalidConfig(format!(
                "backoff_factor must be ≥ 2 so retry timeouts strictly increase, got {}",
                c.backoff_factor
            )));
        }
        if c.autostart && c.serve_command.is_empty() {
            return Err(DocPolishError::InvalidConfig(
                "serve_command must not be empty when autostart is enabled".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_backend_contract() {
        let c = EnhanceConfig::default();
        assert_eq!(c.base_url, "http://localhost:11434");
        assert_eq!(c.max_retries, 3);
        assert_eq!(c.initial_timeout_secs, 30);
        assert_eq!(c.backoff_factor, 2);
        assert_eq!(c.probe_timeout_secs, 5);
        assert_eq!(c.startup_grace_secs, 3);
        assert_eq!(c.max_input_chars, 20_000);
        assert_eq!(c.max_stored_chars, 10_000);
    }

    #[test]
    fn builder_trims_trailing_slash() {
        let c = EnhanceConfig::builder()
            .base_url("http://localhost:11434/")
            .build()
            .unwrap();
        assert_eq!(c.base_url, "http://localhost:11434");
    }

    #[test]
    fn builder_rejects_non_http_url() {
        let err = EnhanceConfig::builder()
            .base_url("localhost:11434")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("HTTP"));
    }

    #[test]
    fn builder_clamps_sampling_params() {
        let c = EnhanceConfig::builder()
            .temperature(5.0)
            .top_p(2.0)
            .build()
            .unwrap();
        assert_eq!(c.temperature, 2.0);
        assert_eq!(c.top_p, 1.0);
    }

    #[test]
    fn builder_rejects_weak_backoff() {
        // max(1) in the setter still lets 1 through so build() must catch it.
        let err = EnhanceConfig::builder()
            .backoff_factor(1)
            .build()
            .unwrap_err();
        assert!(matches!(err, DocPolishError::InvalidConfig(_)));
    }

    #[test]
    fn request_and_storage_caps_are_independent() {
        // A small request cap with full-size storage is a legitimate setup.
        let c = EnhanceConfig::builder()
            .max_input_chars(100)
            .max_stored_chars(200)
            .build()
            .unwrap();
        assert_eq!(c.max_input_chars, 100);
        assert_eq!(c.max_stored_chars, 200);
    }
}
