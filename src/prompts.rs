//! System prompt for the enhancement request.
//!
//! Centralised for the usual two reasons: changing the editing behaviour
//! means touching exactly one place, and unit tests can inspect the prompt
//! without a running model.
//!
//! Callers can override via [`crate::config::EnhanceConfig::system_prompt`];
//! the constant here is used only when no override is provided.

/// Default system instruction sent with every enhancement request.
pub const EDITOR_SYSTEM_PROMPT: &str = "You are a professional editor. \
Improve this document while preserving its meaning: fix grammar, tighten \
wording, and keep the author's structure and intent intact. Return only the \
improved document text.";
