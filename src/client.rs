//! The enhancement client: probe, bootstrap, request, retry.
//!
//! One call to [`OllamaClient::enhance`] drives an explicit state machine:
//!
//! ```text
//! Probing ──▶ Requesting ──▶ Succeeded
//!    ▲            │
//!    │            ├──▶ RetryWait (transport failure, attempts left)
//!    └────────────┘
//!                 ├──▶ Failed (transport failure, attempts exhausted)
//!                 └──▶ Degraded (response unintelligible — original text back)
//! ```
//!
//! Retry/backoff state is threaded through an iterative loop in
//! [`RetryState`] — a tagged result comes back, never an unwind. The
//! asymmetry between the two failure arms is deliberate: only
//! transport-level failures (connect, timeout, non-2xx) are worth retrying;
//! anything else means the server answered and retrying would send the same
//! bytes to get the same confusion, so the caller gets the original text
//! back with a diagnostic instead.

use crate::config::EnhanceConfig;
use crate::error::DocPolishError;
use crate::prompts::EDITOR_SYSTEM_PROMPT;
use serde::{Deserialize, Serialize};
use std::process::{Command, Stdio};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// A completed enhancement call.
#[derive(Debug, Clone)]
pub struct Enhancement {
    /// The enhanced text — or the original input when `degraded`.
    pub text: String,
    /// Request attempts made (1..=max_retries).
    pub attempts: u32,
    /// True when the response could not be interpreted and the original
    /// text was returned unchanged.
    pub degraded: bool,
    /// True when the request body was truncated to the input cap.
    pub truncated: bool,
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    stream: bool,
    options: SamplingOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct SamplingOptions {
    temperature: f32,
    top_p: f32,
    repeat_penalty: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Why a single request attempt failed.
enum RequestFailure {
    /// Connect/timeout/non-2xx — transient, retried with backoff.
    Transport(String),
    /// The server answered but the body made no sense — not retried.
    Malformed(String),
}

// ── Retry state ──────────────────────────────────────────────────────────

/// Attempt counter and timeout schedule for one enhancement call.
///
/// The timeout starts at the configured base and is multiplied by the
/// backoff factor after each transport failure; the sleep before the next
/// attempt is half the timeout that just failed. With the defaults the
/// schedule is: 30 s request → sleep 15 s → 60 s request → sleep 30 s →
/// 120 s request → give up.
#[derive(Debug)]
pub(crate) struct RetryState {
    attempt: u32,
    max_attempts: u32,
    timeout: Duration,
    backoff_factor: u32,
}

impl RetryState {
    pub(crate) fn new(config: &EnhanceConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_retries,
            timeout: Duration::from_secs(config.initial_timeout_secs),
            backoff_factor: config.backoff_factor,
        }
    }

    /// Whether another attempt may be started.
    pub(crate) fn has_attempts_left(&self) -> bool {
        self.attempt < self.max_attempts
    }

    /// Start the next attempt, returning its request timeout.
    pub(crate) fn begin_attempt(&mut self) -> Duration {
        self.attempt += 1;
        self.timeout
    }

    /// Whether the attempt just started was the final one.
    pub(crate) fn is_final(&self) -> bool {
        self.attempt >= self.max_attempts
    }

    /// Record a transport failure: returns the sleep before the next
    /// attempt (half the failed timeout) and grows the timeout.
    pub(crate) fn backoff(&mut self) -> Duration {
        let delay = self.timeout / 2;
        self.timeout *= self.backoff_factor;
        delay
    }

    /// Attempts made so far.
    pub(crate) fn attempts(&self) -> u32 {
        self.attempt
    }
}

// ── Client ───────────────────────────────────────────────────────────────

/// Client for the local Ollama chat endpoint.
pub struct OllamaClient {
    http: reqwest::Client,
    config: EnhanceConfig,
}

impl OllamaClient {
    pub fn new(config: &EnhanceConfig) -> Result<Self, DocPolishError> {
        // Per-request timeouts vary across retries, so the client itself
        // carries none.
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| DocPolishError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            config: config.clone(),
        })
    }

    /// Liveness probe: `GET /api/tags` with the short probe timeout.
    pub async fn is_reachable(&self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        match self
            .http
            .get(&url)
            .timeout(Duration::from_secs(self.config.probe_timeout_secs))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    /// Probe the server, bootstrapping it once if allowed.
    ///
    /// The cycle runs at most once per call: probe → spawn serve command →
    /// grace sleep → re-probe. Starting a server that is already coming up
    /// elsewhere is harmless (the spawn fails or the duplicate exits), so
    /// there is no lock around the side effect.
    async fn ensure_available(&self) -> Result<(), DocPolishError> {
        if self.is_reachable().await {
            return Ok(());
        }

        if self.config.autostart && self.spawn_server() {
            info!(
                "Backend unreachable; spawned '{}', waiting {}s",
                self.config.serve_command.join(" "),
                self.config.startup_grace_secs
            );
            sleep(Duration::from_secs(self.config.startup_grace_secs)).await;
            if self.is_reachable().await {
                return Ok(());
            }
        }

        Err(DocPolishError::BackendUnavailable {
            url: self.config.base_url.clone(),
        })
    }

    /// Spawn the serve command detached, output discarded.
    fn spawn_server(&self) -> bool {
        let Some((program, args)) = self.config.serve_command.split_first() else {
            return false;
        };
        Command::new(program)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .is_ok()
    }

    /// Enhance `text`, retrying transport failures with backoff.
    ///
    /// # Errors
    /// * [`DocPolishError::BackendUnavailable`] — the probe/bootstrap cycle
    ///   failed; no request was sent for this cycle.
    /// * [`DocPolishError::BackendRequestFailed`] — every attempt failed at
    ///   the transport level.
    ///
    /// A response that arrives but cannot be interpreted is *not* an error:
    /// the original text comes back with [`Enhancement::degraded`] set.
    pub async fn enhance(&self, text: &str) -> Result<Enhancement, DocPolishError> {
        let payload = truncate_chars(text, self.config.max_input_chars);
        let truncated = payload.len() < text.len();
        if truncated {
            info!(
                "Input truncated for the request: {} of {} chars sent",
                self.config.max_input_chars,
                text.chars().count()
            );
        }
        let system = self
            .config
            .system_prompt
            .as_deref()
            .unwrap_or(EDITOR_SYSTEM_PROMPT);

        let mut retry = RetryState::new(&self.config);

        while retry.has_attempts_left() {
            // Probing — a failed cycle fails the whole call.
            self.ensure_available().await?;

            // Requesting.
            let timeout = retry.begin_attempt();
            debug!(
                "Enhancement attempt {}/{} (timeout {:?})",
                retry.attempts(),
                self.config.max_retries,
                timeout
            );

            match self.send_chat(system, payload, timeout).await {
                Ok(content) => {
                    return Ok(Enhancement {
                        text: content,
                        attempts: retry.attempts(),
                        degraded: false,
                        truncated,
                    });
                }
                Err(RequestFailure::Malformed(detail)) => {
                    warn!("Unintelligible backend response, returning original text: {detail}");
                    return Ok(Enhancement {
                        text: text.to_string(),
                        attempts: retry.attempts(),
                        degraded: true,
                        truncated,
                    });
                }
                Err(RequestFailure::Transport(detail)) => {
                    if retry.is_final() {
                        return Err(DocPolishError::BackendRequestFailed {
                            attempts: retry.attempts(),
                            detail,
                        });
                    }
                    // RetryWait.
                    let delay = retry.backoff();
                    warn!(
                        "Attempt {} failed ({detail}); retrying in {:?}",
                        retry.attempts(),
                        delay
                    );
                    sleep(delay).await;
                }
            }
        }

        // Unreachable in practice — every arm above returns — but if the
        // loop ever falls through, the original text is the safe answer.
        warn!("Retry loop exhausted without a verdict, returning original text");
        Ok(Enhancement {
            text: text.to_string(),
            attempts: retry.attempts(),
            degraded: true,
            truncated,
        })
    }

    /// One request/response cycle against `/api/chat`.
    async fn send_chat(
        &self,
        system: &str,
        user: &str,
        timeout: Duration,
    ) -> Result<String, RequestFailure> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
            options: SamplingOptions {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                repeat_penalty: self.config.repeat_penalty,
            },
        };

        let url = format!("{}/api/chat", self.config.base_url);
        let resp = self
            .http
            .post(&url)
            .timeout(timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RequestFailure::Transport(format!("request timed out after {timeout:?}"))
                } else {
                    RequestFailure::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RequestFailure::Transport(format!("HTTP {status}")));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| RequestFailure::Malformed(format!("response body: {e}")))?;

        Ok(parsed.message.content)
    }
}

/// Truncate to a character count without splitting a code point.
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EnhanceConfig {
        EnhanceConfig::default()
    }

    #[test]
    fn timeout_sequence_doubles() {
        let mut retry = RetryState::new(&config());

        assert_eq!(retry.begin_attempt(), Duration::from_secs(30));
        assert_eq!(retry.backoff(), Duration::from_secs(15));
        assert_eq!(retry.begin_attempt(), Duration::from_secs(60));
        assert_eq!(retry.backoff(), Duration::from_secs(30));
        assert_eq!(retry.begin_attempt(), Duration::from_secs(120));
        assert!(retry.is_final());
    }

    #[test]
    fn attempts_are_bounded() {
        let mut retry = RetryState::new(&config());
        let mut made = 0;
        while retry.has_attempts_left() {
            retry.begin_attempt();
            made += 1;
        }
        assert_eq!(made, 3);
        assert_eq!(retry.attempts(), 3);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "ééééé"; // five 2-byte chars
        assert_eq!(truncate_chars(s, 3), "ééé");
        assert_eq!(truncate_chars(s, 10), s);
        assert_eq!(truncate_chars("", 5), "");
    }

    #[test]
    fn chat_request_matches_wire_shape() {
        let req = ChatRequest {
            model: "deepseek-r1:7b",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "sys",
                },
                ChatMessage {
                    role: "user",
                    content: "hello",
                },
            ],
            stream: false,
            options: SamplingOptions {
                temperature: 0.7,
                top_p: 0.9,
                repeat_penalty: 1.1,
            },
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["model"], "deepseek-r1:7b");
        assert_eq!(v["stream"], false);
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["content"], "hello");
        assert!((v["options"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        assert!((v["options"]["top_p"].as_f64().unwrap() - 0.9).abs() < 1e-6);
        assert!((v["options"]["repeat_penalty"].as_f64().unwrap() - 1.1).abs() < 1e-6);
    }

    #[test]
    fn chat_response_parses_nested_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"model":"m","message":{"role":"assistant","content":"better"},"done":true}"#)
                .unwrap();
        assert_eq!(parsed.message.content, "better");
    }
}
