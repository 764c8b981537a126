//! CLI binary for docpolish.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `EnhanceConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use docpolish::{
    enhance_and_store, enhance_bytes, enhance_to_file, DocumentStore, EnhanceConfig, MemoryStore,
    OllamaClient,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Enhance a text file, print the result to stdout
  docpolish draft.txt

  # Enhance and write a Word document
  docpolish report.pdf -o report-enhanced.docx

  # Use a different model on a remote Ollama host
  docpolish --base-url http://gpu-box:11434 --model llama3.2 notes.docx

  # Scanned PDFs: pick the OCR language
  docpolish --ocr-lang deu scan.pdf -o scan.docx

  # JSON output with timing and retry stats
  docpolish --json draft.txt > result.json

  # Just check whether the Ollama server is reachable
  docpolish --check draft.txt

SUPPORTED INPUTS:
  .txt    UTF-8 plain text
  .docx   Word documents (paragraph text)
  .pdf    text-layer extraction; scanned pages fall back to tesseract OCR

ENVIRONMENT VARIABLES:
  DOCPOLISH_BASE_URL    Ollama server URL (default http://localhost:11434)
  DOCPOLISH_MODEL       Model ID (default deepseek-r1:7b)
  DOCPOLISH_OUTPUT      Default output path

SETUP:
  1. Install Ollama and pull a model:   ollama pull deepseek-r1:7b
  2. Enhance:                           docpolish draft.txt -o draft.docx

  The server is started automatically (`ollama serve`) when it is not
  already running; pass --no-autostart to disable that.
"#;

/// Enhance TXT, DOCX, and PDF documents with a local Ollama model.
#[derive(Parser, Debug)]
#[command(
    name = "docpolish",
    version,
    about = "Enhance TXT, DOCX, and PDF documents with a local Ollama model",
    long_about = "Extract text from a document (with OCR fallback for scanned PDF pages), \
send it to a locally-hosted Ollama model for editorial improvement, and print the result \
or package it as a Word document.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input document (.txt, .docx, or .pdf).
    input: PathBuf,

    /// Write the enhanced text as a .docx to this path instead of stdout.
    #[arg(short, long, env = "DOCPOLISH_OUTPUT")]
    output: Option<PathBuf>,

    /// Ollama server base URL.
    #[arg(long, env = "DOCPOLISH_BASE_URL", default_value = "http://localhost:11434")]
    base_url: String,

    /// Model ID to request.
    #[arg(long, env = "DOCPOLISH_MODEL", default_value = "deepseek-r1:7b")]
    model: String,

    /// Request attempts before giving up.
    #[arg(long, env = "DOCPOLISH_MAX_RETRIES", default_value_t = 3,
          value_parser = clap::value_parser!(u32).range(1..=10))]
    max_retries: u32,

    /// First-attempt timeout in seconds (doubles on each retry).
    #[arg(long, env = "DOCPOLISH_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Do not start `ollama serve` when the server is unreachable.
    #[arg(long, env = "DOCPOLISH_NO_AUTOSTART")]
    no_autostart: bool,

    /// Tesseract language for OCR on scanned PDF pages.
    #[arg(long, env = "DOCPOLISH_OCR_LANG", default_value = "eng")]
    ocr_lang: String,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "DOCPOLISH_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Keep the model's <think> reasoning blocks in the output.
    #[arg(long)]
    keep_reasoning: bool,

    /// Output structured JSON (EnhanceOutput) instead of plain text.
    #[arg(long, env = "DOCPOLISH_JSON")]
    json: bool,

    /// Probe the Ollama server and exit (0 reachable, 1 not).
    #[arg(long)]
    check: bool,

    /// Also save a document record through the in-memory store and report
    /// its id (demonstrates the persistence contract).
    #[arg(long, requires = "user", conflicts_with = "output")]
    save: bool,

    /// User id the saved record belongs to.
    #[arg(long, env = "DOCPOLISH_USER")]
    user: Option<String>,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCPOLISH_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCPOLISH_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DOCPOLISH_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides user feedback, so library INFO logs stay off
    // unless explicitly requested.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = build_config(&cli).await?;

    // ── Check-only mode ──────────────────────────────────────────────────
    if cli.check {
        let client = OllamaClient::new(&config).context("Invalid configuration")?;
        if client.is_reachable().await {
            if !cli.quiet {
                eprintln!("{} Ollama reachable at {}", green("✔"), bold(&config.base_url));
            }
            return Ok(());
        }
        if !cli.quiet {
            eprintln!("{} Ollama not reachable at {}", red("✘"), bold(&config.base_url));
        }
        std::process::exit(1);
    }

    let spinner = if show_progress {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Enhancing");
        bar.set_message(cli.input.display().to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    } else {
        None
    };

    // ── Run enhancement ──────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = enhance_to_file(&cli.input, output_path, &config)
            .await
            .context("Enhancement failed")?;

        if let Some(bar) = spinner {
            bar.finish_and_clear();
        }
        if !cli.quiet {
            eprintln!(
                "{}  {} chars in / {} out  {}ms  →  {}",
                if stats.degraded { cyan("⚠") } else { green("✔") },
                stats.input_chars,
                stats.output_chars,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
            if stats.degraded {
                eprintln!(
                    "   {}",
                    dim("backend reply could not be interpreted; original text kept")
                );
            }
        }
    } else {
        let filename = cli
            .input
            .file_name()
            .and_then(|n| n.to_str())
            .context("Input path has no usable file name")?
            .to_string();
        let bytes = tokio::fs::read(&cli.input)
            .await
            .with_context(|| format!("Failed to read {}", cli.input.display()))?;

        let store = MemoryStore::new();
        let mut saved: Option<(String, u64)> = None;
        let output = if cli.save {
            let user = cli.user.as_deref().unwrap_or("default");
            let (output, doc_id) = enhance_and_store(&filename, bytes, user, &store, &config)
                .await
                .context("Enhancement failed")?;
            saved = Some((doc_id, store.document_count(user).unwrap_or(0)));
            output
        } else {
            enhance_bytes(&filename, bytes, &config)
                .await
                .context("Enhancement failed")?
        };

        if let Some(bar) = spinner {
            bar.finish_and_clear();
        }

        if let Some((doc_id, count)) = saved {
            if !cli.quiet {
                eprintln!(
                    "{} saved record {}  ({} document(s) for this user)",
                    green("✔"),
                    bold(&doc_id),
                    count,
                );
            }
        }

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(output.enhanced_text.as_bytes())
                .context("Failed to write to stdout")?;
            if !output.enhanced_text.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }

        if !cli.quiet && !cli.json {
            eprintln!(
                "   {} chars in  /  {} chars out  —  {} attempt(s), {}ms total",
                dim(&output.stats.input_chars.to_string()),
                dim(&output.stats.output_chars.to_string()),
                output.stats.attempts,
                output.stats.total_duration_ms,
            );
        }
    }

    Ok(())
}

/// Map CLI args to `EnhanceConfig`.
async fn build_config(cli: &Cli) -> Result<EnhanceConfig> {
    let system_prompt = if let Some(ref path) = cli.system_prompt {
        Some(
            tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read system prompt from {:?}", path))?,
        )
    } else {
        None
    };

    let mut builder = EnhanceConfig::builder()
        .base_url(cli.base_url.as_str())
        .model(cli.model.as_str())
        .max_retries(cli.max_retries)
        .initial_timeout_secs(cli.timeout)
        .autostart(!cli.no_autostart)
        .ocr_language(cli.ocr_lang.as_str())
        .strip_reasoning(!cli.keep_reasoning);

    if let Some(prompt) = system_prompt {
        builder = builder.system_prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}
