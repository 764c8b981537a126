//! Post-processing: deterministic cleanup of model output.
//!
//! Local chat models decorate their answers in ways the prompt asks them not
//! to: reasoning models lead with a `<think>…</think>` block, some wrap the
//! whole reply in quotation fences, and line endings come back CRLF on some
//! runtimes. These are cheap, pure string rules applied in a fixed order —
//! normalise endings before trimming, strip the reasoning block before
//! collapsing blank lines so the gap it leaves is folded away too.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to raw model output.
///
/// Rules (applied in order):
/// 1. Strip `<think>…</think>` reasoning blocks (when `strip_reasoning`)
/// 2. Normalise line endings (CRLF → LF)
/// 3. Trim trailing whitespace per line
/// 4. Collapse 3+ consecutive blank lines down to 2
/// 5. Trim leading/trailing blank lines
pub fn clean_model_output(input: &str, strip_reasoning: bool) -> String {
    let s = if strip_reasoning {
        strip_think_blocks(input)
    } else {
        input.to_string()
    };
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim_matches('\n').to_string()
}

static THINK_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<think>.*?</think>\s*").expect("valid regex"));

/// Remove `<think>…</think>` blocks emitted by reasoning models.
///
/// An unterminated block (model cut off mid-thought) is removed to the end
/// of the output — reasoning text must never be presented as the document.
fn strip_think_blocks(input: &str) -> String {
    let s = THINK_BLOCK.replace_all(input, "");
    match s.find("<think>") {
        Some(idx) => s[..idx].to_string(),
        None => s.into_owned(),
    }
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

static EXCESS_BLANKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{4,}").expect("valid regex"));

fn collapse_blank_lines(input: &str) -> String {
    EXCESS_BLANKS.replace_all(input, "\n\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_reasoning_block() {
        let raw = "<think>\nThe user wants edits.\n</think>\nPolished text.";
        assert_eq!(clean_model_output(raw, true), "Polished text.");
    }

    #[test]
    fn keeps_reasoning_when_disabled() {
        let raw = "<think>x</think>\nBody";
        assert!(clean_model_output(raw, false).contains("<think>"));
    }

    #[test]
    fn drops_unterminated_reasoning() {
        let raw = "Good part.\n<think>never closed";
        assert_eq!(clean_model_output(raw, true), "Good part.");
    }

    #[test]
    fn normalises_crlf_and_trailing_spaces() {
        let raw = "line one  \r\nline two\t\r\n";
        assert_eq!(clean_model_output(raw, true), "line one\nline two");
    }

    #[test]
    fn collapses_excess_blank_lines() {
        let raw = "a\n\n\n\n\n\nb";
        assert_eq!(clean_model_output(raw, true), "a\n\n\nb");
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(clean_model_output("", true), "");
    }
}
