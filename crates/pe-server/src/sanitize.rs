//! Input sanitization and provider-reply cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

/// Prompts longer than this are rejected outright.
const MAX_PROMPT_CHARS: usize = 100_000;

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script\b.*?</script>").expect("hardcoded regex"));
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("hardcoded regex"));
static JS_SCHEME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)javascript:").expect("hardcoded regex"));
static EVENT_HANDLER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)on\w+\s*=").expect("hardcoded regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("hardcoded regex"));

/// Strip markup, script-like fragments and control bytes from user input,
/// then collapse whitespace.
pub fn sanitize_input(input: &str) -> String {
    let sanitized = SCRIPT_BLOCK.replace_all(input, "");
    let sanitized = HTML_TAG.replace_all(&sanitized, "");
    let sanitized = JS_SCHEME.replace_all(&sanitized, "");
    let sanitized = EVENT_HANDLER.replace_all(&sanitized, "");
    let sanitized = sanitized.replace('\0', "");
    WHITESPACE_RUN.replace_all(&sanitized, " ").trim().to_string()
}

/// Basic prompt validity: non-empty after trimming, bounded length, and at
/// least one alphanumeric character.
pub fn is_valid_prompt(prompt: &str) -> bool {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return false;
    }
    if trimmed.chars().count() > MAX_PROMPT_CHARS {
        return false;
    }
    trimmed.chars().any(|c| c.is_ascii_alphanumeric())
}

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("hardcoded regex"));
static ITALICS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*(.*?)\*").expect("hardcoded regex"));
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]+)`").expect("hardcoded regex"));
static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("hardcoded regex"));
static HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^#+\s+").expect("hardcoded regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("hardcoded regex"));
static DASH_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*[-*]\s*").expect("hardcoded regex"));
static NUMBERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*\d+\.\s*").expect("hardcoded regex"));
static HORIZONTAL_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[-*]{3,}$").expect("hardcoded regex"));
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^>\s*").expect("hardcoded regex"));
static NEWLINE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("hardcoded regex"));
static SPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]{2,}").expect("hardcoded regex"));

/// Flatten markdown formatting out of a provider reply while keeping its
/// line structure readable.
pub fn markdown_to_plain_text(text: &str) -> String {
    let text = CODE_BLOCK.replace_all(text, "");
    let text = BOLD.replace_all(&text, "$1");
    let text = ITALICS.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = HEADER.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = HORIZONTAL_RULE.replace_all(&text, "");
    let text = DASH_ITEM.replace_all(&text, "- ");
    let text = NUMBERED_ITEM.replace_all(&text, "");
    let text = BLOCKQUOTE.replace_all(&text, "");
    let text = NEWLINE_RUN.replace_all(&text, "\n\n");
    let text = SPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}
