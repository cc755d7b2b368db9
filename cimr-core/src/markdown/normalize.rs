use regex::Regex;
use std::sync::LazyLock;

static EXCESS_NEWLINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static HEADER_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\n|^)(#{1,6}\s+)").expect("valid regex"));
static HEADER_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(#{1,6}[^\n]+)\n([^#\n])").expect("valid regex"));
static FENCE_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(\n|^)(```.*?```)").expect("valid regex"));
static FENCE_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(```.*?```)\n([^`\n])").expect("valid regex"));
static BULLET_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\n|^)([*\-+]\s+)").expect("valid regex"));
static ORDERED_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\n|^)(\d+\.\s+)").expect("valid regex"));
static RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\n|^)(-{3,})(\n|$)").expect("valid regex"));

/// Cleans up spacing in agent output before it is rendered.
///
/// Headers, fenced code blocks and horizontal rules end up separated from
/// their neighbours by exactly one blank line, list markers start their own
/// line, and no run of blank lines is longer than one.
pub fn format_agent_output(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let formatted = EXCESS_NEWLINES.replace_all(content, "\n\n");

    let formatted = HEADER_START.replace_all(&formatted, "\n\n${2}");
    let formatted = HEADER_BODY.replace_all(&formatted, "${1}\n\n${2}");

    let formatted = FENCE_START.replace_all(&formatted, "\n\n${2}");
    let formatted = FENCE_END.replace_all(&formatted, "${1}\n\n${2}");

    let formatted = BULLET_START.replace_all(&formatted, "\n${2}");
    let formatted = ORDERED_START.replace_all(&formatted, "\n${2}");

    let formatted = RULE.replace_all(&formatted, "\n\n---\n\n");

    // the spacing rules above can stack newlines again
    let formatted = EXCESS_NEWLINES.replace_all(&formatted, "\n\n");

    formatted.trim().to_string()
}
