//! Markdown to HTML conversion for agent responses.
//!
//! Handles the subset agents actually produce: headings, bold, inline code,
//! fenced code (JSON fences become tables), dash lists, horizontal rules and
//! pipe tables. Everything else passes through as paragraph text.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::json::json_to_html;

static H3: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^###[ \t]?(.+)$").expect("valid regex"));
static H2: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^##[ \t]?(.+)$").expect("valid regex"));
static H1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]?(.+)$").expect("valid regex"));
static NUMBERED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\.[ \t]?(.+)$").expect("valid regex"));
static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
static INLINE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("valid regex"));
static JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```json\n(.*?)```").expect("valid regex"));
// A language tag only counts when the fence line ends right after it.
static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:([A-Za-z0-9_+\-]+)[ \t]*\n|\n?)(.*?)```").expect("valid regex")
});
static PREFORMATTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<pre\b.*?</pre>").expect("valid regex"));
static TABLE_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|[\s\-:|]*-[\s\-:|]*\|$").expect("valid regex"));
static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<(h[1-6]|ul|ol|li|pre|table|thead|tbody|tr|hr|div|p|blockquote)\b")
        .expect("valid regex")
});

const PRE_CLASS: &str = "bg-gray-800 text-white p-4 rounded-lg overflow-x-auto my-4";
const TABLE_CLASS: &str = "table-auto border-collapse border border-gray-400 my-4 w-full";
const TABLE_CELL_CLASS: &str = "border border-gray-400 px-2 py-1";

/// Converts an agent response to an HTML fragment.
pub fn markdown_to_html(markdown: &str) -> String {
    if markdown.is_empty() {
        return String::new();
    }

    let html = markdown.replace("\\n", "\n");
    let html = render_headings(&html);
    let html = BOLD.replace_all(&html, "<strong>${1}</strong>").into_owned();
    let html = render_inline_code(&html);
    let html = render_fences(&html);

    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for block in PREFORMATTED.find_iter(&html) {
        out.push_str(&render_prose(&html[last..block.start()]));
        out.push_str(block.as_str());
        last = block.end();
    }
    out.push_str(&render_prose(&html[last..]));
    out
}

fn render_headings(text: &str) -> String {
    let text = H3.replace_all(text, "<h3>${1}</h3>");
    let text = H2.replace_all(&text, "<h2>${1}</h2>");
    let text = H1.replace_all(&text, "<h1>${1}</h1>");
    NUMBERED_HEADING
        .replace_all(&text, "<h3>${1}</h3>")
        .into_owned()
}

/// Single-line backtick spans. Spans touching another backtick belong to a
/// fence and are left alone.
fn render_inline_code(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in INLINE_CODE.captures_iter(text) {
        let (Some(whole), Some(code)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if text[..whole.start()].ends_with('`') || text[whole.end()..].starts_with('`') {
            continue;
        }
        out.push_str(&text[last..whole.start()]);
        out.push_str("<code>");
        out.push_str(code.as_str());
        out.push_str("</code>");
        last = whole.end();
    }
    out.push_str(&text[last..]);
    out
}

fn render_fences(text: &str) -> String {
    let text = JSON_FENCE.replace_all(text, |caps: &Captures| {
        let cleaned = caps[1].replace("\\\"", "\"");
        match serde_json::from_str::<serde_json::Value>(cleaned.trim()) {
            Ok(value) => json_to_html(&value),
            Err(e) => {
                tracing::debug!("JSON fence did not parse, showing raw: {}", e);
                format!(
                    "<pre class=\"{}\"><code class=\"language-json text-sm text-white\">{}</code></pre>",
                    PRE_CLASS, cleaned
                )
            }
        }
    });

    CODE_FENCE
        .replace_all(&text, |caps: &Captures| {
            let code_class = match caps.get(1) {
                Some(language) => {
                    format!("language-{} text-sm text-white", language.as_str())
                }
                None => "text-sm text-white".to_string(),
            };
            let code = caps[2].replace("\\\"", "\"");
            format!(
                "<pre class=\"{}\"><code class=\"{}\">{}</code></pre>",
                PRE_CLASS, code_class, code
            )
        })
        .into_owned()
}

fn render_prose(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let lines = render_lists(text.split('\n'));
    let lines = render_tables(&lines);
    lines
        .into_iter()
        .map(|line| {
            if line == "---" {
                "<hr />".to_string()
            } else {
                wrap_paragraph(line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Groups each run of `- item` lines into one `<ul>` line.
fn render_lists<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out = Vec::new();
    let mut items: Vec<String> = Vec::new();

    for line in lines {
        match line.strip_prefix("- ").filter(|item| !item.is_empty()) {
            Some(item) => items.push(format!("<li>{}</li>", item)),
            None => {
                flush_list(&mut items, &mut out);
                out.push(line.to_string());
            }
        }
    }
    flush_list(&mut items, &mut out);
    out
}

fn flush_list(items: &mut Vec<String>, out: &mut Vec<String>) {
    if !items.is_empty() {
        out.push(format!("<ul>{}</ul>", items.join("")));
        items.clear();
    }
}

fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

/// Replaces header, separator and body rows of each pipe table with one
/// `<table>` line.
fn render_tables(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let header = &lines[i];
        let has_separator = lines
            .get(i + 1)
            .is_some_and(|next| TABLE_SEPARATOR.is_match(next.trim()));

        if !(is_table_row(header) && header.trim().len() > 1 && has_separator) {
            out.push(header.clone());
            i += 1;
            continue;
        }

        let mut body_end = i + 2;
        while body_end < lines.len() && is_table_row(&lines[body_end]) {
            body_end += 1;
        }

        out.push(table_html(header, &lines[i + 2..body_end]));
        i = body_end;
    }
    out
}

fn split_cells(row: &str) -> Vec<&str> {
    let mut cells: Vec<&str> = row.trim().split('|').map(str::trim).collect();
    if cells.first().is_some_and(|c| c.is_empty()) {
        cells.remove(0);
    }
    if cells.last().is_some_and(|c| c.is_empty()) {
        cells.pop();
    }
    cells
}

fn table_html(header: &str, rows: &[String]) -> String {
    let mut html = format!("<table class=\"{}\"><thead><tr>", TABLE_CLASS);
    for cell in split_cells(header) {
        html.push_str(&format!("<th class=\"{}\">{}</th>", TABLE_CELL_CLASS, cell));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in split_cells(row) {
            html.push_str(&format!("<td class=\"{}\">{}</td>", TABLE_CELL_CLASS, cell));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn wrap_paragraph(line: String) -> String {
    let trimmed = line.trim();
    if trimmed.is_empty() || BLOCK_TAG.is_match(trimmed) {
        line
    } else {
        format!("<p>{}</p>", trimmed)
    }
}
