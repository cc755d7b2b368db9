use regex::{Regex, RegexSet};
use serde::Serialize;
use std::sync::LazyLock;

static HEADER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})[ \t]+(.+)$").expect("valid regex"));
static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));
static MARKDOWN_MARKERS: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([
        r"(?m)^#{1,6}\s+",
        r"\*\*.*?\*\*",
        r"\*.*?\*",
        r"(?s)```.*?```",
        r"`[^`]+`",
        r"(?m)^\s*[*\-+]\s+",
        r"(?m)^\s*\d+\.\s+",
        r"(?m)^\s*>\s+",
        r"\[.*?\]\(.*?\)",
        r"(?m)^\s*\|.*\|",
        r"(?m)^---+$",
    ])
    .expect("valid regex set")
});

/// A header together with the text under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocEntry {
    pub level: usize,
    pub title: String,
    pub id: String,
}

fn parse_header(line: &str) -> Option<(usize, &str)> {
    HEADER_LINE.captures(line).and_then(|caps| {
        let level = caps.get(1)?.as_str().len();
        let title = caps.get(2)?.as_str();
        Some((level, title))
    })
}

fn clean_title(title: &str) -> String {
    title.replace("**", "").trim().to_string()
}

/// Splits content into sections keyed by header text.
///
/// Text before the first header is dropped, as are headers with nothing
/// under them. A repeated title replaces the earlier body but keeps its
/// position.
pub fn extract_sections(content: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current_title: Option<String> = None;
    let mut current_body: Vec<&str> = Vec::new();

    for line in content.lines() {
        match parse_header(line) {
            Some((_, title)) => {
                flush_section(&mut sections, current_title.take(), &current_body);
                current_title = Some(clean_title(title));
                current_body.clear();
            }
            None => current_body.push(line),
        }
    }
    flush_section(&mut sections, current_title, &current_body);

    sections
}

fn flush_section(sections: &mut Vec<Section>, title: Option<String>, body: &[&str]) {
    let Some(title) = title else { return };
    if body.is_empty() {
        return;
    }
    let body = body.join("\n").trim().to_string();
    match sections.iter_mut().find(|s| s.title == title) {
        Some(existing) => existing.body = body,
        None => sections.push(Section { title, body }),
    }
}

/// Headers in document order with URL-friendly anchors.
pub fn table_of_contents(content: &str) -> Vec<TocEntry> {
    content
        .lines()
        .filter_map(parse_header)
        .map(|(level, title)| {
            let title = clean_title(title);
            let id = anchor_id(&title);
            TocEntry { level, title, id }
        })
        .collect()
}

fn anchor_id(title: &str) -> String {
    NON_ALPHANUMERIC
        .replace_all(&title.to_lowercase(), "-")
        .trim_matches('-')
        .to_string()
}

/// True if the text carries any common markdown construct.
pub fn is_markdown_content(content: &str) -> bool {
    !content.is_empty() && MARKDOWN_MARKERS.is_match(content)
}

/// Shortens content to roughly `max_len` characters.
///
/// Prefers to cut after the last sentence, paragraph or subsection break
/// when that break lies in the final 30% of the allowed length.
pub fn truncate_markdown(content: &str, max_len: usize) -> String {
    let end = match content.char_indices().nth(max_len) {
        Some((idx, _)) => idx,
        None => return content.to_string(),
    };
    let truncated = &content[..end];

    let breakpoint = [
        truncated.rfind('.'),
        truncated.rfind("\n\n"),
        truncated.rfind("\n###"),
    ]
    .into_iter()
    .flatten()
    .max();

    match breakpoint {
        Some(at) if at * 10 > end * 7 => format!("{}\n\n...", &content[..=at]),
        _ => format!("{}...", truncated),
    }
}
