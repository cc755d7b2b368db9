//! Discovery of generated chart images referenced in agent responses.
//!
//! The backend writes plots to its image directory and mentions them by
//! filename in the response text. Filenames are found either bare
//! (`plot_IFRS Capital (central)_20240101_120000.png`) or as markdown
//! images, and are served from `<backend>/images/<filename>`.

use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{CimrError, CimrResult};

static BARE_PNG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9_.\- \t()]+\.png").expect("valid regex"));
static MARKDOWN_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]\n]*\]\(([^)\n]+\.png)\)").expect("valid regex"));
static TRUNCATED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\([^)]+\)_(\d{8}_\d{6})\.png$").expect("valid regex"));
static TIMESTAMP_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{8}_\d{6})\.png$").expect("valid regex"));

/// Plot name the backend uses when no better name can be recovered.
pub const FALLBACK_PLOT_NAME: &str = "plot_IFRS Capital (central)";

/// Image filenames mentioned in `text`, in order of appearance.
///
/// Bare filenames come first, then markdown image targets. Duplicates are
/// kept. A name that looks like the tail of a longer plot name
/// (`2024(central)_20240101_120000.png`) is replaced by the full name when
/// one with the same timestamp appears elsewhere in the text.
pub fn extract_image_filenames(text: &str) -> Vec<String> {
    let bare = BARE_PNG
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|name| name.len() > ".png".len());
    let embedded = MARKDOWN_IMAGE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim());

    bare.chain(embedded)
        .map(|name| repair_truncated(name, text))
        .collect()
}

fn repair_truncated(name: &str, text: &str) -> String {
    let Some(timestamp) = TRUNCATED_NAME
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return name.to_string();
    };

    let ts = regex::escape(timestamp);
    let candidates = [
        format!(r"(?i)plot_\S+\s+\S+\s+\S+\s+\([^)]+\)_{}\.png", ts),
        format!(r"(?i)plot_[^\n.]*?_{}\.png", ts),
    ];

    for pattern in &candidates {
        let found = Regex::new(pattern)
            .ok()
            .and_then(|re| re.find(text).map(|m| m.as_str().trim().to_string()));
        if let Some(full) = found {
            debug!("Recovered image filename '{}' from '{}'", full, name);
            return full;
        }
    }

    name.to_string()
}

/// Generic plot name for the same timestamp, used after a load failure.
pub fn fallback_image_filename(filename: &str) -> Option<String> {
    TIMESTAMP_SUFFIX
        .captures(filename)
        .and_then(|caps| caps.get(1))
        .map(|ts| format!("{}_{}.png", FALLBACK_PLOT_NAME, ts.as_str()))
}

/// URL under which the backend serves `filename`, percent-encoded.
pub fn image_url(base_url: &str, filename: &str) -> CimrResult<Url> {
    let invalid = |message: String| CimrError::InvalidUrl {
        url: base_url.to_string(),
        message,
    };

    let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("URL cannot be a base".to_string()))?
        .pop_if_empty()
        .push("images")
        .push(filename);
    Ok(url)
}
