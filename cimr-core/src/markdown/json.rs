//! HTML rendering of JSON values embedded in agent responses.

use regex::Regex;
use serde_json::{Map, Number, Value};
use std::sync::LazyLock;

static DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("valid regex"));

const TABLE_CLASS: &str = "min-w-full border-collapse border border-gray-600 text-sm";
const HEADER_CELL_CLASS: &str =
    "border border-gray-400 px-3 py-2 bg-gray-700 text-white font-semibold text-left";
const CELL_CLASS: &str = "border border-gray-400 px-3 py-2 text-white";
const KEY_CELL_CLASS: &str = "border border-gray-400 px-3 py-2 bg-gray-700 text-white font-semibold";
const CAPTION_CLASS: &str = "text-lg font-semibold mb-3 text-white";

/// Renders a parsed JSON value as an HTML fragment.
///
/// Arrays of objects become a record table whose columns come from the
/// first element, other arrays become a bullet list, objects become a
/// two-column key/value table and anything else is shown as a single value.
pub fn json_to_html(value: &Value) -> String {
    match value {
        Value::Array(items) => match items.first() {
            Some(Value::Object(first)) => records_table(items, first),
            _ => primitive_list(items),
        },
        Value::Object(map) => details_table(map),
        other => format!(
            "<div class=\"my-4 p-3 bg-gray-800 rounded border text-white\"><strong>Value:</strong> {}</div>",
            format_value(other)
        ),
    }
}

fn records_table(items: &[Value], first: &Map<String, Value>) -> String {
    let keys: Vec<&String> = first.keys().collect();

    let mut html = String::from("<div class=\"overflow-x-auto my-4\">");
    html.push_str(&format!(
        "<h4 class=\"{}\">Data Records ({} items)</h4>",
        CAPTION_CLASS,
        items.len()
    ));
    html.push_str(&format!("<table class=\"{}\"><thead><tr>", TABLE_CLASS));
    for key in &keys {
        html.push_str(&format!(
            "<th class=\"{}\">{}</th>",
            HEADER_CELL_CLASS,
            humanize_key(key)
        ));
    }
    html.push_str("</tr></thead><tbody>");

    for item in items {
        html.push_str("<tr>");
        for key in &keys {
            let cell = item
                .get(key.as_str())
                .map(format_value)
                .unwrap_or_else(|| "<em class=\"text-gray-400\">undefined</em>".to_string());
            html.push_str(&format!("<td class=\"{}\">{}</td>", CELL_CLASS, cell));
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table></div>");
    html
}

fn primitive_list(items: &[Value]) -> String {
    let mut html = String::from("<div class=\"my-4\">");
    html.push_str(&format!(
        "<h4 class=\"{}\">List ({} items)</h4>",
        CAPTION_CLASS,
        items.len()
    ));
    html.push_str("<ul class=\"list-disc ml-6 space-y-1\">");
    for item in items {
        html.push_str(&format!(
            "<li class=\"text-white\">{}</li>",
            format_value(item)
        ));
    }
    html.push_str("</ul></div>");
    html
}

fn details_table(map: &Map<String, Value>) -> String {
    let mut html = String::from("<div class=\"overflow-x-auto my-4\">");
    html.push_str(&format!("<h4 class=\"{}\">Data Details</h4>", CAPTION_CLASS));
    html.push_str(&format!("<table class=\"{}\"><tbody>", TABLE_CLASS));
    for (key, value) in map {
        html.push_str(&format!(
            "<tr><td class=\"{}\">{}</td><td class=\"{}\">{}</td></tr>",
            KEY_CELL_CLASS,
            humanize_key(key),
            CELL_CLASS,
            format_value(value)
        ));
    }
    html.push_str("</tbody></table></div>");
    html
}

fn humanize_key(key: &str) -> String {
    key.replace('_', " ")
}

/// Formats one JSON value for display inside a table cell.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "<em class=\"text-gray-400\">null</em>".to_string(),
        Value::Bool(b) => format!("<span class=\"text-blue-400\">{}</span>", b),
        Value::Number(n) => format!("<span class=\"text-green-400\">{}</span>", format_number(n)),
        Value::String(s) if DATE_PREFIX.is_match(s) => {
            format!("<span class=\"text-yellow-400\">{}</span>", s)
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => format!(
            "<em class=\"text-gray-400\">Array ({} items)</em>",
            items.len()
        ),
        Value::Object(map) => format!(
            "<em class=\"text-gray-400\">Object ({} properties)</em>",
            map.len()
        ),
    }
}

/// Thousands-grouped number with at most three decimals.
pub fn format_number(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        let grouped = group_thousands(&i.unsigned_abs().to_string());
        return if i < 0 {
            format!("-{}", grouped)
        } else {
            grouped
        };
    }
    if let Some(u) = n.as_u64() {
        return group_thousands(&u.to_string());
    }

    let f = n.as_f64().unwrap_or_default();
    if !f.is_finite() {
        return f.to_string();
    }

    let rounded = format!("{:.3}", f.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = group_thousands(int_part);
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    if f < 0.0 && out != "0" {
        out.insert(0, '-');
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
