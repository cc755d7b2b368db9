//! Standalone HTML export of a chat transcript.

use chrono::Local;

use crate::images::image_url;
use crate::markdown::{format_agent_output, markdown_to_html};
use crate::models::{Message, Sender};

const PAGE_STYLE: &str = "body{font-family:sans-serif;background:#111827;color:#f9fafb;\
max-width:56rem;margin:2rem auto;padding:0 1rem}\
.message{border-radius:0.75rem;padding:1rem;margin:1rem 0}\
.user{background:#2563eb;margin-left:20%}\
.agent{background:#1f2937;margin-right:10%}\
.sender{font-weight:600;font-size:0.875rem;margin:0 0 0.5rem}\
.time{font-size:0.75rem;opacity:0.7;margin-top:0.5rem}\
img{max-width:100%;border-radius:0.5rem}\
.caption{font-size:0.75rem;opacity:0.7}";

/// Renders `messages` as a complete HTML page.
///
/// Agent messages are normalized and rendered from markdown; images are
/// linked from the backend at `backend_url`. Timestamps use `time_format`
/// in local time.
pub fn render_transcript_html(
    title: &str,
    messages: &[Message],
    backend_url: &str,
    time_format: &str,
) -> String {
    let mut html = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    html.push_str(&format!("<style>{}</style>\n", PAGE_STYLE));
    html.push_str("</head>\n<body>\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));

    for message in messages.iter().filter(|m| !m.is_loading) {
        html.push_str(&render_message(message, backend_url, time_format));
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_message(message: &Message, backend_url: &str, time_format: &str) -> String {
    let (class, sender) = match message.sender {
        Sender::User => ("user", "You".to_string()),
        Sender::Agent => (
            "agent",
            message
                .agent_name
                .clone()
                .unwrap_or_else(|| "Agent".to_string()),
        ),
    };

    let body = match message.sender {
        Sender::User => markdown_to_html(&escape_html(&message.content)),
        Sender::Agent => markdown_to_html(&format_agent_output(&message.content)),
    };

    let mut html = format!("<div class=\"message {}\">\n", class);
    html.push_str(&format!("<p class=\"sender\">{}</p>\n", escape_html(&sender)));
    html.push_str(&format!("<div class=\"content\">{}</div>\n", body));

    for (i, filename) in message.images.iter().flatten().enumerate() {
        html.push_str("<figure>\n");
        if let Ok(url) = image_url(backend_url, filename) {
            html.push_str(&format!(
                "<img src=\"{}\" alt=\"Generated visualization {}\">\n",
                url,
                i + 1
            ));
        }
        html.push_str(&format!(
            "<figcaption class=\"caption\">{}</figcaption>\n</figure>\n",
            escape_html(filename)
        ));
    }

    let time = message.timestamp.with_timezone(&Local).format(time_format);
    html.push_str(&format!("<p class=\"time\">{}</p>\n</div>\n", time));
    html
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
