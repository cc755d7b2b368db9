use chrono::Local;
use cimr_core::{format_agent_output, image_url, Message, Sender};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};

/// Table with the CLI's standard look and a cyan header.
pub fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(comfy_table::Color::Cyan))
                .collect::<Vec<_>>(),
        );
    table
}

pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", cut.trim_end())
}

/// Prints one transcript entry for the terminal.
pub fn print_message(message: &Message, backend_url: &str, time_format: &str) {
    let time = message.timestamp.with_timezone(&Local).format(time_format);

    match message.sender {
        Sender::User => {
            println!("{} {}", format!("[{}]", time).dimmed(), "You".blue().bold());
            println!("{}", message.content);
        }
        Sender::Agent => {
            let name = message.agent_name.as_deref().unwrap_or("Agent");
            println!("{} {}", format!("[{}]", time).dimmed(), name.green().bold());
            if message.is_loading {
                println!("{}", message.content.dimmed().italic());
            } else {
                println!("{}", format_agent_output(&message.content));
            }
        }
    }

    for filename in message.images.iter().flatten() {
        match image_url(backend_url, filename) {
            Ok(url) => println!("  {} {}", "Image:".yellow(), url),
            Err(_) => println!("  {} {}", "Image:".yellow(), filename),
        }
    }
    println!();
}
