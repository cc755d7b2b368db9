//! Formatting and rendering of agent responses.

mod json;
mod normalize;
mod render;
mod utils;

pub use json::{format_number, format_value, json_to_html};
pub use normalize::format_agent_output;
pub use render::markdown_to_html;
pub use utils::{
    extract_sections, is_markdown_content, table_of_contents, truncate_markdown, Section, TocEntry,
};
