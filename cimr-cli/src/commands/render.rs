use anyhow::{Context, Result};
use cimr_core::markdown::{
    extract_sections, format_agent_output, is_markdown_content, markdown_to_html,
    table_of_contents, truncate_markdown,
};
use cimr_core::{extract_image_filenames, fallback_image_filename, CimrConfig, HttpBackend};
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::Cell;
use std::path::PathBuf;
use tracing::warn;

use crate::config::default_output_dir;
use crate::output::new_table;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RenderOutput {
    /// Rendered HTML fragment
    Html,
    /// Normalized markdown
    Markdown,
    /// Header outline with anchors
    Toc,
    /// Sections as JSON
    Sections,
    /// Whether the input looks like markdown
    Detect,
}

async fn read_input(file: Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut buf)
                .await
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

pub async fn cmd_render(
    file: Option<PathBuf>,
    output: RenderOutput,
    raw: bool,
    truncate: Option<usize>,
) -> Result<()> {
    let mut content = read_input(file).await?;
    if let Some(max) = truncate {
        content = truncate_markdown(&content, max);
    }
    if !raw {
        content = format_agent_output(&content);
    }

    match output {
        RenderOutput::Html => println!("{}", markdown_to_html(&content)),
        RenderOutput::Markdown => println!("{}", content),
        RenderOutput::Toc => {
            for entry in table_of_contents(&content) {
                let indent = "  ".repeat(entry.level.saturating_sub(1));
                println!("{}- {} {}", indent, entry.title, format!("#{}", entry.id).dimmed());
            }
        }
        RenderOutput::Sections => {
            println!("{}", serde_json::to_string_pretty(&extract_sections(&content))?)
        }
        RenderOutput::Detect => {
            if is_markdown_content(&content) {
                println!("markdown");
            } else {
                println!("plain");
            }
        }
    }

    Ok(())
}

pub async fn cmd_images(
    config: &CimrConfig,
    file: Option<PathBuf>,
    download: Option<Option<PathBuf>>,
) -> Result<()> {
    let content = read_input(file).await?;
    let filenames = extract_image_filenames(&content);

    if filenames.is_empty() {
        println!("{}", "No images referenced.".yellow());
        return Ok(());
    }

    let backend = HttpBackend::from_config(&config.backend)?;

    let Some(dir) = download else {
        let mut table = new_table(&["#", "Filename", "URL"]);
        for (i, filename) in filenames.iter().enumerate() {
            let url = backend
                .image_url(filename)
                .map(|u| u.to_string())
                .unwrap_or_default();
            table.add_row(vec![Cell::new(i + 1), Cell::new(filename), Cell::new(url)]);
        }
        println!("{}", table);
        return Ok(());
    };

    let dir = dir.unwrap_or_else(default_output_dir);
    let mut failures = 0;
    for filename in &filenames {
        match backend.download_image(filename, &dir).await {
            Ok(path) => println!("  {} {}", "✓".green(), path.display()),
            Err(e) => {
                let retry = fallback_image_filename(filename).filter(|f| f != filename);
                let recovered = match retry {
                    Some(fallback) => {
                        warn!("Retrying {} as {}", filename, fallback);
                        backend.download_image(&fallback, &dir).await.ok()
                    }
                    None => None,
                };
                match recovered {
                    Some(path) => println!("  {} {}", "✓".green(), path.display()),
                    None => {
                        failures += 1;
                        println!("  {} {} ({})", "✗".red(), filename, e);
                    }
                }
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} images could not be downloaded", failures, filenames.len());
    }
    Ok(())
}
