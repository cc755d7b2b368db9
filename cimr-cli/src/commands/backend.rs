use anyhow::{Context, Result};
use cimr_core::{CimrConfig, HttpBackend, QueryBackend, QueryRequest, Registry};
use colored::Colorize;

use crate::output::truncate;

const SAMPLE_QUERY: &str = "Hello, can you help me?";

pub async fn cmd_check(config: &CimrConfig, skip_query: bool) -> Result<()> {
    let backend = HttpBackend::from_config(&config.backend)?;

    println!("{}", "Backend Check".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!("  {:<10} {}", "URL:".bold(), backend.base_url());

    let health = backend.health().await?;
    let status = if health.status.eq_ignore_ascii_case("healthy") {
        health.status.green()
    } else {
        health.status.yellow()
    };
    println!("  {:<10} {}", "Status:".bold(), status);
    if let Some(message) = &health.message {
        println!("  {:<10} {}", "Message:".bold(), message.dimmed());
    }

    let modules = backend.modules().await?;
    println!();
    println!("  {}", "Modules".yellow().bold());
    for (module, agents) in &modules.modules {
        println!("    {} {}", module, format!("({})", agents.join(", ")).dimmed());
    }

    println!();
    println!("  {}", "Team mapping".yellow().bold());
    for team in Registry::builtin().teams() {
        match config.modules.module_for(team.id) {
            Some(module) if modules.modules.contains_key(module) => {
                println!("    {} {} -> {}", "✓".green(), team.id, module)
            }
            Some(module) => println!(
                "    {} {} -> {} {}",
                "!".yellow(),
                team.id,
                module,
                "(not served by backend)".dimmed()
            ),
            None => println!("    {} {} {}", "✗".red(), team.id, "(no module mapped)".dimmed()),
        }
    }

    if skip_query {
        return Ok(());
    }

    let agent = Registry::builtin()
        .first_agent()
        .context("No agents to send a sample query to")?;
    let module = config
        .modules
        .module_for(agent.team_id)
        .with_context(|| format!("No backend module mapped for team '{}'", agent.team_id))?;
    let request = QueryRequest::new(SAMPLE_QUERY, module, agent.id());

    println!();
    println!("  {} {}", "Sample query".yellow().bold(), format!("({})", agent.id()).dimmed());
    let reply = backend.query(&request).await?;
    println!("    {} {}", "✓".green(), truncate(&reply.replace('\n', " "), 120));

    Ok(())
}
