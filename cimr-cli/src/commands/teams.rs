use anyhow::Result;
use cimr_core::{Registry, Team};
use colored::Colorize;
use comfy_table::Cell;
use serde_json::json;

use crate::output::{new_table, truncate};

pub fn cmd_teams(format: &str) -> Result<()> {
    let registry = Registry::builtin();
    let teams = registry.teams();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(teams)?);
        return Ok(());
    }

    println!("{}", "Consulting Teams".cyan().bold());
    println!("{}", "═".repeat(60).dimmed());
    println!();

    let mut table = new_table(&["ID", "Name", "Sub-teams", "Agents", "Description"]);
    for team in teams {
        table.add_row(vec![
            Cell::new(team.id),
            Cell::new(team.name),
            Cell::new(team.sub_teams.len()),
            Cell::new(team.agent_count()),
            Cell::new(truncate(team.description, 60)),
        ]);
    }

    println!("{}", table);
    println!();
    println!("  Total: {} teams", teams.len());
    println!(
        "  Run {} to see a team's analysts.",
        "cimr team <id>".cyan().bold()
    );

    Ok(())
}

pub fn cmd_team(team_id: &str, format: &str) -> Result<()> {
    let team = Registry::builtin().team(team_id)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(team)?);
        return Ok(());
    }

    print_team(team);
    Ok(())
}

pub(crate) fn print_team(team: &Team) {
    println!("{}", team.name.cyan().bold());
    println!("{}", team.description.dimmed());
    println!("{}", "═".repeat(60).dimmed());

    for sub_team in team.sub_teams {
        println!();
        println!(
            "  {} {}",
            sub_team.name.yellow().bold(),
            format!("({})", sub_team.mode).dimmed()
        );
        println!("  {}", sub_team.description);

        let mut table = new_table(&["Agent ID", "Name", "Specialties"]);
        for agent in sub_team.agents {
            let specialties: Vec<&str> = agent.outputs.iter().take(3).copied().collect();
            table.add_row(vec![
                Cell::new(agent.id),
                Cell::new(agent.name),
                Cell::new(specialties.join(", ")),
            ]);
        }
        println!("{}", table);
        println!(
            "  Chat: {}",
            format!("cimr open /team/{}/subteam/{}/chat", team.id, sub_team.id).cyan()
        );
    }
}

pub fn cmd_agents(team: Option<&str>, format: &str) -> Result<()> {
    let registry = Registry::builtin();
    if let Some(team_id) = team {
        registry.team(team_id)?;
    }

    let agents: Vec<_> = registry
        .agents()
        .filter(|a| team.map_or(true, |t| a.team_id == t))
        .collect();

    if format == "json" {
        let output: Vec<_> = agents
            .iter()
            .map(|a| {
                json!({
                    "id": a.id(),
                    "name": a.name(),
                    "team": a.team_id,
                    "sub_team": a.sub_team_id,
                    "description": a.agent.description,
                    "outputs": a.agent.outputs,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Agents".cyan().bold());
    println!("{}", "═".repeat(60).dimmed());
    println!();

    let mut table = new_table(&["ID", "Name", "Team", "Sub-team"]);
    for agent in &agents {
        table.add_row(vec![
            Cell::new(agent.id()),
            Cell::new(agent.name()),
            Cell::new(agent.team_id),
            Cell::new(agent.sub_team_id),
        ]);
    }

    println!("{}", table);
    println!();
    println!("  Total: {} agents", agents.len());

    Ok(())
}
