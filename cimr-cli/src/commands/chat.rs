use anyhow::{bail, Context, Result};
use cimr_core::{
    format_agent_output, markdown_to_html, render_transcript_html, AgentRef, ChatSession,
    CimrConfig, CimrError, HttpBackend, QueryBackend, Registry, Route,
};
use clap::ValueEnum;
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::teams::{cmd_teams, print_team};
use crate::output::print_message;

/// Which agent a chat or question is addressed to.
#[derive(Debug, Clone, Default)]
pub struct ChatTarget {
    pub team: Option<String>,
    pub sub_team: Option<String>,
    pub agent: Option<String>,
}

impl ChatTarget {
    fn resolve(&self, registry: &Registry) -> Result<AgentRef> {
        let agent = match (&self.agent, &self.team) {
            (Some(agent_id), _) => registry.find_agent(agent_id)?,
            (None, Some(team_id)) => registry.first_agent_in(team_id, self.sub_team.as_deref())?,
            (None, None) => registry.first_agent().ok_or(CimrError::EmptyRegistry)?,
        };
        Ok(agent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AskFormat {
    Text,
    Markdown,
    Html,
    Json,
}

#[derive(Debug, PartialEq, Eq)]
enum ChatInput<'a> {
    Message(&'a str),
    Switch(&'a str),
    Agents,
    Save(Option<&'a str>),
    Help,
    Quit,
}

fn parse_input(line: &str) -> ChatInput<'_> {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix('/') else {
        return ChatInput::Message(line);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (command, None),
    };

    match (name, arg) {
        ("quit" | "exit" | "q", _) => ChatInput::Quit,
        ("agent", Some(id)) => ChatInput::Switch(id),
        ("agents" | "agent", None) => ChatInput::Agents,
        ("save", path) => ChatInput::Save(path),
        ("help" | "?", _) => ChatInput::Help,
        _ => ChatInput::Message(line),
    }
}

fn print_help() {
    println!("{}", "Commands".yellow().bold());
    println!("  /agent <id>   switch to another agent (clears the conversation)");
    println!("  /agents       list agents you can switch to");
    println!("  /save [path]  write the conversation as HTML");
    println!("  /quit         leave the chat");
    println!();
}

fn print_agents(session: &ChatSession) {
    let current = session.selected().id();
    for agent in session.registry().agents() {
        let marker = if agent.id() == current { "●" } else { " " };
        println!(
            "  {} {:<28} {}",
            marker.green(),
            agent.id(),
            agent.name().dimmed()
        );
    }
    println!();
}

async fn save_transcript(session: &ChatSession, config: &CimrConfig, path: &Path) -> Result<()> {
    let title = format!("Chat with {}", session.selected().name());
    let html = render_transcript_html(
        &title,
        session.messages(),
        config.backend_url(),
        &config.display.time_format,
    );
    tokio::fs::write(path, html)
        .await
        .with_context(|| format!("Failed to write transcript to {}", path.display()))?;
    println!("{} {}", "Transcript saved:".green(), path.display());
    Ok(())
}

pub async fn cmd_chat(
    config: &CimrConfig,
    target: &ChatTarget,
    transcript: Option<PathBuf>,
) -> Result<()> {
    let registry = Registry::builtin();
    let agent = target.resolve(&registry)?;
    run_chat(config, registry, agent, transcript).await
}

async fn run_chat(
    config: &CimrConfig,
    registry: Registry,
    agent: AgentRef,
    transcript: Option<PathBuf>,
) -> Result<()> {
    let backend = HttpBackend::from_config(&config.backend)?;
    let mut session = ChatSession::with_agent(registry, config.modules.clone(), agent);
    let backend_url = config.backend_url();
    let time_format = config.display.time_format.as_str();

    println!(
        "{} {} {}",
        "Chatting with".cyan().bold(),
        agent.name().cyan().bold(),
        format!("({} / {})", agent.team_id, agent.sub_team_id).dimmed()
    );
    println!("{}", "Type /help for commands, /quit to leave.".dimmed());
    println!();
    for message in session.messages() {
        print_message(message, backend_url, time_format);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{} ", ">".blue().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_input(&line) {
            ChatInput::Quit => break,
            ChatInput::Help => print_help(),
            ChatInput::Agents => print_agents(&session),
            ChatInput::Switch(agent_id) => match session.select_agent_by_id(agent_id) {
                Ok(()) => {
                    println!();
                    for message in session.messages() {
                        print_message(message, backend_url, time_format);
                    }
                }
                Err(e) => eprintln!("{} {}", "!".yellow(), e),
            },
            ChatInput::Save(path) => {
                let path = path
                    .map(PathBuf::from)
                    .or_else(|| transcript.clone())
                    .unwrap_or_else(|| PathBuf::from("cimr-transcript.html"));
                if let Err(e) = save_transcript(&session, config, &path).await {
                    eprintln!("{} {:#}", "!".yellow(), e);
                }
            }
            ChatInput::Message(text) => {
                let query = match session.begin(text) {
                    Ok(query) => query,
                    Err(CimrError::EmptyMessage) => continue,
                    Err(e) => {
                        eprintln!("{} {}", "!".yellow(), e);
                        continue;
                    }
                };

                if let Some(indicator) = session.pending_indicator() {
                    println!("{}", indicator.content.dimmed().italic());
                }

                let outcome = match session.build_request(&query) {
                    Ok(request) => backend.query(&request).await,
                    Err(e) => Err(e),
                };
                let reply = session.complete(outcome);
                println!();
                print_message(reply, backend_url, time_format);
            }
        }
    }

    if let Some(path) = transcript {
        save_transcript(&session, config, &path).await?;
    }

    debug!("Chat ended after {} messages", session.messages().len());
    Ok(())
}

pub async fn cmd_ask(
    config: &CimrConfig,
    target: &ChatTarget,
    message: &str,
    format: AskFormat,
) -> Result<()> {
    let registry = Registry::builtin();
    let agent = target.resolve(&registry)?;
    let backend = HttpBackend::from_config(&config.backend)?;
    let mut session = ChatSession::with_agent(registry, config.modules.clone(), agent);

    let reply = session.submit(&backend, message).await?;

    match format {
        AskFormat::Text => println!("{}", format_agent_output(&reply.content)),
        AskFormat::Markdown => println!("{}", reply.content),
        AskFormat::Html => println!(
            "{}",
            markdown_to_html(&format_agent_output(&reply.content))
        ),
        AskFormat::Json => println!("{}", serde_json::to_string_pretty(reply)?),
    }

    Ok(())
}

/// Opens an application path the way the web client navigates.
pub async fn cmd_open(config: &CimrConfig, path: &str, transcript: Option<PathBuf>) -> Result<()> {
    let registry = Registry::builtin();

    match Route::parse(path) {
        Route::Landing => cmd_teams("text"),
        Route::Team { team_id } => {
            print_team(registry.team(&team_id)?);
            Ok(())
        }
        route @ Route::Chat { .. } => {
            let agent = route.initial_agent(&registry)?;
            run_chat(config, registry, agent, transcript).await
        }
        Route::NotFound(path) => bail!("No page at '{}'", path),
    }
}
