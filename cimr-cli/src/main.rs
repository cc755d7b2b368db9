use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cimr_core::config::LoggingConfig;

mod commands;
mod config;
mod output;

use commands::{
    cmd_agents, cmd_ask, cmd_chat, cmd_check, cmd_images, cmd_open, cmd_render, cmd_team,
    cmd_teams, AskFormat, ChatTarget, RenderOutput,
};
use config::load_config;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "cimr")]
#[command(author = "CIMR-OS Team")]
#[command(version = VERSION)]
#[command(about = "CIMR Consult - chat with AI consulting teams")]
#[command(long_about = r#"
CIMR Consult talks to a CIMR-OS backend hosting teams of AI analysts.
Browse the teams with 'cimr teams', pick a sub-team with 'cimr team <id>',
then start a conversation with 'cimr chat --team <id> --subteam <id>'.

The backend defaults to http://localhost:8000 and can be changed with
--backend, CIMR_BACKEND_URL or a cimr.toml file.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, global = true, help = "Backend base URL (overrides configuration)")]
    backend: Option<String>,

    #[arg(long, global = true, help = "Disable colored output")]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "List consulting teams")]
    Teams {
        #[arg(short, long, default_value = "text", help = "Output format (text, json)")]
        format: String,
    },

    #[command(about = "Show a team with its sub-teams and agents")]
    Team {
        #[arg(help = "Team id (e.g. company_valuation)")]
        team_id: String,

        #[arg(short, long, default_value = "text", help = "Output format (text, json)")]
        format: String,
    },

    #[command(about = "List every agent")]
    Agents {
        #[arg(short, long, help = "Only agents of this team")]
        team: Option<String>,

        #[arg(short, long, default_value = "text", help = "Output format (text, json)")]
        format: String,
    },

    #[command(about = "Start an interactive chat")]
    Chat {
        #[arg(short, long, help = "Team to chat with")]
        team: Option<String>,

        #[arg(short, long, requires = "team", help = "Sub-team within the team")]
        subteam: Option<String>,

        #[arg(short, long, conflicts_with_all = ["team", "subteam"], help = "Agent id to start with")]
        agent: Option<String>,

        #[arg(long, help = "Write the conversation as HTML when the chat ends")]
        transcript: Option<PathBuf>,
    },

    #[command(about = "Ask a single question and print the answer")]
    Ask {
        #[arg(help = "Question to send")]
        message: String,

        #[arg(short, long, help = "Team to ask")]
        team: Option<String>,

        #[arg(short, long, requires = "team", help = "Sub-team within the team")]
        subteam: Option<String>,

        #[arg(short, long, conflicts_with_all = ["team", "subteam"], help = "Agent id to ask")]
        agent: Option<String>,

        #[arg(short, long, value_enum, default_value = "text", help = "Output format")]
        format: AskFormat,
    },

    #[command(about = "Open a page path such as /team/<id>/subteam/<id>/chat")]
    Open {
        #[arg(help = "Path to open")]
        path: String,

        #[arg(long, help = "Write the conversation as HTML when the chat ends")]
        transcript: Option<PathBuf>,
    },

    #[command(about = "Format and render agent markdown from a file or stdin")]
    Render {
        #[arg(help = "Input file (reads stdin when omitted)")]
        file: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value = "html", help = "What to print")]
        output: RenderOutput,

        #[arg(long, help = "Skip spacing normalization before rendering")]
        raw: bool,

        #[arg(long, help = "Truncate the content to this many characters first")]
        truncate: Option<usize>,
    },

    #[command(about = "List chart images referenced by a response")]
    Images {
        #[arg(help = "Response file (reads stdin when omitted)")]
        file: Option<PathBuf>,

        #[arg(
            short,
            long,
            value_name = "DIR",
            help = "Download the images (into ./cimr-output unless DIR is given)"
        )]
        download: Option<Option<PathBuf>>,
    },

    #[command(about = "Check backend health, available modules and a sample query")]
    Check {
        #[arg(long, help = "Skip the sample query")]
        skip_query: bool,
    },

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(cli.backend.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    if cli.no_color || !config.display.color {
        colored::control::set_override(false);
    }
    init_logging(cli.verbose, &config.logging);

    match run(cli.command, config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, logging: &LoggingConfig) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json_format {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

async fn run(command: Commands, config: cimr_core::CimrConfig) -> anyhow::Result<()> {
    match command {
        Commands::Teams { format } => cmd_teams(&format),
        Commands::Team { team_id, format } => cmd_team(&team_id, &format),
        Commands::Agents { team, format } => cmd_agents(team.as_deref(), &format),
        Commands::Chat {
            team,
            subteam,
            agent,
            transcript,
        } => {
            let target = ChatTarget {
                team,
                sub_team: subteam,
                agent,
            };
            cmd_chat(&config, &target, transcript).await
        }
        Commands::Ask {
            message,
            team,
            subteam,
            agent,
            format,
        } => {
            let target = ChatTarget {
                team,
                sub_team: subteam,
                agent,
            };
            cmd_ask(&config, &target, &message, format).await
        }
        Commands::Open { path, transcript } => cmd_open(&config, &path, transcript).await,
        Commands::Render {
            file,
            output,
            raw,
            truncate,
        } => cmd_render(file, output, raw, truncate).await,
        Commands::Images { file, download } => cmd_images(&config, file, download).await,
        Commands::Check { skip_query } => cmd_check(&config, skip_query).await,
        Commands::Version { detailed } => cmd_version(detailed),
    }
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "CIMR Consult Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!();
        println!("  {}", "Teams:".bold());
        for team in cimr_core::Registry::builtin().teams() {
            println!("    {} {}", "◆".cyan(), team.name);
        }
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("cimr {}", VERSION);
    }

    Ok(())
}
