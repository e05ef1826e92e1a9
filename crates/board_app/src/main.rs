mod commands;
mod config;
mod logging;
mod render;

use std::path::PathBuf;

use board_core::{TaskKind, TaskStatus};
use board_logging::{board_info, board_warn};
use clap::{Parser, Subcommand};

use crate::config::{AppConfig, DEFAULT_CONFIG_FILENAME};

#[derive(Parser)]
#[command(name = "board_app")]
#[command(about = "Architectural project status board")]
struct Cli {
    /// Configuration file (RON).
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the store and show the rotating board until Ctrl-C.
    Watch,
    /// Print every project once.
    List,
    /// Create a project; every selected task starts pending.
    Create {
        name: String,
        /// Task key: layout, mddaMap, structureDwg, architectureDwg, ext3D.
        #[arg(long = "task", value_parser = parse_task_kind)]
        tasks: Vec<TaskKind>,
        /// Adds an `other` task with this label.
        #[arg(long)]
        other: Option<String>,
    },
    Delete {
        id: String,
    },
    /// Set one task's status: pending, in-progress or completed.
    SetStatus {
        id: String,
        task: String,
        status: TaskStatus,
    },
}

fn parse_task_kind(key: &str) -> Result<TaskKind, String> {
    if key == TaskKind::Other(String::new()).key() {
        return Err("use --other <label> for a custom task".to_string());
    }
    TaskKind::from_key(key, None).map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, config_error) = match AppConfig::load(&cli.config) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    logging::initialize(config.log_destination, cli.verbose);
    if let Some(err) = config_error {
        board_warn!("{}; using defaults", err);
    }
    board_info!("Remote store at {}", config.base_url);

    let engine = commands::build_engine(&config)?;
    match cli.command {
        Command::Watch => commands::watch(&engine, &config).await,
        Command::List => commands::list(&engine).await,
        Command::Create { name, tasks, other } => {
            commands::create(&engine, name, tasks, other).await
        }
        Command::Delete { id } => commands::delete(&engine, id).await,
        Command::SetStatus { id, task, status } => {
            commands::set_status(&engine, id, task, status).await
        }
    }
}
