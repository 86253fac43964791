//! Terminal front end for `simpletodo_core`.
//!
//! # Responsibility
//! - Parse commands and map them onto `TaskRegistry` operations.
//! - Re-render the affected list after every mutation.
//! - Print storage notifications to stderr.

mod config;
mod render;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use config::Config;
use log::info;
use simpletodo_core::{
    init_logging, KeyValueStore, MemoryStore, Notifier, Severity, SqliteStore, TaskRegistry,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "SimpleTodo: a small persistent to-do list", long_about = None)]
struct Cli {
    /// Directory holding the task database and logs.
    #[arg(long, env = "SIMPLETODO_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long, env = "SIMPLETODO_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Cap on database size in bytes.
    #[arg(long, env = "SIMPLETODO_QUOTA_BYTES", global = true)]
    quota_bytes: Option<u64>,

    /// Keep tasks in memory only; nothing is written to disk.
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a new task.
    Add {
        /// Task text; surrounding whitespace is trimmed.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List active tasks in creation order.
    List,
    /// Toggle completion of an active task.
    Done {
        /// Task ID.
        id: String,
    },
    /// Replace the text of an active task.
    Edit {
        /// Task ID.
        id: String,
        /// New text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Move an active task to the trash.
    Rm {
        /// Task ID.
        id: String,
    },
    /// Move a trashed task back to the active list.
    Restore {
        /// Task ID.
        id: String,
    },
    /// List trashed tasks, most recently deleted first.
    Trash,
    /// Show task counts.
    Stats,
}

struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        eprintln!("[{}] {message}", severity.as_str());
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::resolve(
        cli.data_dir.clone(),
        cli.log_level.as_deref(),
        cli.quota_bytes,
        cli.memory,
    )?;

    if !config.memory {
        init_logging(&config.log_level, config.log_dir()).map_err(anyhow::Error::msg)?;
    }

    let store: Box<dyn KeyValueStore> = if config.memory {
        Box::new(MemoryStore::new())
    } else {
        let db_path = config.db_path();
        Box::new(
            SqliteStore::open(&db_path, &config.store_options())
                .with_context(|| format!("open task database {}", db_path.display()))?,
        )
    };

    let mut registry = TaskRegistry::open(store, StderrNotifier);
    info!("event=cli_command module=cli status=start command={}", command_name(&cli.command));
    run(&mut registry, cli.command)
}

fn run<S: KeyValueStore, N: Notifier>(
    registry: &mut TaskRegistry<S, N>,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Add { text } => {
            let Some(task) = registry.create(&text.join(" ")) else {
                bail!("task text cannot be empty");
            };
            println!("Added {}", task.id);
            render::print_active(registry.active_tasks());
        }
        Commands::List => render::print_active(registry.active_tasks()),
        Commands::Done { id } => {
            if !registry.toggle_completion(&id) {
                bail!("no active task with id {id}");
            }
            render::print_active(registry.active_tasks());
        }
        Commands::Edit { id, text } => {
            let text = text.join(" ");
            if text.trim().is_empty() {
                bail!("task text cannot be empty");
            }
            if !registry.update_text(&id, &text) {
                bail!("no active task with id {id}");
            }
            render::print_active(registry.active_tasks());
        }
        Commands::Rm { id } => {
            if !registry.delete(&id) {
                bail!("no active task with id {id}");
            }
            render::print_active(registry.active_tasks());
        }
        Commands::Restore { id } => {
            if !registry.restore(&id) {
                bail!("no trashed task with id {id}");
            }
            render::print_active(registry.active_tasks());
        }
        Commands::Trash => render::print_deleted(&registry.list_deleted()),
        Commands::Stats => render::print_counts(registry.counts()),
    }
    Ok(())
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Add { .. } => "add",
        Commands::List => "list",
        Commands::Done { .. } => "done",
        Commands::Edit { .. } => "edit",
        Commands::Rm { .. } => "rm",
        Commands::Restore { .. } => "restore",
        Commands::Trash => "trash",
        Commands::Stats => "stats",
    }
}
