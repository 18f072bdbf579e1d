mod app;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "nous-vault", about = "Git-backed cell-level notebook backups", version)]
struct Cli {
    /// Directory holding notebook repositories (overrides the config file)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create the repository for a notebook
    Create {
        /// Notebook key
        notebook: String,
    },

    /// Commit the current state of a notebook file
    Save {
        /// Notebook key
        notebook: String,
        /// Notebook file to back up
        file: PathBuf,
        /// Tag the new revision
        #[arg(long)]
        tag: Option<String>,
    },

    /// Write a past revision of a notebook to a file
    Restore {
        /// Notebook key
        notebook: String,
        /// Tag name or commit id
        revision: String,
        /// Destination file (replaced)
        dest: PathBuf,
    },

    /// Tag an existing revision
    Tag {
        /// Notebook key
        notebook: String,
        /// Tag name
        name: String,
        /// Revision to tag (defaults to the latest save)
        #[arg(long)]
        rev: Option<String>,
    },

    /// List tags of a notebook
    Tags {
        /// Notebook key
        notebook: String,
    },

    /// Show save history, newest first
    Log {
        /// Notebook key
        notebook: String,
        /// Maximum entries
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Move a notebook's history to a new key
    Rename {
        old: String,
        new: String,
    },

    /// Delete a notebook's repository and history
    Delete {
        /// Notebook key
        notebook: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let app = app::App::new(cli.root, cli.config.as_deref())?;

    match cli.command {
        Command::Create { notebook } => {
            commands::manage::run_create(&app, &notebook, &cli.format)?;
        }
        Command::Save { notebook, file, tag } => {
            commands::save::run(&app, &notebook, &file, tag.as_deref(), &cli.format)?;
        }
        Command::Restore { notebook, revision, dest } => {
            commands::restore::run(&app, &notebook, &revision, &dest, &cli.format)?;
        }
        Command::Tag { notebook, name, rev } => {
            commands::tags::run_tag(&app, &notebook, &name, rev.as_deref(), &cli.format)?;
        }
        Command::Tags { notebook } => {
            commands::tags::run_list(&app, &notebook, &cli.format)?;
        }
        Command::Log { notebook, limit } => {
            commands::history::run(&app, &notebook, limit, &cli.format)?;
        }
        Command::Rename { old, new } => {
            commands::manage::run_rename(&app, &old, &new)?;
        }
        Command::Delete { notebook } => {
            commands::manage::run_delete(&app, &notebook)?;
        }
    }

    Ok(())
}
