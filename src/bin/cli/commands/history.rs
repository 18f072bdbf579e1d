use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, notebook: &str, limit: usize, format: &OutputFormat) -> Result<()> {
    let commits = app
        .store
        .history(notebook, limit)
        .context("Failed to read history")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&commits)?);
        }
        OutputFormat::Plain => {
            for commit in &commits {
                println!(
                    "{}  {}  {}",
                    commit.short_id,
                    commit.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    commit.message
                );
            }
        }
    }

    Ok(())
}
