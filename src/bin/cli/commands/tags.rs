use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run_tag(
    app: &App,
    notebook: &str,
    name: &str,
    revision: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let commit = app
        .store
        .tag(notebook, name, revision)
        .with_context(|| format!("Failed to tag {} as {}", notebook, name))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "tag": name, "commit": commit });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Tagged {} as {}", commit.short_id, name);
        }
    }

    Ok(())
}

pub fn run_list(app: &App, notebook: &str, format: &OutputFormat) -> Result<()> {
    let tags = app.store.list_tags(notebook).context("Failed to list tags")?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&tags)?);
        }
        OutputFormat::Plain => {
            if tags.is_empty() {
                println!("No tags found.");
                return Ok(());
            }
            for tag in &tags {
                println!("{}", tag);
            }
            println!("\n{} tags total", tags.len());
        }
    }

    Ok(())
}
