use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run_create(app: &App, notebook: &str, format: &OutputFormat) -> Result<()> {
    let vault = app
        .store
        .create(notebook)
        .with_context(|| format!("Failed to create store for {}", notebook))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "notebook": notebook,
                "path": vault.workdir().to_string_lossy(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Created store for {} at {}", notebook, vault.workdir().display());
        }
    }

    Ok(())
}

pub fn run_rename(app: &App, old: &str, new: &str) -> Result<()> {
    app.store
        .rename(old, new)
        .with_context(|| format!("Failed to rename {} to {}", old, new))?;
    println!("Renamed {} to {}", old, new);
    Ok(())
}

pub fn run_delete(app: &App, notebook: &str) -> Result<()> {
    app.store
        .delete(notebook)
        .with_context(|| format!("Failed to delete {}", notebook))?;
    println!("Deleted {}", notebook);
    Ok(())
}
