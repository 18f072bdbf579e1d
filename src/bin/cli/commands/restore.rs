use std::path::Path;

use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    notebook: &str,
    revision: &str,
    dest: &Path,
    format: &OutputFormat,
) -> Result<()> {
    let document = app
        .store
        .restore(notebook, revision, dest)
        .with_context(|| format!("Failed to restore {} at {}", notebook, revision))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "notebook": notebook,
                "revision": revision,
                "dest": dest.to_string_lossy(),
                "cells": document.cell_ids(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Restored {} at {} ({} cells) to {}",
                notebook,
                revision,
                document.cells.len(),
                dest.display()
            );
        }
    }

    Ok(())
}
