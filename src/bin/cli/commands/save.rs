use std::path::Path;

use anyhow::{Context, Result};

use crate::app::App;
use crate::OutputFormat;

pub fn run(
    app: &App,
    notebook: &str,
    file: &Path,
    tag: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    let outcome = app
        .store
        .save(notebook, file, tag)
        .with_context(|| format!("Failed to save {} from {}", notebook, file.display()))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        OutputFormat::Plain => {
            println!("Saved {} as {}", notebook, outcome.commit.short_id);
            if let Some(ref tag) = outcome.tag {
                println!("  tag:     {}", tag);
            }
            for id in &outcome.added {
                println!("  + {}", id);
            }
            for id in &outcome.removed {
                println!("  - {}", id);
            }
            if outcome.added.is_empty() && outcome.removed.is_empty() {
                println!("  (no cells added or removed)");
            }
        }
    }

    Ok(())
}
