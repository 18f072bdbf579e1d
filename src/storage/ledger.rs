//! Cell-order ledger and identifier diffing.
//!
//! The ledger is a plain text file at the working tree root holding one cell
//! identifier per line, in presentation order, as of the last save.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::file_storage::Result;

/// Ledger file name, relative to the working tree root
pub const LEDGER_FILE: &str = "UUIDS";

/// Identifiers that appeared and disappeared between two saves
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellDiff {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

impl CellDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Compare the previous identifier order against the current one.
///
/// Set semantics: reorderings produce an empty diff and duplicate
/// identifiers collapse.
pub fn diff(previous: &[String], current: &[String]) -> CellDiff {
    let previous: BTreeSet<&String> = previous.iter().collect();
    let current: BTreeSet<&String> = current.iter().collect();

    CellDiff {
        added: current.difference(&previous).map(|s| (*s).clone()).collect(),
        removed: previous.difference(&current).map(|s| (*s).clone()).collect(),
    }
}

pub fn ledger_path(workdir: &Path) -> PathBuf {
    workdir.join(LEDGER_FILE)
}

/// Read the last recorded identifier order. A missing ledger reads as empty.
pub fn read_ledger(workdir: &Path) -> Result<Vec<String>> {
    let path = ledger_path(workdir);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::warn!("No ledger at {:?}, treating as empty", path);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    Ok(content
        .lines()
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Overwrite the ledger with `ids`, one per line
pub fn write_ledger(workdir: &Path, ids: &[String]) -> Result<()> {
    let mut content = String::new();
    for id in ids {
        content.push_str(id);
        content.push('\n');
    }
    fs::write(ledger_path(workdir), content)?;
    Ok(())
}

/// Diff the stored ledger against `current`, then record `current`.
///
/// The ledger is rewritten even when the diff is empty so that pure
/// reorderings are captured.
pub fn advance_ledger(workdir: &Path, current: &[String]) -> Result<CellDiff> {
    let previous = read_ledger(workdir)?;
    let changes = diff(&previous, current);
    write_ledger(workdir, current)?;

    log::debug!(
        "Ledger advanced: {} added, {} removed, {} total",
        changes.added.len(),
        changes.removed.len(),
        current.len()
    );
    Ok(changes)
}
