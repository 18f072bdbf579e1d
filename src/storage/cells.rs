//! Per-cell files in the repository working tree.
//!
//! Cell `X` lives at `X.json` beside the ledger. Files are rewritten on every
//! save whether or not the cell changed.

use std::fs;
use std::path::{Path, PathBuf};

use super::file_storage::{Result, StorageError};
use super::models::{Cell, Document};

const CELL_EXTENSION: &str = "json";

/// Reject identifiers that cannot safely name a file at the working tree root
pub fn validate_cell_id(id: &str) -> Result<()> {
    let invalid = id.is_empty()
        || id.starts_with('.')
        || id.contains(['/', '\\', '\0'])
        || id.chars().any(char::is_control);

    if invalid {
        return Err(StorageError::InvalidCellId(id.to_string()));
    }
    Ok(())
}

/// Cell file path relative to the working tree root
pub fn cell_file_name(id: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", id, CELL_EXTENSION))
}

fn write_cell(workdir: &Path, cell: &Cell) -> Result<()> {
    validate_cell_id(&cell.id)?;
    let content = serde_json::to_vec_pretty(cell)?;
    fs::write(workdir.join(cell_file_name(&cell.id)), content)?;
    Ok(())
}

/// Write every cell of `document` into `workdir`, overwriting existing files
pub fn write_cells(workdir: &Path, document: &Document) -> Result<()> {
    if !workdir.is_dir() {
        return Err(StorageError::NoWorkingDirectory(workdir.to_path_buf()));
    }

    for cell in &document.cells {
        write_cell(workdir, cell)?;
    }

    log::debug!("Wrote {} cell files to {:?}", document.cells.len(), workdir);
    Ok(())
}

/// Delete the file of a cell that is no longer part of the document
pub fn remove_cell(workdir: &Path, id: &str) -> Result<()> {
    validate_cell_id(id)?;
    let path = workdir.join(cell_file_name(id));
    if path.exists() {
        fs::remove_file(&path)?;
    }
    Ok(())
}

/// Read a single cell back from its file
pub fn read_cell(workdir: &Path, id: &str) -> Result<Cell> {
    validate_cell_id(id)?;
    let content = fs::read(workdir.join(cell_file_name(id)))?;
    Ok(serde_json::from_slice(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn cell(id: &str, text: &str) -> Cell {
        let payload = json!({ "cell_type": "code", "source": text });
        Cell::new(id, payload.as_object().unwrap().clone())
    }

    #[test]
    fn test_write_and_read_cells() {
        let dir = TempDir::new().unwrap();
        let doc = Document::new(vec![cell("a", "x"), cell("b", "y")]);

        write_cells(dir.path(), &doc).unwrap();

        assert_eq!(read_cell(dir.path(), "a").unwrap(), doc.cells[0]);
        assert_eq!(read_cell(dir.path(), "b").unwrap(), doc.cells[1]);
    }

    #[test]
    fn test_write_overwrites() {
        let dir = TempDir::new().unwrap();
        write_cells(dir.path(), &Document::new(vec![cell("a", "old")])).unwrap();
        write_cells(dir.path(), &Document::new(vec![cell("a", "new")])).unwrap();

        let read = read_cell(dir.path(), "a").unwrap();
        assert_eq!(read.payload["source"], "new");
    }

    #[test]
    fn test_missing_workdir() {
        let dir = TempDir::new().unwrap();
        let err = write_cells(&dir.path().join("gone"), &Document::default()).unwrap_err();
        assert!(matches!(err, StorageError::NoWorkingDirectory(_)));
    }

    #[test]
    fn test_rejects_unsafe_ids() {
        for id in ["", ".", "..", ".git", "a/b", "..\\x", "nul\0"] {
            assert!(
                matches!(validate_cell_id(id), Err(StorageError::InvalidCellId(_))),
                "accepted {:?}",
                id
            );
        }
        validate_cell_id("4f1c-8a2e").unwrap();
    }

    #[test]
    fn test_remove_cell() {
        let dir = TempDir::new().unwrap();
        write_cells(dir.path(), &Document::new(vec![cell("a", "x")])).unwrap();
        remove_cell(dir.path(), "a").unwrap();
        assert!(!dir.path().join("a.json").exists());
        // Removing again is a no-op
        remove_cell(dir.path(), "a").unwrap();
    }
}
