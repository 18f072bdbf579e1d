//! Whole-document snapshots.
//!
//! Every save commits one full serialized copy of the notebook at
//! `notebook.ipynb` in the working tree. Restore reads only this file; the
//! per-cell files are never reassembled.

use std::fs;
use std::path::{Path, PathBuf};

use super::cells::validate_cell_id;
use super::file_storage::{Result, StorageError};
use super::models::Document;

/// Snapshot file name, relative to the working tree root
pub const SNAPSHOT_FILE: &str = "notebook.ipynb";

pub fn snapshot_path(workdir: &Path) -> PathBuf {
    workdir.join(SNAPSHOT_FILE)
}

/// Parse a serialized notebook, validating every cell identifier
pub fn parse_document(bytes: &[u8]) -> Result<Document> {
    let document: Document = serde_json::from_slice(bytes)
        .map_err(|e| StorageError::MalformedDocument(e.to_string()))?;

    for cell in &document.cells {
        validate_cell_id(&cell.id)?;
    }
    Ok(document)
}

/// A parsed notebook together with the exact bytes it was read from.
///
/// The bytes are what gets committed as the snapshot, so a restore hands
/// back the file the user saved rather than a re-serialization of it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub document: Document,
    pub raw: Vec<u8>,
}

impl LoadedDocument {
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self> {
        let document = parse_document(&raw)?;
        Ok(Self { document, raw })
    }

    /// Wrap an in-memory document using its canonical serialization
    pub fn from_document(document: Document) -> Result<Self> {
        let raw = to_bytes(&document)?;
        Ok(Self { document, raw })
    }
}

/// Load a notebook from external storage
pub fn load_document(path: &Path) -> Result<LoadedDocument> {
    LoadedDocument::from_bytes(fs::read(path)?)
}

/// Canonical serialized form of a document
pub fn to_bytes(document: &Document) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(document)?)
}

/// Write the document's source bytes verbatim
pub fn write_snapshot(path: &Path, loaded: &LoadedDocument) -> Result<()> {
    fs::write(path, &loaded.raw)?;
    Ok(())
}

pub fn read_snapshot(path: &Path) -> Result<LoadedDocument> {
    LoadedDocument::from_bytes(fs::read(path)?)
}

/// Replace `dest` with `bytes` through a sibling temp file and a rename
pub fn replace_file(dest: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp = dest.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes)?;
    if let Err(e) = fs::rename(&tmp, dest) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
