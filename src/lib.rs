//! Cell-level notebook backups on top of Git.
//!
//! Each notebook gets its own repository. A save writes one file per cell, a
//! full snapshot and an ordered ledger of cell ids, then commits exactly the
//! cells that appeared or disappeared since the previous save. A restore
//! forces the working tree onto a tag or commit and copies its snapshot out.

pub mod git;
pub mod storage;

pub use storage::{
    load_document, Cell, CellDiff, Document, DocumentStore, DocumentStoreConfig, LoadedDocument,
    NotebookVault, SaveOutcome, StorageError,
};
