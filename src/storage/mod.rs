pub mod cells;
mod config;
mod file_storage;
pub mod ledger;
mod models;
pub mod snapshots;
mod vault;

pub use config::DocumentStoreConfig;
pub use file_storage::{DocumentStore, Result, StorageError};
pub use ledger::CellDiff;
pub use models::*;
pub use snapshots::{load_document, LoadedDocument};
pub use vault::{NotebookVault, SaveOutcome};
