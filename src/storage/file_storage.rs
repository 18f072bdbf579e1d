use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::config::DocumentStoreConfig;
use super::models::Document;
use super::snapshots;
use super::vault::{NotebookVault, SaveOutcome};
use crate::git::{self, CommitInfo, GitOperationError};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Git(#[from] GitOperationError),

    #[error("Malformed notebook: {0}")]
    MalformedDocument(String),

    #[error("Invalid cell id: {0:?}")]
    InvalidCellId(String),

    #[error("Working directory not found: {0}")]
    NoWorkingDirectory(PathBuf),

    #[error("No snapshot stored at revision {0}")]
    SnapshotMissing(String),

    #[error("No repository for notebook: {0}")]
    RepositoryNotFound(String),

    #[error("Invalid notebook key: {0:?}")]
    InvalidKey(String),

    #[error("Repository already exists for notebook: {0}")]
    RepositoryExists(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<git2::Error> for StorageError {
    fn from(e: git2::Error) -> Self {
        Self::Git(GitOperationError::Git(e))
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Maps notebook keys to their repositories under one root directory
pub struct DocumentStore {
    config: DocumentStoreConfig,
}

impl DocumentStore {
    pub fn new(config: DocumentStoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DocumentStoreConfig {
        &self.config
    }

    /// Initialize the root directory
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.config.root)?;
        Ok(())
    }

    /// Repository location for a notebook key.
    ///
    /// Keys are percent-encoded into a single path component so distinct keys
    /// never share a directory.
    pub fn repository_path(&self, key: &str) -> PathBuf {
        let encoded = urlencoding::encode(key).replace('.', "%2E");
        self.config.root.join(encoded)
    }

    fn location(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.repository_path(key))
    }

    /// Open the repository for `key`, creating it on first use
    pub fn resolve_repository(&self, key: &str) -> Result<NotebookVault> {
        let path = self.location(key)?;
        self.init()?;
        NotebookVault::open(&path, &self.config)
    }

    /// Create the repository for `key`
    pub fn create(&self, key: &str) -> Result<NotebookVault> {
        let vault = self.resolve_repository(key)?;
        log::info!("Notebook store ready for {:?}", key);
        Ok(vault)
    }

    /// Open an existing repository without creating one
    pub fn open(&self, key: &str) -> Result<NotebookVault> {
        let path = self.location(key)?;
        if !git::is_git_repo(&path) {
            return Err(StorageError::RepositoryNotFound(key.to_string()));
        }
        NotebookVault::open(&path, &self.config)
    }

    pub fn exists(&self, key: &str) -> bool {
        git::is_git_repo(&self.repository_path(key))
    }

    /// Load the notebook at `source` and commit it to the repository for `key`
    pub fn save(&self, key: &str, source: &Path, tag: Option<&str>) -> Result<SaveOutcome> {
        let loaded = snapshots::load_document(source)?;
        self.resolve_repository(key)?.save_loaded(&loaded, tag)
    }

    pub fn save_document(
        &self,
        key: &str,
        document: &Document,
        tag: Option<&str>,
    ) -> Result<SaveOutcome> {
        self.resolve_repository(key)?.save(document, tag)
    }

    /// Write the notebook as of `revision` to `dest`
    pub fn restore(&self, key: &str, revision: &str, dest: &Path) -> Result<Document> {
        self.open(key)?.restore(revision, dest)
    }

    /// Tag `revision` (main line tip when `None`)
    pub fn tag(&self, key: &str, name: &str, revision: Option<&str>) -> Result<CommitInfo> {
        self.open(key)?.tag(name, revision)
    }

    pub fn list_tags(&self, key: &str) -> Result<Vec<String>> {
        self.open(key)?.tags()
    }

    pub fn history(&self, key: &str, limit: usize) -> Result<Vec<CommitInfo>> {
        self.open(key)?.history(limit)
    }

    /// Move a notebook's repository to a new key
    pub fn rename(&self, old_key: &str, new_key: &str) -> Result<()> {
        let from = self.location(old_key)?;
        let to = self.location(new_key)?;

        if !git::is_git_repo(&from) {
            return Err(StorageError::RepositoryNotFound(old_key.to_string()));
        }
        if to.exists() {
            return Err(StorageError::RepositoryExists(new_key.to_string()));
        }

        fs::rename(&from, &to)?;
        log::info!("Renamed notebook store {:?} -> {:?}", old_key, new_key);
        Ok(())
    }

    /// Remove a notebook's repository and all of its history
    pub fn delete(&self, key: &str) -> Result<()> {
        let path = self.location(key)?;
        if !git::is_git_repo(&path) {
            return Err(StorageError::RepositoryNotFound(key.to_string()));
        }

        fs::remove_dir_all(&path)?;
        log::info!("Deleted notebook store {:?}", key);
        Ok(())
    }
}
