use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use nous_vault_lib::storage::{DocumentStore, DocumentStoreConfig};

/// Shared application state for CLI commands
pub struct App {
    pub store: DocumentStore,
}

impl App {
    /// Build the store from an optional config file and root override
    pub fn new(root: Option<PathBuf>, config_path: Option<&Path>) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => DocumentStoreConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => DocumentStoreConfig::default(),
        };

        if let Some(root) = root {
            config.root = root;
        }

        log::debug!("Using notebook store root {:?}", config.root);
        Ok(Self {
            store: DocumentStore::new(config),
        })
    }
}
