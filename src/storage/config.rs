use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::file_storage::{Result, StorageError};
use crate::git::Identity;

/// Where notebook repositories live and how commits are written
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStoreConfig {
    /// Directory holding one repository per notebook
    pub root: PathBuf,
    /// Name of the main line branch
    #[serde(default = "default_main_branch")]
    pub main_branch: String,
    /// Commit author used when the repository has no user configured
    #[serde(default = "default_author_name")]
    pub author_name: String,
    #[serde(default = "default_author_email")]
    pub author_email: String,
}

fn default_main_branch() -> String {
    "main".to_string()
}

fn default_author_name() -> String {
    "Nous Vault".to_string()
}

fn default_author_email() -> String {
    "vault@nous.local".to_string()
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        let root = dirs::data_local_dir()
            .map(|p| p.join("nous-vault"))
            .unwrap_or_else(|| PathBuf::from("nous-vault"));
        Self::with_root(root)
    }
}

impl DocumentStoreConfig {
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            root,
            main_branch: default_main_branch(),
            author_name: default_author_name(),
            author_email: default_author_email(),
        }
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| StorageError::Config(e.to_string()))
    }

    pub fn identity(&self) -> Identity {
        Identity {
            name: self.author_name.clone(),
            email: self.author_email.clone(),
        }
    }
}
