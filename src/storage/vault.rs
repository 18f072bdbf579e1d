//! Save and restore of one notebook against its Git repository.
//!
//! A save forces the working tree back onto the main line, rewrites every
//! cell file and the snapshot, advances the ledger, stages exactly what the
//! new state needs and commits. A restore forces the working tree onto a
//! historical revision and copies that revision's snapshot out.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use git2::Repository;
use serde::Serialize;

use super::cells::{self, cell_file_name};
use super::config::DocumentStoreConfig;
use super::file_storage::{Result, StorageError};
use super::ledger::{self, LEDGER_FILE};
use super::models::Document;
use super::snapshots::{self, LoadedDocument, SNAPSHOT_FILE};
use crate::git::{self, revision, CommitInfo, Identity};

const SEED_MESSAGE: &str = "Initialize notebook store";
const SAVE_MESSAGE: &str = "Save notebook";

/// Result of a successful save
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOutcome {
    pub commit: CommitInfo,
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// A notebook's repository, opened for saving and restoring
pub struct NotebookVault {
    repo: Repository,
    workdir: PathBuf,
    main_branch: String,
    identity: Identity,
}

impl NotebookVault {
    /// Open the repository at `path`, creating and seeding it if needed
    pub fn open(path: &Path, config: &DocumentStoreConfig) -> Result<Self> {
        let (repo, created) = git::open_or_init(path, &config.main_branch)?;
        let workdir = git::workdir(&repo)?;

        let vault = Self {
            repo,
            workdir,
            main_branch: config.main_branch.clone(),
            identity: config.identity(),
        };

        if created || !vault.has_main_line() {
            vault.seed()?;
        }
        Ok(vault)
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    fn has_main_line(&self) -> bool {
        self.repo
            .find_reference(&format!("refs/heads/{}", self.main_branch))
            .is_ok()
    }

    /// Seed an empty ledger so the main line exists before the first save
    fn seed(&self) -> Result<()> {
        self.repo.set_head(&format!("refs/heads/{}", self.main_branch))?;
        ledger::write_ledger(&self.workdir, &[])?;
        git::stage(&self.repo, &[Path::new(LEDGER_FILE)])?;
        git::commit(&self.repo, &self.identity, SEED_MESSAGE)?;
        log::info!("Seeded notebook store at {:?}", self.workdir);
        Ok(())
    }

    /// Record `document` as a new commit on the main line, optionally tagged.
    ///
    /// The snapshot is the document's canonical serialization.
    pub fn save(&self, document: &Document, tag: Option<&str>) -> Result<SaveOutcome> {
        let loaded = LoadedDocument::from_document(document.clone())?;
        self.save_loaded(&loaded, tag)
    }

    /// Record a loaded notebook, committing its source bytes as the snapshot.
    ///
    /// Nothing is committed unless every file write succeeds.
    pub fn save_loaded(&self, loaded: &LoadedDocument, tag: Option<&str>) -> Result<SaveOutcome> {
        let document = &loaded.document;
        if let Some(name) = tag {
            git::validate_new_tag(&self.repo, name)?;
        }

        revision::checkout_main_line(&self.repo, &self.main_branch)?;

        cells::write_cells(&self.workdir, document)?;
        snapshots::write_snapshot(&snapshots::snapshot_path(&self.workdir), loaded)?;

        let current = document.cell_ids();
        let changes = ledger::advance_ledger(&self.workdir, &current)?;
        for id in &changes.removed {
            cells::remove_cell(&self.workdir, id)?;
        }

        // Retained cells are staged too so content edits reach the history
        let current_paths: Vec<PathBuf> = current.iter().map(|id| cell_file_name(id)).collect();
        let removed_paths: Vec<PathBuf> =
            changes.removed.iter().map(|id| cell_file_name(id)).collect();

        git::unstage(&self.repo, &as_paths(&removed_paths))?;
        git::stage(&self.repo, &as_paths(&current_paths))?;
        git::stage(&self.repo, &[Path::new(LEDGER_FILE), Path::new(SNAPSHOT_FILE)])?;

        let message = match tag {
            Some(name) => format!("{} [tag: {}]", SAVE_MESSAGE, name),
            None => SAVE_MESSAGE.to_string(),
        };
        let commit = git::commit(&self.repo, &self.identity, &message)?;

        if let Some(name) = tag {
            git::tag(&self.repo, name, &commit.id)?;
        }

        log::info!(
            "Saved {} cells as {} (+{} -{})",
            current.len(),
            commit.short_id,
            changes.added.len(),
            changes.removed.len()
        );

        Ok(SaveOutcome {
            commit,
            added: changes.added,
            removed: changes.removed,
            tag: tag.map(String::from),
        })
    }

    /// Check out `revision` and write its snapshot over `dest`
    pub fn restore(&self, revision: &str, dest: &Path) -> Result<Document> {
        revision::checkout(&self.repo, revision)?;

        let loaded = match snapshots::read_snapshot(&snapshots::snapshot_path(&self.workdir)) {
            Ok(loaded) => loaded,
            Err(StorageError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                return Err(StorageError::SnapshotMissing(revision.to_string()));
            }
            Err(e) => return Err(e),
        };

        snapshots::replace_file(dest, &loaded.raw)?;

        log::info!(
            "Restored {} cells from {} to {:?}",
            loaded.document.cells.len(),
            revision,
            dest
        );
        Ok(loaded.document)
    }

    /// Tag an existing revision, or the main line tip when none is given
    pub fn tag(&self, name: &str, revision: Option<&str>) -> Result<CommitInfo> {
        let main_ref = format!("refs/heads/{}", self.main_branch);
        let commit = revision::resolve(&self.repo, revision.unwrap_or(&main_ref))?;
        let info = git::commit_to_info(&commit);
        git::tag(&self.repo, name, &info.id)?;
        Ok(info)
    }

    pub fn tags(&self) -> Result<Vec<String>> {
        Ok(git::list_tags(&self.repo)?)
    }

    /// Main line commits, newest first
    pub fn history(&self, limit: usize) -> Result<Vec<CommitInfo>> {
        Ok(git::list_commits(&self.repo, &self.main_branch, limit)?)
    }
}

fn as_paths(paths: &[PathBuf]) -> Vec<&Path> {
    paths.iter().map(PathBuf::as_path).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::Cell;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn cell(id: &str, text: &str) -> Cell {
        let payload = json!({ "text": text });
        Cell::new(id, payload.as_object().unwrap().clone())
    }

    fn setup() -> (TempDir, NotebookVault) {
        let temp = TempDir::new().unwrap();
        let config = DocumentStoreConfig::with_root(temp.path().to_path_buf());
        let vault = NotebookVault::open(&temp.path().join("nb"), &config).unwrap();
        (temp, vault)
    }

    fn set(list: &[&str]) -> BTreeSet<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn cell_files(workdir: &Path) -> BTreeSet<String> {
        fs::read_dir(workdir)
            .unwrap()
            .filter_map(|e| {
                let name = e.unwrap().file_name().to_string_lossy().to_string();
                name.strip_suffix(".json").map(String::from)
            })
            .collect()
    }

    fn ledger_ids(vault: &NotebookVault) -> Vec<String> {
        ledger::read_ledger(vault.workdir()).unwrap()
    }

    #[test]
    fn test_open_seeds_main_line() {
        let (_temp, vault) = setup();
        let history = vault.history(10).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].message, SEED_MESSAGE);
        assert!(ledger_ids(&vault).is_empty());
    }

    #[test]
    fn test_add_remove_scenario() {
        let (temp, vault) = setup();
        let dest = temp.path().join("live.ipynb");

        let first_doc = Document::new(vec![cell("a", "x")]);
        let first = vault.save(&first_doc, None).unwrap();
        assert_eq!(first.added, set(&["a"]));
        assert!(first.removed.is_empty());

        let second = vault
            .save(&Document::new(vec![cell("a", "x"), cell("b", "y")]), None)
            .unwrap();
        assert_eq!(second.added, set(&["b"]));
        assert!(second.removed.is_empty());
        assert_eq!(ledger_ids(&vault), vec!["a", "b"]);

        let third = vault.save(&Document::new(vec![cell("b", "y")]), None).unwrap();
        assert!(third.added.is_empty());
        assert_eq!(third.removed, set(&["a"]));
        assert_eq!(ledger_ids(&vault), vec!["b"]);
        assert_eq!(cell_files(vault.workdir()), set(&["b"]));

        let restored = vault.restore(&first.commit.id, &dest).unwrap();
        assert_eq!(restored, first_doc);
        assert_eq!(fs::read(&dest).unwrap(), snapshots::to_bytes(&first_doc).unwrap());
    }

    #[test]
    fn test_round_trip_is_byte_identical() {
        let (temp, vault) = setup();
        let source = temp.path().join("source.ipynb");
        let dest = temp.path().join("restored.ipynb");

        // Jupyter writes one-space indents and a trailing newline
        let raw = concat!(
            "{\n",
            " \"cells\": [\n",
            "  {\n",
            "   \"cell_type\": \"code\",\n",
            "   \"id\": \"c1\",\n",
            "   \"metadata\": {\"n\": 12345678901234567890123, \"f\": 1e2},\n",
            "   \"outputs\": [],\n",
            "   \"source\": \"caf\\u00e9\"\n",
            "  }\n",
            " ],\n",
            " \"metadata\": {},\n",
            " \"nbformat\": 4,\n",
            " \"nbformat_minor\": 5\n",
            "}\n"
        );
        fs::write(&source, raw).unwrap();

        let loaded = snapshots::load_document(&source).unwrap();
        let outcome = vault.save_loaded(&loaded, None).unwrap();
        let restored = vault.restore(&outcome.commit.id, &dest).unwrap();

        assert_eq!(fs::read(&dest).unwrap(), raw.as_bytes());
        assert_eq!(restored, loaded.document);

        let cell_text = fs::read_to_string(vault.workdir().join("c1.json")).unwrap();
        assert!(cell_text.contains("12345678901234567890123"));
        assert!(cell_text.contains("1e2"));
    }

    #[test]
    fn test_reorder_only_save() {
        let (temp, vault) = setup();
        let dest = temp.path().join("live.ipynb");

        vault
            .save(&Document::new(vec![cell("a", "1"), cell("b", "2"), cell("c", "3")]), None)
            .unwrap();

        let reordered = Document::new(vec![cell("c", "3"), cell("a", "1"), cell("b", "2")]);
        let outcome = vault.save(&reordered, None).unwrap();
        assert!(outcome.added.is_empty());
        assert!(outcome.removed.is_empty());
        assert_eq!(ledger_ids(&vault), vec!["c", "a", "b"]);

        let restored = vault.restore(&outcome.commit.id, &dest).unwrap();
        assert_eq!(restored.cell_ids(), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_tagged_save_survives_later_saves() {
        let (temp, vault) = setup();
        let dest = temp.path().join("live.ipynb");

        let tagged_doc = Document::new(vec![cell("a", "release")]);
        let outcome = vault.save(&tagged_doc, Some("v1")).unwrap();
        assert_eq!(outcome.tag.as_deref(), Some("v1"));
        assert_eq!(outcome.commit.message, "Save notebook [tag: v1]");

        vault.save(&Document::new(vec![cell("a", "draft")]), None).unwrap();
        vault.save(&Document::new(vec![cell("z", "other")]), None).unwrap();

        assert_eq!(vault.tags().unwrap(), vec!["v1"]);
        assert_eq!(vault.restore("v1", &dest).unwrap(), tagged_doc);
    }

    #[test]
    fn test_bad_tag_creates_no_commit() {
        let (_temp, vault) = setup();
        vault.save(&Document::new(vec![cell("a", "x")]), Some("v1")).unwrap();
        let before = vault.history(100).unwrap().len();

        let err = vault
            .save(&Document::new(vec![cell("a", "y")]), Some("v1"))
            .unwrap_err();
        assert!(matches!(err, StorageError::Git(git::GitOperationError::TagExists(_))));

        let err = vault
            .save(&Document::new(vec![cell("a", "y")]), Some("bad name~"))
            .unwrap_err();
        assert!(matches!(err, StorageError::Git(git::GitOperationError::InvalidTagName(_))));

        assert_eq!(vault.history(100).unwrap().len(), before);
    }

    #[test]
    fn test_save_after_restore_extends_main_line() {
        let (temp, vault) = setup();
        let dest = temp.path().join("live.ipynb");

        let first = vault.save(&Document::new(vec![cell("a", "x")]), None).unwrap();
        vault
            .save(&Document::new(vec![cell("a", "x"), cell("b", "y")]), None)
            .unwrap();
        vault.restore(&first.commit.id, &dest).unwrap();
        assert_eq!(cell_files(vault.workdir()), set(&["a"]));

        // Diff is computed against the main line tip, not the restored revision
        let outcome = vault
            .save(&Document::new(vec![cell("b", "y"), cell("c", "z")]), None)
            .unwrap();
        assert_eq!(outcome.added, set(&["c"]));
        assert_eq!(outcome.removed, set(&["a"]));
        assert_eq!(cell_files(vault.workdir()), set(&["b", "c"]));

        let history = vault.history(10).unwrap();
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].id, outcome.commit.id);
    }

    #[test]
    fn test_save_discards_working_tree_drift() {
        let (_temp, vault) = setup();
        vault.save(&Document::new(vec![cell("a", "x")]), None).unwrap();

        fs::write(vault.workdir().join("stray.json"), "{}").unwrap();
        ledger::write_ledger(vault.workdir(), &["ghost".to_string()]).unwrap();

        let outcome = vault
            .save(&Document::new(vec![cell("a", "x"), cell("b", "y")]), None)
            .unwrap();
        assert_eq!(outcome.added, set(&["b"]));
        assert!(outcome.removed.is_empty());
        assert_eq!(cell_files(vault.workdir()), set(&["a", "b"]));
    }

    #[test]
    fn test_cell_content_edits_are_committed() {
        let (_temp, vault) = setup();
        vault.save(&Document::new(vec![cell("a", "before")]), None).unwrap();
        vault.save(&Document::new(vec![cell("a", "after")]), None).unwrap();

        let head = vault.repo.head().unwrap().peel_to_tree().unwrap();
        let entry = head.get_path(Path::new("a.json")).unwrap();
        let blob = vault.repo.find_blob(entry.id()).unwrap();
        let committed: Cell = serde_json::from_slice(blob.content()).unwrap();
        assert_eq!(committed.payload["text"], "after");
    }

    #[test]
    fn test_restore_errors() {
        let (temp, vault) = setup();
        let dest = temp.path().join("live.ipynb");
        fs::write(&dest, "untouched").unwrap();

        let err = vault.restore("missing", &dest).unwrap_err();
        assert!(matches!(err, StorageError::Git(git::GitOperationError::RevisionNotFound(_))));

        let seed = vault.history(1).unwrap().remove(0);
        let err = vault.restore(&seed.id, &dest).unwrap_err();
        assert!(matches!(err, StorageError::SnapshotMissing(_)));
        assert_eq!(fs::read_to_string(&dest).unwrap(), "untouched");
    }

    #[test]
    fn test_tag_existing_revision() {
        let (temp, vault) = setup();
        let dest = temp.path().join("live.ipynb");

        let first_doc = Document::new(vec![cell("a", "x")]);
        let first = vault.save(&first_doc, None).unwrap();
        vault.save(&Document::new(vec![cell("b", "y")]), None).unwrap();

        let tagged = vault.tag("first", Some(&first.commit.id)).unwrap();
        assert_eq!(tagged.id, first.commit.id);
        let tip = vault.tag("tip", None).unwrap();
        assert_eq!(tip.id, vault.history(1).unwrap()[0].id);

        assert_eq!(vault.tags().unwrap(), vec!["first", "tip"]);
        assert_eq!(vault.restore("first", &dest).unwrap(), first_doc);
    }
}
