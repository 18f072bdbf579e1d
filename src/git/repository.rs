//! Git Repository Operations
//!
//! Primitives the notebook vault consumes: open-or-init, staging, commits,
//! tags and history.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use git2::{Commit, Error as GitError, Oid, Repository, RepositoryInitOptions, Signature};
use serde::{Deserialize, Serialize};

/// Git operation errors
#[derive(Debug, thiserror::Error)]
pub enum GitOperationError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),
    #[error("Repository not initialized")]
    NotInitialized,
    #[error("Repository has no working directory: {0}")]
    NoWorkingDirectory(PathBuf),
    #[error("Not a repository and not empty: {0}")]
    NotARepository(PathBuf),
    #[error("Revision not found: {0}")]
    RevisionNotFound(String),
    #[error("Invalid tag name: {0}")]
    InvalidTagName(String),
    #[error("Tag already exists: {0}")]
    TagExists(String),
    #[error("No commits yet")]
    NoCommits,
}

pub type Result<T> = std::result::Result<T, GitOperationError>;

/// Information about a commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    pub id: String,
    pub short_id: String,
    pub message: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// Author identity used for vault commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// Check if a directory is a Git repository
pub fn is_git_repo(path: &Path) -> bool {
    Repository::open(path).is_ok()
}

/// Open an existing Git repository
pub fn open_repo(path: &Path) -> Result<Repository> {
    Repository::open(path).map_err(|e| {
        if e.code() == git2::ErrorCode::NotFound {
            GitOperationError::NotInitialized
        } else {
            GitOperationError::Git(e)
        }
    })
}

/// Open the repository at `path`, or initialize one if the location is
/// missing or an empty directory.
///
/// Returns the repository and whether it was freshly created.
pub fn open_or_init(path: &Path, main_branch: &str) -> Result<(Repository, bool)> {
    if is_git_repo(path) {
        let repo = open_repo(path)?;
        if repo.workdir().is_none() {
            return Err(GitOperationError::NoWorkingDirectory(path.to_path_buf()));
        }
        return Ok((repo, false));
    }

    if path.exists() {
        let occupied = fs::read_dir(path)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(true);
        if occupied || !path.is_dir() {
            return Err(GitOperationError::NotARepository(path.to_path_buf()));
        }
    }

    let mut opts = RepositoryInitOptions::new();
    opts.initial_head(main_branch).mkpath(true);
    let repo = Repository::init_opts(path, &opts)?;
    log::info!("Initialized Git repository at {:?}", path);
    Ok((repo, true))
}

/// Working tree root of a repository
pub fn workdir(repo: &Repository) -> Result<PathBuf> {
    repo.workdir()
        .map(Path::to_path_buf)
        .ok_or_else(|| GitOperationError::NoWorkingDirectory(repo.path().to_path_buf()))
}

/// Convert a git2::Commit to CommitInfo
pub fn commit_to_info(commit: &Commit) -> CommitInfo {
    let timestamp = DateTime::from_timestamp(commit.time().seconds(), 0)
        .unwrap_or_else(Utc::now);
    let id = commit.id().to_string();

    CommitInfo {
        short_id: id[..7].to_string(),
        id,
        message: commit.message().unwrap_or("").trim().to_string(),
        author: commit.author().name().unwrap_or("Unknown").to_string(),
        timestamp,
    }
}

/// Stage paths (relative to the working tree) into the index
pub fn stage(repo: &Repository, paths: &[&Path]) -> Result<()> {
    let mut index = repo.index()?;
    for path in paths {
        index.add_path(path)?;
    }
    index.write()?;
    Ok(())
}

/// Remove paths (relative to the working tree) from the index
pub fn unstage(repo: &Repository, paths: &[&Path]) -> Result<()> {
    let mut index = repo.index()?;
    for path in paths {
        index.remove_path(path)?;
    }
    index.write()?;
    Ok(())
}

/// Commit the current index onto HEAD and return the new commit
pub fn commit(repo: &Repository, identity: &Identity, message: &str) -> Result<CommitInfo> {
    let mut index = repo.index()?;
    let tree_id = index.write_tree()?;
    let tree = repo.find_tree(tree_id)?;

    // Get parent commit (if any)
    let parent_commit = repo.head().ok().and_then(|h| h.peel_to_commit().ok());

    let sig = get_signature(repo, identity)?;

    let commit_id = if let Some(parent) = parent_commit {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?
    } else {
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &[])?
    };

    let commit = repo.find_commit(commit_id)?;
    log::info!("Created commit: {} - {}", &commit_id.to_string()[..7], message);

    Ok(commit_to_info(&commit))
}

/// Signature for commits: repository config first, then the vault identity
fn get_signature(repo: &Repository, identity: &Identity) -> Result<Signature<'static>> {
    if let Ok(sig) = repo.signature() {
        return Ok(Signature::now(
            sig.name().unwrap_or(identity.name.as_str()),
            sig.email().unwrap_or(identity.email.as_str()),
        )?);
    }

    Ok(Signature::now(&identity.name, &identity.email)?)
}

/// Check that `name` can be used as a fresh tag in `repo`
pub fn validate_new_tag(repo: &Repository, name: &str) -> Result<()> {
    let refname = format!("refs/tags/{}", name);
    if name.is_empty() || !git2::Reference::is_valid_name(&refname) {
        return Err(GitOperationError::InvalidTagName(name.to_string()));
    }
    if repo.find_reference(&refname).is_ok() {
        return Err(GitOperationError::TagExists(name.to_string()));
    }
    Ok(())
}

/// Create a lightweight tag pointing at `commit_id`
pub fn tag(repo: &Repository, name: &str, commit_id: &str) -> Result<()> {
    validate_new_tag(repo, name)?;
    let oid = Oid::from_str(commit_id)?;
    let target = repo.find_object(oid, Some(git2::ObjectType::Commit))?;
    repo.tag_lightweight(name, &target, false)?;
    log::info!("Tagged {} as {}", &commit_id[..7.min(commit_id.len())], name);
    Ok(())
}

/// List tag names, sorted
pub fn list_tags(repo: &Repository) -> Result<Vec<String>> {
    let names = repo.tag_names(None)?;
    let mut tags: Vec<String> = names.iter().flatten().map(String::from).collect();
    tags.sort();
    Ok(tags)
}

/// Commit history reachable from `branch`, newest first
pub fn list_commits(repo: &Repository, branch: &str, limit: usize) -> Result<Vec<CommitInfo>> {
    let mut revwalk = repo.revwalk()?;
    revwalk.push_ref(&format!("refs/heads/{}", branch))?;
    revwalk.set_sorting(git2::Sort::TIME | git2::Sort::TOPOLOGICAL)?;

    let mut commits = Vec::new();

    for oid_result in revwalk {
        let oid = oid_result?;
        let commit = repo.find_commit(oid)?;
        commits.push(commit_to_info(&commit));

        if commits.len() >= limit {
            break;
        }
    }

    Ok(commits)
}
