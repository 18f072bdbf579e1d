//! Revision checkout
//!
//! Moves the working tree between committed states. Every checkout is a
//! forced overwrite: tracked files are reset, untracked files are removed,
//! and nothing is merged or stashed.

use git2::build::CheckoutBuilder;
use git2::{Commit, ErrorCode, Repository};

use super::repository::{commit_to_info, CommitInfo, GitOperationError, Result};

/// Resolve a tag name or commit reference to a commit.
///
/// Tags win over other revision expressions of the same name.
pub fn resolve<'r>(repo: &'r Repository, revision: &str) -> Result<Commit<'r>> {
    let not_found = || GitOperationError::RevisionNotFound(revision.to_string());

    if let Ok(reference) = repo.find_reference(&format!("refs/tags/{}", revision)) {
        return reference.peel_to_commit().map_err(|_| not_found());
    }

    let object = repo.revparse_single(revision).map_err(|e| match e.code() {
        ErrorCode::NotFound | ErrorCode::Ambiguous | ErrorCode::InvalidSpec => not_found(),
        _ => GitOperationError::Git(e),
    })?;
    object.peel_to_commit().map_err(|_| not_found())
}

fn force_checkout_tree(repo: &Repository, commit: &Commit) -> Result<()> {
    let mut checkout = CheckoutBuilder::new();
    checkout.force().remove_untracked(true);
    repo.checkout_tree(commit.as_object(), Some(&mut checkout))?;
    Ok(())
}

/// Force the working tree and index to match `revision`, detaching HEAD.
///
/// Resolution happens before any file is touched, so an unknown revision
/// leaves the working tree as it was.
pub fn checkout(repo: &Repository, revision: &str) -> Result<CommitInfo> {
    let commit = resolve(repo, revision)?;
    force_checkout_tree(repo, &commit)?;
    repo.set_head_detached(commit.id())?;

    log::info!("Checked out {} ({})", revision, &commit.id().to_string()[..7]);
    Ok(commit_to_info(&commit))
}

/// Force the working tree back onto the tip of the main line and reattach HEAD.
pub fn checkout_main_line(repo: &Repository, main_branch: &str) -> Result<CommitInfo> {
    let refname = format!("refs/heads/{}", main_branch);
    let commit = repo
        .find_reference(&refname)
        .and_then(|r| r.peel_to_commit())
        .map_err(|e| {
            if e.code() == ErrorCode::NotFound {
                GitOperationError::NoCommits
            } else {
                GitOperationError::Git(e)
            }
        })?;

    force_checkout_tree(repo, &commit)?;
    repo.set_head(&refname)?;

    log::debug!("Synced working tree to {} ({})", main_branch, &commit.id().to_string()[..7]);
    Ok(commit_to_info(&commit))
}
