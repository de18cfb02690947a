//! Repository synchronizer — forces the local working copy to exactly
//! match `origin/<branch>`.

use tracing::info;

use super::git::{GitClient, GitError};

/// Fetch, checkout and hard-reset to the remote branch tip.
///
/// Idempotent when there is nothing new, destructive otherwise: local
/// modifications in the automation clone are discarded. If any step
/// fails the caller must abort the pipeline for this cycle; the
/// checkout may be in an inconsistent state for diffing.
pub async fn sync_to_remote(git: &GitClient, branch: &str) -> Result<(), GitError> {
    info!(branch = %branch, path = %git.repo_path().display(), "syncing working copy");
    git.fetch_origin().await?;
    git.checkout(branch).await?;
    git.reset_hard(&format!("origin/{branch}")).await?;
    info!(branch = %branch, "working copy synced");
    Ok(())
}
