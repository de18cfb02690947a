//! Repository-side collaborators: the git subprocess client, the change
//! detector, and the synchronizer.

pub mod git;
pub mod sync;

pub use git::{GitClient, GitError};

use tracing::warn;

/// Local and remote head ids observed to differ.
pub struct HeadDelta {
    pub local: String,
    pub remote: String,
}

/// Compare local HEAD against `origin/<branch>` after a fetch.
///
/// Returns `Some` only when the two ids differ. Any underlying command
/// failure degrades to "no change detected" for this cycle; the next
/// poll retries from scratch.
pub async fn detect_change(git: &GitClient, branch: &str) -> Option<HeadDelta> {
    if let Err(e) = git.fetch_origin().await {
        warn!(err = %e, "fetch failed; skipping change check this cycle");
        return None;
    }

    let local = match git.rev_parse("HEAD").await {
        Ok(id) => id,
        Err(e) => {
            warn!(err = %e, "could not resolve local HEAD");
            return None;
        }
    };

    let remote_ref = format!("origin/{branch}");
    let remote = match git.rev_parse(&remote_ref).await {
        Ok(id) => id,
        Err(e) => {
            warn!(err = %e, branch = %remote_ref, "could not resolve remote head");
            return None;
        }
    };

    if local == remote {
        return None;
    }
    Some(HeadDelta { local, remote })
}
