//! Thin client over the external `git` binary.
//!
//! Every operation shells out with `tokio::process::Command` against the
//! configured working copy, under an explicit timeout. Exit status is the
//! success signal; stdout/stderr are captured as lossy UTF-8.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Per-command execution timeout. Fetches against a slow remote are the
/// longest-running operation this covers.
const GIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Maximum stderr preview embedded in an error (keeps log lines bounded).
const MAX_STDERR_PREVIEW: usize = 512;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to spawn git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("git {args} timed out after {}s", GIT_TIMEOUT.as_secs())]
    Timeout { args: String },

    #[error("git {args} exited with {code:?}: {stderr}")]
    Failed {
        args: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Captured output of one git invocation.
pub struct GitOutput {
    pub ok: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

// ─── GitClient ────────────────────────────────────────────────────────────────

/// Runs git subcommands against one working copy.
pub struct GitClient {
    repo_path: PathBuf,
}

impl GitClient {
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
        }
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Run `git <args>` in the working copy. A non-zero exit is not an
    /// error at this level; callers that require success go through
    /// [`GitClient::run_checked`].
    pub async fn run(&self, args: &[&str]) -> Result<GitOutput, GitError> {
        debug!(args = %args.join(" "), "running git");

        let run = tokio::time::timeout(GIT_TIMEOUT, async {
            Command::new("git")
                .args(args)
                .current_dir(&self.repo_path)
                .output()
                .await
        })
        .await;

        let output = match run {
            Ok(Ok(o)) => o,
            Ok(Err(e)) => return Err(GitError::Spawn(e)),
            Err(_) => {
                return Err(GitError::Timeout {
                    args: args.join(" "),
                })
            }
        };

        Ok(GitOutput {
            ok: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    /// Run `git <args>` and turn a non-zero exit into [`GitError::Failed`].
    pub async fn run_checked(&self, args: &[&str]) -> Result<GitOutput, GitError> {
        let out = self.run(args).await?;
        if out.ok {
            return Ok(out);
        }
        Err(GitError::Failed {
            args: args.join(" "),
            code: out.code,
            stderr: out.stderr.trim().chars().take(MAX_STDERR_PREVIEW).collect(),
        })
    }

    /// Resolve a ref (e.g. `HEAD`, `origin/main`) to its commit hash.
    pub async fn rev_parse(&self, reference: &str) -> Result<String, GitError> {
        let out = self.run_checked(&["rev-parse", reference]).await?;
        Ok(out.stdout.trim().to_string())
    }

    /// Refresh remote-tracking refs for `origin`.
    pub async fn fetch_origin(&self) -> Result<(), GitError> {
        self.run_checked(&["fetch", "origin"]).await?;
        Ok(())
    }

    pub async fn checkout(&self, branch: &str) -> Result<(), GitError> {
        self.run_checked(&["checkout", branch]).await?;
        Ok(())
    }

    /// Hard-reset the working copy to `target` (e.g. `origin/main`).
    /// Destructive: discards local modifications.
    pub async fn reset_hard(&self, target: &str) -> Result<(), GitError> {
        self.run_checked(&["reset", "--hard", target]).await?;
        Ok(())
    }

    /// Number of parents of HEAD. 1 for an ordinary commit, >1 for a
    /// merge, 0 for the initial commit.
    pub async fn head_parent_count(&self) -> Result<usize, GitError> {
        let out = self
            .run_checked(&["rev-list", "--parents", "-n", "1", "HEAD"])
            .await?;
        // First line is "<commit> <parent>..."
        let parents = out
            .stdout
            .lines()
            .next()
            .map(|l| l.split_whitespace().count().saturating_sub(1))
            .unwrap_or(0);
        Ok(parents)
    }

    /// One-line files/insertions/deletions summary for the last commit.
    pub async fn last_commit_shortstat(&self) -> Result<String, GitError> {
        let out = self
            .run_checked(&["diff", "HEAD~1", "HEAD", "--shortstat"])
            .await?;
        Ok(out.stdout.trim().to_string())
    }
}
