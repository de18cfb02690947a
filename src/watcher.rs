// SPDX-License-Identifier: MIT
//! The polling loop driving the whole pipeline.
//!
//! A single cooperative loop: detect an upstream change, sync the
//! working copy, extract and classify the diff, analyze it in chunks,
//! persist the report. At most one pipeline run is in flight at any
//! time; a slow run delays the next tick instead of overlapping it.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::config::WatchConfig;
use crate::diff::DiffExtractor;
use crate::repo::{self, sync, GitClient};
use crate::review::{report, ChunkedAnalyzer, OllamaBackend, ReviewBackend};

pub struct Watcher {
    config: Arc<WatchConfig>,
    git: GitClient,
    backend: Box<dyn ReviewBackend>,
}

impl Watcher {
    pub fn new(config: Arc<WatchConfig>) -> Result<Self> {
        let git = GitClient::new(&config.repo_path);
        let backend = OllamaBackend::new(config.backend_url.clone(), config.model.clone())?;
        Ok(Self {
            config,
            git,
            backend: Box::new(backend),
        })
    }

    /// Spawn the background polling loop.
    /// Returns the `JoinHandle` — drop or abort to stop.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!(target = %self.config.repo_path.display(), branch = %self.config.branch, "watcher started");

            let mut interval =
                tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                interval.tick().await;
                self.poll_once().await;
            }
        })
    }

    /// One poll cycle. Never propagates an error; the loop must always
    /// reschedule its next tick regardless of outcome.
    async fn poll_once(&self) {
        let Some(delta) = repo::detect_change(&self.git, &self.config.branch).await else {
            return;
        };

        info!(
            local = %short_id(&delta.local),
            remote = %short_id(&delta.remote),
            "change detected"
        );

        if let Err(e) = self.run_pipeline().await {
            error!("pipeline run failed: {e:#}");
        }
    }

    async fn run_pipeline(&self) -> Result<()> {
        sync::sync_to_remote(&self.git, &self.config.branch)
            .await
            .context("sync failed; aborting this cycle")?;

        let classification = DiffExtractor::new(&self.git)
            .extract()
            .await
            .context("could not extract last commit diff")?;

        let analyzer = ChunkedAnalyzer::new(self.backend.as_ref());
        let report_text = analyzer.analyze(&classification).await;
        info!("review report:\n{report_text}");

        let path = report::save_report(&self.config.reports_dir, &report_text)?;
        info!(path = %path.display(), "report saved");
        Ok(())
    }
}

fn short_id(commit: &str) -> &str {
    &commit[..commit.len().min(7)]
}
