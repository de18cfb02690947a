// SPDX-License-Identifier: MIT
//! Report persistence — one timestamped plain-text file per analyzed
//! commit.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

/// Write `text` to `{reports_dir}/report_<timestamp>.txt`, creating the
/// directory on demand. Returns the written path.
pub fn save_report(reports_dir: &Path, text: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(reports_dir)
        .with_context(|| format!("failed to create reports dir {}", reports_dir.display()))?;

    let name = format!("report_{}.txt", Local::now().format("%Y-%m-%d_%H-%M-%S"));
    let path = reports_dir.join(name);
    std::fs::write(&path, text)
        .with_context(|| format!("failed to write report {}", path.display()))?;
    Ok(path)
}
