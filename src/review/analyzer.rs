// SPDX-License-Identifier: MIT
//! Chunked analyzer — the core of the pipeline.
//!
//! Partitions a normalized diff into bounded windows, collects one
//! verdict per window from the inference backend, and aggregates the
//! non-trivial verdicts into a single report.

use tracing::{info, warn};

use crate::diff::model::DiffClassification;
use crate::diff::normalize::strip_removed_lines;

use super::backend::ReviewBackend;
use super::prompt::build_review_prompt;

/// Window size for one review request, in characters. Windows are not
/// aligned to line or hunk boundaries.
pub const CHUNK_SIZE: usize = 4000;

/// Divider between per-chunk findings in the aggregate report.
pub const CHUNK_DIVIDER: &str = "--- CHUNK ---";

/// Verdict token meaning "no issues in this chunk".
const PASS_TOKEN: &str = "PASS";

/// Canned report texts for the degenerate cases.
pub const MSG_MERGE: &str = "This is a merge commit; review skipped.";
pub const MSG_TOO_LARGE: &str = "Commit is too big to review.";
pub const MSG_NO_CHANGES: &str = "No changes found.";
pub const MSG_NOTHING_NEW: &str = "Nothing new to review.";
pub const MSG_NO_PROBLEMS: &str = "No problems found.";

/// Turns one classified diff into one aggregated review report.
pub struct ChunkedAnalyzer<'a> {
    backend: &'a dyn ReviewBackend,
}

impl<'a> ChunkedAnalyzer<'a> {
    pub fn new(backend: &'a dyn ReviewBackend) -> Self {
        Self { backend }
    }

    /// Produce the final report text for `diff`.
    ///
    /// Degenerate classifications and near-empty diffs short-circuit to
    /// a canned message without touching the backend. A failed chunk
    /// request is recorded inline and does not abort the remaining
    /// chunks.
    pub async fn analyze(&self, diff: &DiffClassification) -> String {
        let text = match diff {
            DiffClassification::Merge => return MSG_MERGE.to_string(),
            DiffClassification::TooLarge => return MSG_TOO_LARGE.to_string(),
            DiffClassification::Empty => return MSG_NO_CHANGES.to_string(),
            DiffClassification::Normal(text) => text,
        };

        if text.chars().count() < 10 {
            return MSG_NO_CHANGES.to_string();
        }

        let clean = strip_removed_lines(text);
        if clean.chars().count() < 20 {
            // Not worth a request.
            return MSG_NOTHING_NEW.to_string();
        }

        let chunks = chunk_windows(&clean, CHUNK_SIZE);
        info!(
            chars = clean.chars().count(),
            chunks = chunks.len(),
            "starting chunked analysis"
        );

        let mut aggregate = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            let prompt = build_review_prompt(chunk);
            match self.backend.review(&prompt).await {
                Ok(answer) => {
                    let verdict = answer.trim();
                    if verdict.is_empty() || verdict == PASS_TOKEN {
                        continue;
                    }
                    aggregate.push_str(&format!("\n{CHUNK_DIVIDER}\n{verdict}\n"));
                }
                Err(e) => {
                    warn!(chunk = i, err = %e, "chunk review failed");
                    aggregate.push_str(&format!("\nError: {e}"));
                }
            }
        }

        if aggregate.trim().is_empty() {
            return MSG_NO_PROBLEMS.to_string();
        }
        aggregate
    }
}

/// Partition `text` into sequential non-overlapping windows of at most
/// `size` characters, left to right from offset 0. Only the last window
/// may be shorter. Concatenating the windows reconstructs `text`.
pub fn chunk_windows(text: &str, size: usize) -> Vec<&str> {
    assert!(size > 0);
    let mut windows = Vec::new();
    let mut start = 0;
    let mut chars_in_window = 0;

    for (idx, _) in text.char_indices() {
        if chars_in_window == size {
            windows.push(&text[start..idx]);
            start = idx;
            chars_in_window = 0;
        }
        chars_in_window += 1;
    }
    if start < text.len() {
        windows.push(&text[start..]);
    }
    windows
}
