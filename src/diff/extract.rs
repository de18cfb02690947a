//! Diff extractor — unified diff of the last commit, filtered, classified
//! and size-capped.

use tracing::{info, warn};

use crate::repo::{GitClient, GitError};

use super::model::{DiffClassification, PathFilterSet, CROP_MARKER, MAX_CHANGED_LINES, MAX_DIFF_CHARS};

/// Extracts the HEAD~1..HEAD diff for review.
pub struct DiffExtractor<'a> {
    git: &'a GitClient,
    filters: PathFilterSet,
}

impl<'a> DiffExtractor<'a> {
    pub fn new(git: &'a GitClient) -> Self {
        Self {
            git,
            filters: PathFilterSet::source_defaults(),
        }
    }

    /// Produce the classified diff of the most recent commit.
    ///
    /// Classification order: merge commit → oversized commit (by the
    /// shortstat line counts) → empty filtered diff → normal (cropped).
    /// A failing `git diff` is a hard error; a failing shortstat only
    /// loses the observability line and the size gate.
    pub async fn extract(&self) -> Result<DiffClassification, GitError> {
        let parents = self.git.head_parent_count().await?;
        if parents > 1 {
            return Ok(DiffClassification::Merge);
        }
        if parents == 0 {
            // Initial commit — no parent to diff against.
            return Ok(DiffClassification::Empty);
        }

        match self.git.last_commit_shortstat().await {
            Ok(stat) if !stat.is_empty() => {
                info!(stat = %stat, "last commit summary");
                if let Some(parsed) = ShortStat::parse(&stat) {
                    if parsed.insertions + parsed.deletions > MAX_CHANGED_LINES {
                        return Ok(DiffClassification::TooLarge);
                    }
                }
            }
            Ok(_) => {}
            Err(e) => warn!(err = %e, "shortstat unavailable"),
        }

        let pathspecs = self.filters.pathspecs();
        let mut args = vec!["diff", "HEAD~1", "HEAD", "--unified=0", "--"];
        args.extend(pathspecs.iter().map(|s| s.as_str()));

        let out = self.git.run_checked(&args).await?;
        let diff = out.stdout.trim();
        if diff.is_empty() {
            return Ok(DiffClassification::Empty);
        }

        Ok(DiffClassification::Normal(crop_diff(diff)))
    }
}

/// Cap a diff at [`MAX_DIFF_CHARS`] characters, appending the crop marker
/// when anything was cut.
pub fn crop_diff(diff: &str) -> String {
    match diff.char_indices().nth(MAX_DIFF_CHARS) {
        Some((idx, _)) => {
            warn!(chars = diff.chars().count(), "diff too long; cropping");
            let mut cropped = diff[..idx].to_string();
            cropped.push('\n');
            cropped.push_str(CROP_MARKER);
            cropped
        }
        None => diff.to_string(),
    }
}

// ─── Shortstat parsing ────────────────────────────────────────────────────────

/// Parsed `git diff --shortstat` line.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ShortStat {
    pub files_changed: u64,
    pub insertions: u64,
    pub deletions: u64,
}

impl ShortStat {
    /// Parse a line like
    /// `" 3 files changed, 10 insertions(+), 2 deletions(-)"`.
    /// Insertions or deletions may be absent.
    pub fn parse(line: &str) -> Option<Self> {
        let mut stat = ShortStat::default();
        let mut seen_files = false;

        for part in line.split(',') {
            let mut words = part.split_whitespace();
            let n: u64 = words.next()?.parse().ok()?;
            let unit = words.next()?;
            if unit.starts_with("file") {
                stat.files_changed = n;
                seen_files = true;
            } else if unit.starts_with("insertion") {
                stat.insertions = n;
            } else if unit.starts_with("deletion") {
                stat.deletions = n;
            }
        }

        seen_files.then_some(stat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_shortstat() {
        let stat = ShortStat::parse("3 files changed, 10 insertions(+), 2 deletions(-)").unwrap();
        assert_eq!(
            stat,
            ShortStat {
                files_changed: 3,
                insertions: 10,
                deletions: 2
            }
        );
    }

    #[test]
    fn parses_insertions_only() {
        let stat = ShortStat::parse("1 file changed, 5 insertions(+)").unwrap();
        assert_eq!(stat.files_changed, 1);
        assert_eq!(stat.insertions, 5);
        assert_eq!(stat.deletions, 0);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(ShortStat::parse("not a shortstat"), None);
        assert_eq!(ShortStat::parse(""), None);
    }

    #[test]
    fn crop_is_exact() {
        let long: String = "x".repeat(MAX_DIFF_CHARS + 500);
        let cropped = crop_diff(&long);
        assert!(cropped.ends_with(CROP_MARKER));
        let body = cropped.strip_suffix(CROP_MARKER).unwrap();
        let body = body.strip_suffix('\n').unwrap();
        assert_eq!(body.chars().count(), MAX_DIFF_CHARS);
    }

    #[test]
    fn crop_leaves_short_diffs_alone() {
        let short = "diff --git a/x b/x\n+added";
        assert_eq!(crop_diff(short), short);
    }

    #[test]
    fn crop_respects_char_boundaries() {
        // Multibyte content must not panic or split a char.
        let long: String = "é".repeat(MAX_DIFF_CHARS + 10);
        let cropped = crop_diff(&long);
        assert!(cropped.ends_with(CROP_MARKER));
    }
}
