//! Analyzer tests against scripted stub backends; no live model needed.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reviewd::diff::model::DiffClassification;
use reviewd::review::analyzer::{
    ChunkedAnalyzer, CHUNK_DIVIDER, MSG_MERGE, MSG_NOTHING_NEW, MSG_NO_CHANGES, MSG_NO_PROBLEMS,
    MSG_TOO_LARGE,
};
use reviewd::review::{BackendError, ReviewBackend};

/// Replays a scripted list of replies and records every prompt it saw.
/// Once the script is exhausted it answers "PASS".
struct StubBackend {
    replies: Mutex<VecDeque<Result<String, BackendError>>>,
    prompts: Mutex<Vec<String>>,
}

impl StubBackend {
    fn new(replies: Vec<Result<String, BackendError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn always_pass() -> Self {
        Self::new(Vec::new())
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReviewBackend for StubBackend {
    async fn review(&self, prompt: &str) -> Result<String, BackendError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("PASS".to_string()))
    }
}

fn http_error() -> BackendError {
    BackendError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)
}

/// A reviewable diff whose normalized form is comfortably above the
/// trivial-content threshold.
fn normal_diff(extra_added_lines: usize) -> DiffClassification {
    let mut diff = String::from(
        "diff --git a/Main.java b/Main.java\nindex 111..222 100644\n@@ -1,2 +10,3 @@\n+++ b/Main.java\n",
    );
    for i in 0..extra_added_lines {
        diff.push_str(&format!("+int field{i} = {i};\n"));
    }
    DiffClassification::Normal(diff)
}

#[tokio::test]
async fn all_pass_verdicts_give_canned_no_problem_message() {
    let backend = StubBackend::always_pass();
    let report = ChunkedAnalyzer::new(&backend).analyze(&normal_diff(5)).await;

    assert_eq!(report, MSG_NO_PROBLEMS);
    assert_eq!(backend.prompts().len(), 1);
}

#[tokio::test]
async fn findings_are_aggregated_with_dividers() {
    let backend = StubBackend::new(vec![Ok(
        "Main.java:\n- Hardcoded password on line 3".to_string()
    )]);
    let report = ChunkedAnalyzer::new(&backend).analyze(&normal_diff(5)).await;

    assert!(report.contains(CHUNK_DIVIDER));
    assert!(report.contains("Hardcoded password on line 3"));
}

#[tokio::test]
async fn failed_chunk_is_recorded_inline_and_does_not_abort() {
    // First chunk fails, second chunk still reaches the backend.
    let backend = StubBackend::new(vec![
        Err(http_error()),
        Ok("Main.java:\n- Empty catch block".to_string()),
    ]);
    // ~230 added lines → several 4000-char chunks.
    let report = ChunkedAnalyzer::new(&backend).analyze(&normal_diff(230)).await;

    assert!(report.contains("Error: "));
    assert!(report.contains("Empty catch block"));
    assert!(backend.prompts().len() >= 2);
}

#[tokio::test]
async fn degenerate_classifications_never_touch_the_backend() {
    let backend = StubBackend::always_pass();
    let analyzer = ChunkedAnalyzer::new(&backend);

    assert_eq!(analyzer.analyze(&DiffClassification::Merge).await, MSG_MERGE);
    assert_eq!(
        analyzer.analyze(&DiffClassification::TooLarge).await,
        MSG_TOO_LARGE
    );
    assert_eq!(
        analyzer.analyze(&DiffClassification::Empty).await,
        MSG_NO_CHANGES
    );
    assert!(backend.prompts().is_empty());
}

#[tokio::test]
async fn empty_or_near_empty_diff_is_no_changes() {
    let backend = StubBackend::always_pass();
    let analyzer = ChunkedAnalyzer::new(&backend);

    let empty = DiffClassification::Normal(String::new());
    assert_eq!(analyzer.analyze(&empty).await, MSG_NO_CHANGES);

    let tiny = DiffClassification::Normal("+x = 1".to_string());
    assert_eq!(analyzer.analyze(&tiny).await, MSG_NO_CHANGES);

    assert!(backend.prompts().is_empty());
}

#[tokio::test]
async fn diff_that_normalizes_to_nothing_is_not_sent() {
    // Long enough raw, but everything is removed-content noise.
    let raw = "--- a/Old.java\n-gone one\n-gone two\n-gone three\n-gone four\n".to_string();
    let backend = StubBackend::always_pass();
    let report = ChunkedAnalyzer::new(&backend)
        .analyze(&DiffClassification::Normal(raw))
        .await;

    assert_eq!(report, MSG_NOTHING_NEW);
    assert!(backend.prompts().is_empty());
}

#[tokio::test]
async fn chunks_seen_by_the_backend_reconstruct_the_normalized_diff() {
    let backend = StubBackend::always_pass();
    let diff = normal_diff(400);
    ChunkedAnalyzer::new(&backend).analyze(&diff).await;

    let prompts = backend.prompts();
    assert!(prompts.len() > 1, "expected a multi-chunk diff");

    let marker = "CODE DIFF TO ANALYZE:\n";
    let reassembled: String = prompts
        .iter()
        .map(|p| {
            let at = p.find(marker).expect("prompt carries the diff marker");
            &p[at + marker.len()..]
        })
        .collect();

    let DiffClassification::Normal(raw) = &diff else {
        unreachable!()
    };
    let normalized = reviewd::diff::normalize::strip_removed_lines(raw);
    assert_eq!(reassembled, normalized);
}
