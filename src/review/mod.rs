// SPDX-License-Identifier: MIT
//! Chunked AI review: backend client, prompt, analyzer, report output.

pub mod analyzer;
pub mod backend;
pub mod prompt;
pub mod report;

pub use analyzer::ChunkedAnalyzer;
pub use backend::{BackendError, OllamaBackend, ReviewBackend};
