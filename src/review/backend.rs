// SPDX-License-Identifier: MIT
//! Inference backend client.
//!
//! The backend is an Ollama-style generate endpoint: a synchronous POST
//! returning a single non-streamed completion. Its internals are opaque;
//! only the wire contract lives here. `ReviewBackend` is the seam the
//! analyzer is tested through.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Per-request timeout. Local models can be slow on big prompts; this
/// bounds the otherwise-unbounded blocking call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Threads requested from the backend for each completion.
const NUM_THREADS: u32 = 3;

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    num_thread: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request to inference backend failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("inference backend returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

// ─── ReviewBackend ────────────────────────────────────────────────────────────

/// One review request: prompt in, free-text verdict out.
#[async_trait]
pub trait ReviewBackend: Send + Sync {
    async fn review(&self, prompt: &str) -> Result<String, BackendError>;
}

/// HTTP client for a local Ollama-style generate endpoint.
pub struct OllamaBackend {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaBackend {
    pub fn new(url: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl ReviewBackend for OllamaBackend {
    async fn review(&self, prompt: &str) -> Result<String, BackendError> {
        debug!(url = %self.url, model = %self.model, prompt_len = prompt.len(), "sending review request");

        let resp = self
            .client
            .post(&self.url)
            .json(&GenerateRequest {
                model: &self.model,
                prompt,
                stream: false,
                options: GenerateOptions {
                    num_thread: NUM_THREADS,
                },
            })
            .send()
            .await?;

        if resp.status() != reqwest::StatusCode::OK {
            return Err(BackendError::Status(resp.status()));
        }

        let body: GenerateResponse = resp.json().await?;
        Ok(body.response)
    }
}
