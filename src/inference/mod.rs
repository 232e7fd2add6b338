//! Inference service client.
//!
//! Every call is single-turn: the prompt (plus any image payloads) of the
//! latest user message is sent on its own, with no prior transcript.
//! Failures are classified so the chat session can turn them into a
//! readable assistant entry.

mod client;
mod types;

use async_trait::async_trait;
use thiserror::Error;

pub use client::OllamaClient;
pub use types::{ChatRequest, ChatResponse, ModelTag, RequestMessage, ResponseMessage, TagsResponse};

/// Shown when any non-connectivity failure occurs.
pub const GENERIC_FAILURE: &str = "Sorry, something went wrong while generating a response.";

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Could not reach the inference service at {url}: {reason}")]
    Connectivity { url: String, reason: String },
    #[error("Inference service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Inference service reported an error: {0}")]
    Service(String),
    #[error("Malformed response from inference service: {0}")]
    Malformed(String),
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
}

impl InferenceError {
    /// Whether the service could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, InferenceError::Connectivity { .. })
    }

    /// Text of the assistant entry that replaces the missing reply.
    pub fn diagnostic(&self) -> String {
        match self {
            InferenceError::Connectivity { url, .. } => connectivity_diagnostic(url),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Diagnostic for an unreachable service.
pub fn connectivity_diagnostic(url: &str) -> String {
    format!(
        "Could not reach the inference service. Make sure it is running at {}.",
        url
    )
}

/// Reachability report from [`InferenceClient::probe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    pub url: String,
    pub model: String,
    pub model_available: bool,
    pub models: Vec<String>,
}

/// A chat-completion backend.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Model identifier used for every request.
    fn model(&self) -> &str;

    /// Send one prompt, optionally with base64 image payloads, and return the reply text.
    async fn send(&self, prompt: &str, images: &[String]) -> Result<String, InferenceError>;

    /// Check that the service is up and whether the model is installed.
    async fn probe(&self) -> Result<ServiceStatus, InferenceError>;
}
