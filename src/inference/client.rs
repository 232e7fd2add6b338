//! HTTP client for a local Ollama server.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::types::{ChatRequest, ChatResponse, TagsResponse};
use super::{InferenceClient, InferenceError, ServiceStatus};

/// Only connecting is bounded; generation may legitimately take minutes.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest error body kept from a failed response.
const MAX_ERROR_BODY: usize = 200;

/// Client for the Ollama `/api/chat` endpoint.
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, model: &str) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("lochat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(InferenceError::Request)?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, err: reqwest::Error) -> InferenceError {
        if err.is_connect() {
            InferenceError::Connectivity {
                url: self.base_url.clone(),
                reason: err.to_string(),
            }
        } else if err.is_decode() {
            InferenceError::Malformed(err.to_string())
        } else {
            InferenceError::Request(err)
        }
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, InferenceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
            body.push_str("...");
        }
        Err(InferenceError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl InferenceClient for OllamaClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, prompt: &str, images: &[String]) -> Result<String, InferenceError> {
        let url = format!("{}/api/chat", self.base_url);
        let request = ChatRequest::single_turn(&self.model, prompt, images);

        info!(
            model = %self.model,
            prompt_len = prompt.len(),
            images = images.len(),
            "Sending chat request"
        );

        let response = self
            .http
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let response = Self::check_status(response).await?;

        let body: ChatResponse = response.json().await.map_err(|e| self.classify(e))?;
        if let Some(error) = body.error {
            warn!(error = %error, "Inference service returned an error body");
            return Err(InferenceError::Service(error));
        }

        let content = body
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| InferenceError::Malformed("missing message.content".to_string()))?;

        debug!(reply_len = content.len(), "Received reply");
        Ok(content)
    }

    async fn probe(&self) -> Result<ServiceStatus, InferenceError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let response = Self::check_status(response).await?;
        let tags: TagsResponse = response.json().await.map_err(|e| self.classify(e))?;

        let models: Vec<String> = tags.models.into_iter().map(|m| m.name).collect();
        let model_available = models.iter().any(|name| model_matches(name, &self.model));

        Ok(ServiceStatus {
            url: self.base_url.clone(),
            model: self.model.clone(),
            model_available,
            models,
        })
    }
}

/// `llava` matches `llava:latest` and `llava:13b`; a tagged name must match exactly.
fn model_matches(installed: &str, wanted: &str) -> bool {
    if installed == wanted {
        return true;
    }
    !wanted.contains(':') && installed.split(':').next() == Some(wanted)
}
