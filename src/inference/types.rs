//! Wire types for the Ollama chat API.

use serde::{Deserialize, Serialize};

use crate::chat::MessageRole;

/// `POST /api/chat` request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<RequestMessage<'a>>,
    pub stream: bool,
}

impl<'a> ChatRequest<'a> {
    /// A request carrying exactly one user message. No history is sent.
    pub fn single_turn(model: &'a str, prompt: &'a str, images: &'a [String]) -> Self {
        Self {
            model,
            messages: vec![RequestMessage {
                role: MessageRole::User,
                content: prompt,
                images,
            }],
            stream: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestMessage<'a> {
    pub role: MessageRole,
    pub content: &'a str,
    #[serde(skip_serializing_if = "no_images")]
    pub images: &'a [String],
}

fn no_images(images: &&[String]) -> bool {
    images.is_empty()
}

/// `POST /api/chat` response body (non-streaming).
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub message: Option<ResponseMessage>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    pub content: Option<String>,
}

/// `GET /api/tags` response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<ModelTag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelTag {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_without_images_omits_field() {
        let req = ChatRequest::single_turn("llava", "Hello", &[]);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(
            value,
            json!({
                "model": "llava",
                "stream": false,
                "messages": [{ "role": "user", "content": "Hello" }]
            })
        );
    }

    #[test]
    fn test_request_with_image() {
        let images = vec!["aGVsbG8=".to_string()];
        let req = ChatRequest::single_turn("llava", "", &images);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["messages"][0]["images"], json!(["aGVsbG8="]));
        assert_eq!(value["messages"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_response_parsing() {
        let resp: ChatResponse = serde_json::from_value(json!({
            "model": "llava",
            "created_at": "2024-01-01T00:00:00Z",
            "message": { "role": "assistant", "content": "Hi!" },
            "done": true
        }))
        .unwrap();
        assert_eq!(resp.message.unwrap().content.as_deref(), Some("Hi!"));
    }

    #[test]
    fn test_tags_parsing() {
        let tags: TagsResponse = serde_json::from_value(json!({
            "models": [{ "name": "llava:latest", "size": 1 }]
        }))
        .unwrap();
        assert_eq!(tags.models[0].name, "llava:latest");
    }
}
