//! Lochat Library
//!
//! A login-gated terminal chat client for a local Ollama server.
//!
//! ## Main Components
//!
//! - [`auth`] - Credential gate for the login screen
//! - [`chat`] - Transcript and the chat session send flow
//! - [`attachments`] - Turning a selected file into image payloads or inlined text
//! - [`inference`] - HTTP client for the inference service
//! - [`messaging`] - Transcript rendering and the loading spinner
//! - [`cli`] - Login prompts, chat REPL and the screen router
//! - [`config`] - Configuration and settings management
//!
//! ## Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use lochat::{ChatSession, IngestOptions, OllamaClient};
//!
//! let client = OllamaClient::new("http://localhost:11434", "llava")?;
//! let mut session = ChatSession::new(Arc::new(client), IngestOptions::default());
//! session.submit("Describe this picture", &mut view).await;
//! ```

pub mod attachments;
pub mod auth;
pub mod chat;
pub mod cli;
pub mod config;
pub mod inference;
pub mod messaging;

// Re-export commonly used types
pub use attachments::{ingest, AttachmentError, IngestOptions, OutgoingMessage, PendingAttachment};
pub use auth::{CredentialGate, INVALID_CREDENTIALS};
pub use chat::{ChatMessage, ChatSession, MessageRole, SessionObserver, SubmitOutcome, Transcript};
pub use cli::{Shell, View};
pub use config::{ConfigError, Credentials, Overrides, Settings, XdgDirs};
pub use inference::{InferenceClient, InferenceError, OllamaClient, ServiceStatus};
pub use messaging::{MessageLevel, Spinner, SpinnerHandle, TranscriptRenderer};
