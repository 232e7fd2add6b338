//! Chat transcript and session state.

mod message;
mod session;

pub use message::{ChatMessage, MessageRole, Transcript};
pub use session::{ChatSession, SessionObserver, SubmitOutcome};
