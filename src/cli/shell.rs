//! Screen routing: the login screen until authenticated, then chat.

use std::sync::Arc;

use tracing::info;

use crate::attachments::IngestOptions;
use crate::auth::CredentialGate;
use crate::chat::ChatSession;
use crate::inference::InferenceClient;

/// Which screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Chat,
}

enum ShellState {
    LoggedOut,
    LoggedIn(ChatSession),
}

/// Holds the authentication state and the chat session it gates.
///
/// The chat session exists only while logged in; logging out drops it,
/// so a new login always starts with an empty transcript.
pub struct Shell {
    gate: CredentialGate,
    client: Arc<dyn InferenceClient>,
    options: IngestOptions,
    state: ShellState,
}

impl Shell {
    pub fn new(gate: CredentialGate, client: Arc<dyn InferenceClient>, options: IngestOptions) -> Self {
        Self {
            gate,
            client,
            options,
            state: ShellState::LoggedOut,
        }
    }

    pub fn view(&self) -> View {
        match self.state {
            ShellState::LoggedOut => View::Login,
            ShellState::LoggedIn(_) => View::Chat,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, ShellState::LoggedIn(_))
    }

    /// Check the pair and open a fresh chat session on success.
    pub fn login(&mut self, username: &str, password: &str) -> bool {
        if self.is_authenticated() {
            return true;
        }
        if !self.gate.attempt_login(username, password) {
            return false;
        }
        self.state = ShellState::LoggedIn(ChatSession::new(Arc::clone(&self.client), self.options));
        true
    }

    pub fn logout(&mut self) {
        if let ShellState::LoggedIn(session) = &self.state {
            info!(entries = session.transcript().len(), "Logged out");
        }
        self.state = ShellState::LoggedOut;
    }

    /// The chat session, only while logged in.
    pub fn session_mut(&mut self) -> Option<&mut ChatSession> {
        match &mut self.state {
            ShellState::LoggedIn(session) => Some(session),
            ShellState::LoggedOut => None,
        }
    }
}
