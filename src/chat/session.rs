//! An open chat session: transcript, pending attachment, and the send flow.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::{ChatMessage, Transcript};
use crate::attachments::{ingest, IngestOptions, OutgoingMessage, PendingAttachment};
use crate::inference::InferenceClient;

/// Receives view updates while a submission is processed.
#[async_trait]
pub trait SessionObserver: Send {
    /// Called after each append, with the whole transcript.
    fn transcript_changed(&mut self, transcript: &Transcript);

    /// A send is now outstanding.
    async fn loading_started(&mut self);

    /// The outstanding send resolved (success or failure).
    async fn loading_finished(&mut self);
}

/// What a call to [`ChatSession::submit`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to send: empty text and no attachment.
    Ignored,
    /// The attachment could not be read; one diagnostic entry was appended.
    AttachmentFailed,
    /// The reply was appended.
    Replied,
    /// The service failed; a diagnostic entry was appended.
    Failed,
}

/// State of one logged-in chat screen.
pub struct ChatSession {
    client: Arc<dyn InferenceClient>,
    transcript: Transcript,
    pending: Option<PendingAttachment>,
    loading: bool,
    options: IngestOptions,
}

impl ChatSession {
    pub fn new(client: Arc<dyn InferenceClient>, options: IngestOptions) -> Self {
        Self {
            client,
            transcript: Transcript::new(),
            pending: None,
            loading: false,
            options,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn pending_attachment(&self) -> Option<&PendingAttachment> {
        self.pending.as_ref()
    }

    /// Whether a send is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn client(&self) -> &Arc<dyn InferenceClient> {
        &self.client
    }

    /// Stage a file for the next message, replacing any previous one.
    pub fn attach(&mut self, attachment: PendingAttachment) -> Option<PendingAttachment> {
        debug!(file = %attachment.filename, media_type = %attachment.media_type, "Attachment staged");
        self.pending.replace(attachment)
    }

    pub fn detach(&mut self) -> Option<PendingAttachment> {
        self.pending.take()
    }

    /// Send the typed text (and staged attachment, if any).
    ///
    /// The user entry is always appended before its reply or diagnostic.
    /// The staged attachment is consumed whatever the outcome.
    pub async fn submit(&mut self, input: &str, view: &mut dyn SessionObserver) -> SubmitOutcome {
        if input.trim().is_empty() && self.pending.is_none() {
            return SubmitOutcome::Ignored;
        }

        let mut draft = OutgoingMessage::new(input);
        if let Some(attachment) = self.pending.take() {
            if let Err(e) = ingest(&attachment, &mut draft, self.options).await {
                warn!(error = %e, "Attachment could not be read, send aborted");
                self.append(ChatMessage::assistant(e.to_string()), view);
                return SubmitOutcome::AttachmentFailed;
            }
        }

        let message = draft.into_message();
        let prompt = message.content().to_string();
        let images = message.images().to_vec();
        self.append(message, view);

        self.loading = true;
        view.loading_started().await;
        let result = self.client.send(&prompt, &images).await;
        self.loading = false;
        view.loading_finished().await;

        match result {
            Ok(reply) => {
                info!(reply_len = reply.len(), "Reply appended");
                self.append(ChatMessage::assistant(reply), view);
                SubmitOutcome::Replied
            }
            Err(e) => {
                warn!(error = %e, connectivity = e.is_connectivity(), "Inference failed");
                self.append(ChatMessage::assistant(e.diagnostic()), view);
                SubmitOutcome::Failed
            }
        }
    }

    fn append(&mut self, message: ChatMessage, view: &mut dyn SessionObserver) {
        self.transcript.push(message);
        view.transcript_changed(&self.transcript);
    }
}
