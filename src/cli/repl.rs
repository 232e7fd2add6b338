//! Chat screen loop.

use std::future::Future;

use async_trait::async_trait;
use reedline::Signal;
use tracing::{debug, warn};

use super::commands::{self, ChatCommand};
use super::prompt::{create_line_editor, ChatPrompt};
use crate::attachments::PendingAttachment;
use crate::chat::{ChatSession, SessionObserver, Transcript};
use crate::messaging::{MessageLevel, Spinner, SpinnerHandle, TranscriptRenderer};

/// Why the chat screen was left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatExit {
    Logout,
    Quit,
}

/// Terminal side of a chat session: the transcript printer and the spinner.
pub struct ChatView {
    renderer: TranscriptRenderer,
    spinner: Option<SpinnerHandle>,
    model: String,
}

impl ChatView {
    pub fn new(model: &str) -> Self {
        Self {
            renderer: TranscriptRenderer::new(),
            spinner: None,
            model: model.to_string(),
        }
    }

    pub fn notice(&mut self, level: MessageLevel, text: &str) {
        if let Err(e) = self.renderer.render_notice(level, text) {
            warn!(error = %e, "Failed to print notice");
        }
    }

    fn clear_screen(&mut self) {
        if let Err(e) = self.renderer.clear_screen() {
            warn!(error = %e, "Failed to clear screen");
        }
    }
}

#[async_trait]
impl SessionObserver for ChatView {
    fn transcript_changed(&mut self, transcript: &Transcript) {
        if let Err(e) = self.renderer.sync(transcript) {
            warn!(error = %e, "Failed to render transcript");
        }
    }

    async fn loading_started(&mut self) {
        let handle = Spinner::start(format!("Waiting for {}...", self.model));
        if let Some(previous) = self.spinner.replace(handle) {
            previous.stop().await;
        }
    }

    async fn loading_finished(&mut self) {
        if let Some(handle) = self.spinner.take() {
            handle.stop().await;
        }
    }
}

/// Read and handle chat input until the user logs out or quits.
pub async fn run_chat(session: &mut ChatSession) -> ChatExit {
    let model = session.client().model().to_string();
    let mut view = ChatView::new(&model);
    let mut line_editor = create_line_editor();

    loop {
        let prompt = ChatPrompt::with_attachment(
            &model,
            session.pending_attachment().map(|a| a.filename.as_str()),
        );

        match line_editor.read_line(&prompt) {
            Ok(Signal::Success(line)) => {
                if let Some(exit) = handle_input(session, &mut view, line.trim()).await {
                    return exit;
                }
            }
            Ok(Signal::CtrlC) => {
                println!("^C");
                continue;
            }
            Ok(Signal::CtrlD) => return ChatExit::Quit,
            Err(err) => {
                view.notice(MessageLevel::Error, &format!("Readline error: {}", err));
                return ChatExit::Quit;
            }
        }
    }
}

async fn handle_input(
    session: &mut ChatSession,
    view: &mut ChatView,
    input: &str,
) -> Option<ChatExit> {
    match commands::parse(input) {
        ChatCommand::Submit(text) => {
            return submit_or_interrupt(session, view, text, interrupted()).await;
        }
        ChatCommand::Attach("") => {
            view.notice(MessageLevel::Warning, "Usage: /attach <path>");
        }
        ChatCommand::Attach(path) => attach(session, view, path),
        ChatCommand::Detach => match session.detach() {
            Some(old) => view.notice(MessageLevel::Success, &format!("Removed {}", old.filename)),
            None => view.notice(MessageLevel::Info, "No file attached"),
        },
        ChatCommand::Clear => view.clear_screen(),
        ChatCommand::Status => status(session, view).await,
        ChatCommand::Help => commands::show_help(),
        ChatCommand::Logout => return Some(ChatExit::Logout),
        ChatCommand::Exit => return Some(ChatExit::Quit),
    }
    None
}

/// Send a message, or quit if `interrupt` fires first.
///
/// On interrupt the outstanding request is abandoned along with the
/// process; only the loading indicator is torn down, restoring the cursor.
async fn submit_or_interrupt(
    session: &mut ChatSession,
    view: &mut dyn SessionObserver,
    text: &str,
    interrupt: impl Future<Output = ()>,
) -> Option<ChatExit> {
    tokio::select! {
        biased;
        outcome = session.submit(text, &mut *view) => {
            debug!(?outcome, "Submission handled");
            None
        }
        _ = interrupt => {
            warn!("Interrupted while waiting for a reply");
            view.loading_finished().await;
            Some(ChatExit::Quit)
        }
    }
}

/// Completes on Ctrl-C. Used while a request is outstanding, when the line
/// editor is not reading keys and SIGINT would otherwise kill the process
/// with the cursor hidden.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

fn attach(session: &mut ChatSession, view: &mut ChatView, path: &str) {
    let expanded = shellexpand::tilde(path);
    match PendingAttachment::from_path(expanded.into_owned()) {
        Ok(attachment) => {
            let label = format!("Attached {} ({})", attachment.filename, attachment.media_type);
            if let Some(old) = session.attach(attachment) {
                view.notice(MessageLevel::Info, &format!("Replaced {}", old.filename));
            }
            view.notice(MessageLevel::Success, &label);
        }
        Err(e) => view.notice(MessageLevel::Error, &e.to_string()),
    }
}

async fn status(session: &ChatSession, view: &mut ChatView) {
    match session.client().probe().await {
        Ok(status) if status.model_available => view.notice(
            MessageLevel::Success,
            &format!(
                "Inference service is up at {}; model {} is available",
                status.url, status.model
            ),
        ),
        Ok(status) => {
            let installed = if status.models.is_empty() {
                "none".to_string()
            } else {
                status.models.join(", ")
            };
            view.notice(
                MessageLevel::Warning,
                &format!(
                    "Inference service is up at {}, but model {} is not installed (installed: {})",
                    status.url, status.model, installed
                ),
            );
        }
        Err(e) if e.is_connectivity() => view.notice(MessageLevel::Error, &e.diagnostic()),
        Err(e) => view.notice(MessageLevel::Error, &e.to_string()),
    }
}
