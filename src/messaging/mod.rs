//! Terminal output for the chat screen.
//!
//! - [`TranscriptRenderer`] prints transcript entries (with markdown) as the
//!   transcript grows, plus one-off notices
//! - [`Spinner`] is the pending-response indicator drawn while a reply is
//!   outstanding

mod renderer;
mod spinner;
mod types;

pub use renderer::TranscriptRenderer;
pub use spinner::{Spinner, SpinnerHandle};
pub use types::MessageLevel;
