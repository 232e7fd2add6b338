//! Interactive terminal front end: login prompts, the chat REPL and the
//! router between them.

pub mod commands;
pub mod login;
pub mod prompt;
pub mod repl;
pub mod runner;
pub mod shell;

pub use commands::{ChatCommand, COMMANDS};
pub use prompt::{create_line_editor, ChatCompleter, ChatHighlighter, ChatPrompt};
pub use repl::{run_chat, ChatExit, ChatView};
pub use runner::run;
pub use shell::{Shell, View};
