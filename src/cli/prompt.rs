//! Reedline prompt, completion and highlighting for the chat screen.
//!
//! Type "/" then Tab to see commands. `/attach ` followed by Tab completes
//! file paths.

use nu_ansi_term::{Color, Style};
use reedline::{
    ColumnarMenu, Completer, Emacs, Highlighter, KeyCode, KeyModifiers, MenuBuilder, Prompt,
    PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus, Reedline, ReedlineEvent,
    ReedlineMenu, Span, StyledText, Suggestion,
};
use std::borrow::Cow;
use std::path::Path;

use super::commands::{command_name, COMMANDS};

const ATTACH_PREFIX: &str = "/attach ";

/// Completer for chat commands and attachment paths.
#[derive(Clone, Default)]
pub struct ChatCompleter;

impl ChatCompleter {
    pub fn new() -> Self {
        Self
    }
}

impl Completer for ChatCompleter {
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        if pos > line.len() || !line.is_char_boundary(pos) {
            return Vec::new();
        }

        let input = &line[..pos];

        if input.is_empty() || !input.starts_with('/') {
            return Vec::new();
        }

        // Command completion (no space yet)
        if !input.contains(' ') {
            let prefix = input.to_lowercase();
            return COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(&prefix))
                .map(|(cmd, desc)| Suggestion {
                    value: cmd.to_string(),
                    description: Some(desc.to_string()),
                    extra: None,
                    span: Span::new(0, pos),
                    append_whitespace: true,
                    style: None,
                })
                .collect();
        }

        if let Some(partial) = input.strip_prefix(ATTACH_PREFIX) {
            let start = ATTACH_PREFIX.len();
            return complete_path(partial)
                .into_iter()
                .take(20)
                .map(|(value, is_dir)| Suggestion {
                    value,
                    description: is_dir.then(|| "directory".to_string()),
                    extra: None,
                    span: Span::new(start, pos),
                    append_whitespace: !is_dir,
                    style: None,
                })
                .collect();
        }

        Vec::new()
    }
}

/// Entries matching a partially typed path, as `(completed text, is_dir)`.
///
/// The typed directory part is kept verbatim so `~/` stays `~/`.
fn complete_path(partial: &str) -> Vec<(String, bool)> {
    let (dir_part, name_prefix) = match partial.rfind('/') {
        Some(idx) => (&partial[..=idx], &partial[idx + 1..]),
        None => ("", partial),
    };

    let lookup_dir = if dir_part.is_empty() {
        ".".to_string()
    } else {
        shellexpand::tilde(dir_part).into_owned()
    };

    let Ok(entries) = std::fs::read_dir(Path::new(&lookup_dir)) else {
        return Vec::new();
    };

    let show_hidden = name_prefix.starts_with('.');
    let mut matches: Vec<(String, bool)> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(name_prefix) || (!show_hidden && name.starts_with('.')) {
                return None;
            }
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let value = if is_dir {
                format!("{}{}/", dir_part, name)
            } else {
                format!("{}{}", dir_part, name)
            };
            Some((value, is_dir))
        })
        .collect();

    matches.sort();
    matches
}

/// Chat prompt showing the model and any staged attachment.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    pub model: String,
    pub attachment: Option<String>,
}

impl ChatPrompt {
    pub fn with_attachment(model: &str, attachment: Option<&str>) -> Self {
        Self {
            model: model.to_string(),
            attachment: attachment.map(str::to_string),
        }
    }
}

impl Prompt for ChatPrompt {
    fn render_prompt_left(&self) -> Cow<'_, str> {
        match &self.attachment {
            Some(name) => Cow::Owned(format!(
                "\x1b[1;33m{}\x1b[0m \x1b[35m[📎 {}]\x1b[0m",
                self.model, name
            )),
            None => Cow::Owned(format!("\x1b[1;33m{}\x1b[0m", self.model)),
        }
    }

    fn render_prompt_right(&self) -> Cow<'_, str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _mode: PromptEditMode) -> Cow<'_, str> {
        Cow::Borrowed(" › ")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<'_, str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(&self, hs: PromptHistorySearch) -> Cow<'_, str> {
        let prefix = match hs.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };
        Cow::Owned(format!("({}search: {}) ", prefix, hs.term))
    }
}

/// Highlights a leading command word. Anything else is a plain message.
#[derive(Clone)]
pub struct ChatHighlighter;

impl Highlighter for ChatHighlighter {
    fn highlight(&self, line: &str, _cursor: usize) -> StyledText {
        let mut styled = StyledText::new();

        let cmd_end = line.find(char::is_whitespace).unwrap_or(line.len());
        let cmd = &line[..cmd_end];

        if command_name(cmd).is_some() {
            styled.push((Style::new().fg(Color::Cyan).bold(), cmd.to_string()));
            if cmd_end < line.len() {
                styled.push((Style::default(), line[cmd_end..].to_string()));
            }
        } else {
            styled.push((Style::default(), line.to_string()));
        }

        styled
    }
}

/// Line editor with a Tab-triggered completion menu and in-memory history.
pub fn create_line_editor() -> Reedline {
    let completion_menu = Box::new(
        ColumnarMenu::default()
            .with_name("completion_menu")
            .with_columns(1)
            .with_column_padding(2)
            .with_text_style(Style::new().fg(Color::Default))
            .with_selected_text_style(Style::new().fg(Color::Black).on(Color::Cyan))
            .with_description_text_style(Style::new().fg(Color::DarkGray)),
    );

    let mut keybindings = reedline::default_emacs_keybindings();

    keybindings.add_binding(
        KeyModifiers::NONE,
        KeyCode::Tab,
        ReedlineEvent::UntilFound(vec![
            ReedlineEvent::Menu("completion_menu".to_string()),
            ReedlineEvent::MenuNext,
        ]),
    );

    keybindings.add_binding(
        KeyModifiers::SHIFT,
        KeyCode::BackTab,
        ReedlineEvent::MenuPrevious,
    );

    Reedline::create()
        .with_completer(Box::new(ChatCompleter::new()))
        .with_menu(ReedlineMenu::EngineCompleter(completion_menu))
        .with_quick_completions(true)
        .with_partial_completions(true)
        .with_highlighter(Box::new(ChatHighlighter))
        .with_edit_mode(Box::new(Emacs::new(keybindings)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_command_completion() {
        let mut completer = ChatCompleter::new();
        let values: Vec<String> = completer
            .complete("/de", 3)
            .into_iter()
            .map(|s| s.value)
            .collect();
        assert_eq!(values, vec!["/detach"]);

        let all = completer.complete("/", 1);
        assert_eq!(all.len(), COMMANDS.len());
    }

    #[test]
    fn test_plain_text_has_no_completions() {
        let mut completer = ChatCompleter::new();
        assert!(completer.complete("hello", 5).is_empty());
        assert!(completer.complete("", 0).is_empty());
    }

    #[test]
    fn test_attach_path_completion() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("cat.png"), b"png").unwrap();
        fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        fs::write(dir.path().join(".hidden"), b"x").unwrap();
        fs::create_dir(dir.path().join("cards")).unwrap();

        let base = format!("{}/", dir.path().display());
        let line = format!("/attach {}ca", base);
        let mut completer = ChatCompleter::new();
        let suggestions = completer.complete(&line, line.len());

        let values: Vec<&str> = suggestions.iter().map(|s| s.value.as_str()).collect();
        assert_eq!(
            values,
            vec![format!("{}cards/", base), format!("{}cat.png", base)]
        );
        assert_eq!(suggestions[0].span.start, ATTACH_PREFIX.len());
        assert!(!suggestions[0].append_whitespace);
        assert!(suggestions[1].append_whitespace);
    }

    #[test]
    fn test_hidden_files_only_on_dot_prefix() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".hidden"), b"x").unwrap();
        fs::write(dir.path().join("shown"), b"x").unwrap();
        let base = format!("{}/", dir.path().display());

        let names: Vec<String> = complete_path(&base).into_iter().map(|(v, _)| v).collect();
        assert_eq!(names, vec![format!("{}shown", base)]);

        let dotted: Vec<String> = complete_path(&format!("{}.", base))
            .into_iter()
            .map(|(v, _)| v)
            .collect();
        assert_eq!(dotted, vec![format!("{}.hidden", base)]);
    }

    #[test]
    fn test_missing_directory_completes_nothing() {
        assert!(complete_path("/definitely/not/here/x").is_empty());
    }

    #[test]
    fn test_prompt_shows_attachment() {
        let prompt = ChatPrompt::with_attachment("llava", Some("cat.png"));
        let left = prompt.render_prompt_left();
        assert!(left.contains("llava"));
        assert!(left.contains("cat.png"));

        let bare = ChatPrompt::with_attachment("llava", None);
        assert!(!bare.render_prompt_left().contains('📎'));
    }

    #[test]
    fn test_highlighter_marks_only_known_commands() {
        let highlighter = ChatHighlighter;
        let known = highlighter.highlight("/attach file.txt", 0);
        assert_eq!(known.buffer.len(), 2);
        assert_eq!(known.buffer[0].0, Style::new().fg(Color::Cyan).bold());

        let alias = highlighter.highlight("/Q", 0);
        assert_eq!(alias.buffer[0].0, Style::new().fg(Color::Cyan).bold());

        let message = highlighter.highlight("/usr/bin/python crashes", 0);
        assert_eq!(message.buffer.len(), 1);
        assert_eq!(message.buffer[0].0, Style::default());
    }
}
