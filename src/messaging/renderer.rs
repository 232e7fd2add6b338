//! Terminal renderer for the chat transcript with markdown support.

use crossterm::{
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{Clear, ClearType},
    ExecutableCommand,
};
use std::io::{stdout, Stdout, Write};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::{as_24_bit_terminal_escaped, LinesWithEndings};

use super::MessageLevel;
use crate::chat::{ChatMessage, MessageRole, Transcript};

const USER_COLOR: Color = Color::Yellow;
const ASSISTANT_COLOR: Color = Color::Magenta;

/// Renders transcript entries as they are appended.
///
/// The renderer owns no messages. It only remembers how many entries of the
/// transcript it has already printed, so [`sync`](Self::sync) prints exactly
/// the new tail each time the transcript grows.
pub struct TranscriptRenderer<W: Write = Stdout> {
    out: W,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    rendered: usize,
}

impl TranscriptRenderer<Stdout> {
    /// Create a renderer writing to stdout.
    pub fn new() -> Self {
        Self::with_writer(stdout())
    }
}

impl Default for TranscriptRenderer<Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> TranscriptRenderer<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            rendered: 0,
        }
    }

    /// Number of transcript entries already printed.
    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Print every entry appended since the last call.
    pub fn sync(&mut self, transcript: &Transcript) -> std::io::Result<()> {
        if transcript.len() < self.rendered {
            // A different (fresh) transcript; start over.
            self.rendered = 0;
        }
        for message in &transcript.messages()[self.rendered..] {
            self.render_message(message)?;
            self.rendered += 1;
        }
        self.out.flush()
    }

    /// Render one transcript entry: header, image markers, then markdown body.
    pub fn render_message(&mut self, message: &ChatMessage) -> std::io::Result<()> {
        let (label, color) = match message.role() {
            MessageRole::User => ("You", USER_COLOR),
            MessageRole::Assistant => ("Assistant", ASSISTANT_COLOR),
        };

        self.out
            .execute(Print("\n"))?
            .execute(SetForegroundColor(color))?
            .execute(SetAttribute(Attribute::Bold))?
            .execute(Print(label))?
            .execute(Print(":"))?
            .execute(SetAttribute(Attribute::Reset))?
            .execute(ResetColor)?
            .execute(Print("\n"))?;

        for (idx, image) in message.images().iter().enumerate() {
            self.out
                .execute(SetForegroundColor(Color::DarkCyan))?
                .execute(Print(format!(
                    "[image {}: {}]\n",
                    idx + 1,
                    format_size(decoded_len(image))
                )))?
                .execute(ResetColor)?;
        }

        if !message.content().is_empty() {
            self.render_markdown(message.content())?;
        }
        Ok(())
    }

    /// Print a status line outside the transcript (command feedback, notices).
    pub fn render_notice(&mut self, level: MessageLevel, text: &str) -> std::io::Result<()> {
        let color = match level {
            MessageLevel::Info => Color::White,
            MessageLevel::Success => Color::Green,
            MessageLevel::Warning => Color::Yellow,
            MessageLevel::Error => Color::Red,
        };

        let prefix = match level {
            MessageLevel::Success => "✓ ",
            MessageLevel::Warning => "⚠ ",
            MessageLevel::Error => "✗ ",
            MessageLevel::Info => "",
        };

        self.out
            .execute(SetForegroundColor(color))?
            .execute(Print(prefix))?
            .execute(Print(text))?
            .execute(Print("\n"))?
            .execute(ResetColor)?;

        Ok(())
    }

    pub fn clear_screen(&mut self) -> std::io::Result<()> {
        self.out
            .execute(Clear(ClearType::All))?
            .execute(crossterm::cursor::MoveTo(0, 0))?;
        Ok(())
    }

    /// Render markdown content with proper formatting.
    pub fn render_markdown(&mut self, content: &str) -> std::io::Result<()> {
        let mut in_code_block = false;
        let mut code_lang = String::new();
        let mut code_buffer = String::new();

        for line in content.lines() {
            if let Some(rest) = line.strip_prefix("```") {
                if in_code_block {
                    self.render_code_block(&code_lang, &code_buffer)?;
                    code_buffer.clear();
                    code_lang.clear();
                    in_code_block = false;
                } else {
                    in_code_block = true;
                    code_lang = rest.trim().to_string();
                }
            } else if in_code_block {
                code_buffer.push_str(line);
                code_buffer.push('\n');
            } else {
                self.render_markdown_line(line)?;
            }
        }

        // Unclosed code block
        if in_code_block && !code_buffer.is_empty() {
            self.render_code_block(&code_lang, &code_buffer)?;
        }

        Ok(())
    }

    /// Render a single line of markdown.
    fn render_markdown_line(&mut self, line: &str) -> std::io::Result<()> {
        let header = line
            .strip_prefix("### ")
            .or_else(|| line.strip_prefix("## "))
            .or_else(|| line.strip_prefix("# "));
        if let Some(rest) = header {
            self.out
                .execute(SetForegroundColor(Color::Cyan))?
                .execute(SetAttribute(Attribute::Bold))?
                .execute(Print(rest))?
                .execute(SetAttribute(Attribute::Reset))?
                .execute(ResetColor)?
                .execute(Print("\n"))?;
            return Ok(());
        }

        if let Some(rest) = line.strip_prefix("- ").or_else(|| line.strip_prefix("* ")) {
            self.out
                .execute(SetForegroundColor(Color::Yellow))?
                .execute(Print("• "))?
                .execute(ResetColor)?;
            self.render_inline_markdown(rest)?;
            self.out.execute(Print("\n"))?;
            return Ok(());
        }

        let digits: String = line.chars().take_while(|c| c.is_ascii_digit()).collect();
        if !digits.is_empty() {
            if let Some(rest) = line[digits.len()..].strip_prefix(". ") {
                self.out
                    .execute(SetForegroundColor(Color::Yellow))?
                    .execute(Print(format!("{}. ", digits)))?
                    .execute(ResetColor)?;
                self.render_inline_markdown(rest)?;
                self.out.execute(Print("\n"))?;
                return Ok(());
            }
        }

        if let Some(rest) = line.strip_prefix("> ") {
            self.out
                .execute(SetForegroundColor(Color::DarkGrey))?
                .execute(Print("│ "))?
                .execute(ResetColor)?;
            self.render_inline_markdown(rest)?;
            self.out.execute(Print("\n"))?;
            return Ok(());
        }

        if line == "---" || line == "***" || line == "___" {
            self.out
                .execute(SetForegroundColor(Color::DarkGrey))?
                .execute(Print("─".repeat(40)))?
                .execute(ResetColor)?
                .execute(Print("\n"))?;
            return Ok(());
        }

        self.render_inline_markdown(line)?;
        self.out.execute(Print("\n"))?;
        Ok(())
    }

    /// Render inline markdown (bold, italic, code, links).
    ///
    /// Delimiters without a closing partner, and `_` inside a word, are
    /// printed as-is.
    fn render_inline_markdown(&mut self, text: &str) -> std::io::Result<()> {
        let chars: Vec<char> = text.chars().collect();
        let mut buffer = String::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            match c {
                '`' => match find_from(&chars, i + 1, &['`']) {
                    Some(close) => {
                        self.flush_plain(&mut buffer)?;
                        let code: String = chars[i + 1..close].iter().collect();
                        self.out
                            .execute(SetForegroundColor(Color::Magenta))?
                            .execute(Print(&code))?
                            .execute(ResetColor)?;
                        i = close + 1;
                    }
                    None => {
                        buffer.push(c);
                        i += 1;
                    }
                },
                '*' | '_' => {
                    let double = chars.get(i + 1) == Some(&c);
                    let width = if double { 2 } else { 1 };
                    let pair = [c, c];
                    let delim = &pair[..width];
                    let close = if opens_emphasis(&chars, i, width) {
                        find_from(&chars, i + width + 1, delim)
                    } else {
                        None
                    };

                    match close {
                        Some(close) => {
                            self.flush_plain(&mut buffer)?;
                            let inner: String = chars[i + width..close].iter().collect();
                            let attr = if double {
                                Attribute::Bold
                            } else {
                                Attribute::Italic
                            };
                            self.out
                                .execute(SetAttribute(attr))?
                                .execute(Print(&inner))?
                                .execute(SetAttribute(Attribute::Reset))?;
                            i = close + width;
                        }
                        None => {
                            buffer.extend(&chars[i..i + width]);
                            i += width;
                        }
                    }
                }
                '[' => {
                    let link = find_from(&chars, i + 1, &[']']).and_then(|close_text| {
                        (chars.get(close_text + 1) == Some(&'('))
                            .then(|| find_from(&chars, close_text + 2, &[')']))
                            .flatten()
                            .map(|close_url| (close_text, close_url))
                    });

                    match link {
                        Some((close_text, close_url)) => {
                            self.flush_plain(&mut buffer)?;
                            let link_text: String = chars[i + 1..close_text].iter().collect();
                            // The URL is dropped; only the link text is shown.
                            self.out
                                .execute(SetForegroundColor(Color::Blue))?
                                .execute(SetAttribute(Attribute::Underlined))?
                                .execute(Print(&link_text))?
                                .execute(SetAttribute(Attribute::Reset))?
                                .execute(ResetColor)?;
                            i = close_url + 1;
                        }
                        None => {
                            buffer.push(c);
                            i += 1;
                        }
                    }
                }
                _ => {
                    buffer.push(c);
                    i += 1;
                }
            }
        }

        self.flush_plain(&mut buffer)
    }

    fn flush_plain(&mut self, buffer: &mut String) -> std::io::Result<()> {
        if !buffer.is_empty() {
            self.out.execute(Print(buffer.as_str()))?;
            buffer.clear();
        }
        Ok(())
    }

    /// Render a code block with syntax highlighting.
    fn render_code_block(&mut self, lang: &str, code: &str) -> std::io::Result<()> {
        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = &self.theme_set.themes["base16-ocean.dark"];
        let mut highlighter = HighlightLines::new(syntax, theme);

        self.out
            .execute(SetForegroundColor(Color::DarkGrey))?
            .execute(Print(format!(
                "┌── {}\n",
                if lang.is_empty() { "code" } else { lang }
            )))?
            .execute(ResetColor)?;

        for line in LinesWithEndings::from(code) {
            self.out
                .execute(SetForegroundColor(Color::DarkGrey))?
                .execute(Print("│ "))?
                .execute(ResetColor)?;

            match highlighter.highlight_line(line, &self.syntax_set) {
                Ok(ranges) => {
                    let escaped = as_24_bit_terminal_escaped(&ranges[..], false);
                    write!(self.out, "{}\x1b[0m", escaped)?;
                }
                Err(_) => write!(self.out, "{}", line)?,
            }
        }

        self.out
            .execute(SetForegroundColor(Color::DarkGrey))?
            .execute(Print("└──\n"))?
            .execute(ResetColor)?;

        Ok(())
    }
}

/// Index of the first occurrence of `pattern` at or after `from`.
fn find_from(chars: &[char], from: usize, pattern: &[char]) -> Option<usize> {
    if from > chars.len() {
        return None;
    }
    chars[from..]
        .windows(pattern.len())
        .position(|w| w == pattern)
        .map(|p| p + from)
}

/// An emphasis delimiter must be followed by non-space text, and `_` must
/// not sit inside a word.
fn opens_emphasis(chars: &[char], at: usize, width: usize) -> bool {
    let next_is_text = chars
        .get(at + width)
        .is_some_and(|n| !n.is_whitespace());
    let inside_word = chars[at] == '_' && at > 0 && chars[at - 1].is_alphanumeric();
    next_is_text && !inside_word
}

/// Decoded byte length of a padded base64 string.
fn decoded_len(encoded: &str) -> usize {
    let padding = encoded.bytes().rev().take_while(|b| *b == b'=').count();
    (encoded.len() / 4 * 3).saturating_sub(padding)
}

/// Human-readable byte count.
fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}
