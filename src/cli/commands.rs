//! Slash commands available on the chat screen.

/// All slash commands with descriptions
pub const COMMANDS: &[(&str, &str)] = &[
    ("/attach", "Attach a file to the next message"),
    ("/clear", "Clear screen"),
    ("/detach", "Remove the staged attachment"),
    ("/exit", "Exit"),
    ("/help", "Show help"),
    ("/logout", "Log out"),
    ("/quit", "Exit"),
    ("/status", "Check the inference service"),
];

/// Short spellings accepted in place of a command name.
const ALIASES: &[(&str, &str)] = &[
    ("a", "attach"),
    ("cls", "clear"),
    ("h", "help"),
    ("?", "help"),
    ("q", "exit"),
];

/// One line of chat-screen input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand<'a> {
    Attach(&'a str),
    Detach,
    Logout,
    Clear,
    Status,
    Help,
    Exit,
    /// Not a command: send as a chat message.
    Submit(&'a str),
}

/// Canonical name (without the slash) of a typed command word such as
/// `/Help` or `/q`. `None` when the word is not a known command.
pub fn command_name(word: &str) -> Option<&'static str> {
    let name = word.strip_prefix('/')?.to_lowercase();
    if let Some((_, canonical)) = ALIASES.iter().find(|(alias, _)| *alias == name.as_str()) {
        return Some(*canonical);
    }
    COMMANDS
        .iter()
        .map(|(cmd, _)| &cmd[1..])
        .find(|cmd| *cmd == name.as_str())
}

/// Classify a line. Only a known command word makes it a command; any other
/// input, including text that merely starts with `/`, is a chat message.
pub fn parse(input: &str) -> ChatCommand<'_> {
    let (word, args) = match input.split_once(char::is_whitespace) {
        Some((word, args)) => (word, args.trim()),
        None => (input, ""),
    };

    match command_name(word) {
        Some("attach") => ChatCommand::Attach(args),
        Some("detach") => ChatCommand::Detach,
        Some("logout") => ChatCommand::Logout,
        Some("clear") => ChatCommand::Clear,
        Some("status") => ChatCommand::Status,
        Some("help") => ChatCommand::Help,
        Some("exit" | "quit") => ChatCommand::Exit,
        _ => ChatCommand::Submit(input),
    }
}

/// Print the command list.
pub fn show_help() {
    println!("\n\x1b[1mCommands:\x1b[0m\n");
    for (cmd, desc) in COMMANDS {
        let usage = if *cmd == "/attach" {
            "/attach <path>"
        } else {
            cmd
        };
        println!("  \x1b[36m{:<16}\x1b[0m {}", usage, desc);
    }
    println!();
    println!("  Anything else is sent to the model. Images are attached as");
    println!("  pictures; other files are inlined into the message as text.");
    println!();
}
