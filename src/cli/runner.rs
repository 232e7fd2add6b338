//! Top-level interactive loop: login screen, then chat, until quit.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use super::login::{print_login_header, prompt_credentials};
use super::repl::{run_chat, ChatExit};
use super::shell::{Shell, View};
use crate::attachments::IngestOptions;
use crate::auth::{CredentialGate, INVALID_CREDENTIALS};
use crate::config::Settings;
use crate::inference::OllamaClient;

/// Run the application until the user quits.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    print_banner();

    let client = OllamaClient::new(&settings.host, &settings.model)
        .context("Failed to create inference client")?;
    info!(host = %settings.host, model = %settings.model, "Inference client ready");

    let options = IngestOptions {
        max_image_dimension: settings.max_image_dimension,
    };
    let mut shell = Shell::new(
        CredentialGate::new(settings.credentials),
        Arc::new(client),
        options,
    );

    loop {
        match shell.view() {
            View::Login => {
                print_login_header();
                let Some((username, password)) = prompt_credentials() else {
                    break;
                };
                if shell.login(&username, &password) {
                    println!(
                        "\n\x1b[32m✓\x1b[0m Logged in. Chatting with \x1b[1m{}\x1b[0m. Type \x1b[1;36m/help\x1b[0m for commands.\n",
                        settings.model
                    );
                } else {
                    println!("\x1b[31m✗ {}\x1b[0m", INVALID_CREDENTIALS);
                }
            }
            View::Chat => {
                let Some(session) = shell.session_mut() else {
                    shell.logout();
                    continue;
                };
                match run_chat(session).await {
                    ChatExit::Logout => {
                        shell.logout();
                        println!("\nLogged out.");
                    }
                    ChatExit::Quit => break,
                }
            }
        }
    }

    println!("👋 Bye!");
    Ok(())
}

/// Print the welcome banner.
pub fn print_banner() {
    for (i, line) in banner_text_lines().iter().enumerate() {
        if i < 3 {
            println!("  \x1b[1;33m{}\x1b[0m", line);
        } else {
            println!("  \x1b[2m{}\x1b[0m", line);
        }
    }
    println!("  \x1b[2mv{}\x1b[0m", get_version());
    println!();
}

/// Get the application version string.
pub fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Banner lines without ANSI codes.
pub fn banner_text_lines() -> Vec<&'static str> {
    vec![
        "╦  ╔═╗╔═╗╦ ╦╔═╗╔╦╗",
        "║  ║ ║║  ╠═╣╠═╣ ║ ",
        "╩═╝╚═╝╚═╝╩ ╩╩ ╩ ╩ ",
        "Chat with a local model. Log in to begin.",
    ]
}
