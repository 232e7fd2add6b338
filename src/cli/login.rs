//! Login screen prompts.

use dialoguer::{theme::ColorfulTheme, Input, Password};

/// Prompt for a username and password.
///
/// Returns `None` when the user cancels (Ctrl-C, Ctrl-D or closed stdin).
pub fn prompt_credentials() -> Option<(String, String)> {
    let theme = ColorfulTheme::default();

    let username: String = match Input::<String>::with_theme(&theme)
        .with_prompt("Username")
        .allow_empty(true)
        .interact_text()
    {
        Ok(u) => u,
        Err(_) => return None,
    };

    let password = match Password::with_theme(&theme)
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()
    {
        Ok(p) => p,
        Err(_) => return None,
    };

    Some((username, password))
}

/// Heading printed above the login prompts.
pub fn print_login_header() {
    println!("\n\x1b[1m🔒 Log in\x1b[0m\n");
}
