//! Configuration management.

mod settings;
mod xdg;

pub use settings::{
    ConfigError, Credentials, FileSettings, Overrides, Settings, DEFAULT_HOST, DEFAULT_MODEL,
};
pub use xdg::XdgDirs;
