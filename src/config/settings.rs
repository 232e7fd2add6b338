//! Application settings resolved from defaults, a TOML file and overrides.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::XdgDirs;

/// Default inference service address (a local Ollama install).
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Default model identifier. A vision model so image attachments work.
pub const DEFAULT_MODEL: &str = "llava";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(
        "Login credentials are not configured. Set LOCHAT_USERNAME and LOCHAT_PASSWORD \
         or add username/password to the config file"
    )]
    MissingCredentials,
    #[error("Invalid host URL: {0}")]
    InvalidHost(String),
}

/// The reference username/password pair the login gate compares against.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// On-disk config file layout. Every key is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    pub host: Option<String>,
    pub model: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub max_image_dimension: Option<u32>,
}

impl FileSettings {
    /// Parse a config file's contents.
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file.
    ///
    /// A missing file is only an error when it was named explicitly.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::parse(path, &contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

/// Values supplied on the command line or through the environment.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config_path: Option<PathBuf>,
    pub host: Option<String>,
    pub model: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub max_image_dimension: Option<u32>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the inference service, without a trailing slash.
    pub host: String,
    /// Model identifier sent with every request.
    pub model: String,
    pub credentials: Credentials,
    /// Downscale image attachments larger than this (pixels, either side).
    pub max_image_dimension: Option<u32>,
}

impl Settings {
    /// Load settings: the config file (explicit or XDG default), then overrides.
    pub fn load(overrides: Overrides) -> Result<Self, ConfigError> {
        let file = match &overrides.config_path {
            Some(path) => FileSettings::load(path, true)?,
            None => FileSettings::load(&XdgDirs::new().config_file(), false)?,
        };
        Self::resolve(file, overrides)
    }

    /// Merge file settings with overrides. Overrides win.
    pub fn resolve(file: FileSettings, overrides: Overrides) -> Result<Self, ConfigError> {
        let host = overrides
            .host
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = normalize_host(&host)?;

        let model = overrides
            .model
            .or(file.model)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let username = overrides.username.or(file.username);
        let password = overrides.password.or(file.password);
        let credentials = match (username, password) {
            (Some(username), Some(password)) => Credentials::new(username, password),
            _ => return Err(ConfigError::MissingCredentials),
        };

        let max_image_dimension = overrides
            .max_image_dimension
            .or(file.max_image_dimension)
            .filter(|d| *d > 0);

        Ok(Self {
            host,
            model,
            credentials,
            max_image_dimension,
        })
    }
}

/// Trim whitespace and trailing slashes, and require an http(s) scheme.
fn normalize_host(host: &str) -> Result<String, ConfigError> {
    let trimmed = host.trim().trim_end_matches('/');
    let has_authority = ["http://", "https://"]
        .iter()
        .any(|scheme| trimmed.strip_prefix(scheme).is_some_and(|rest| !rest.is_empty()));
    if !has_authority {
        return Err(ConfigError::InvalidHost(host.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn creds_overrides() -> Overrides {
        Overrides {
            username: Some("admin".into()),
            password: Some("hunter2".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults_applied() {
        let settings = Settings::resolve(FileSettings::default(), creds_overrides()).unwrap();
        assert_eq!(settings.host, DEFAULT_HOST);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert_eq!(settings.credentials, Credentials::new("admin", "hunter2"));
        assert_eq!(settings.max_image_dimension, None);
    }

    #[test]
    fn test_overrides_beat_file() {
        let file = FileSettings {
            host: Some("http://gpu-box:11434".into()),
            model: Some("llama3".into()),
            username: Some("file-user".into()),
            password: Some("file-pass".into()),
            max_image_dimension: Some(512),
        };
        let overrides = Overrides {
            model: Some("bakllava".into()),
            username: Some("cli-user".into()),
            ..Default::default()
        };

        let settings = Settings::resolve(file, overrides).unwrap();
        assert_eq!(settings.host, "http://gpu-box:11434");
        assert_eq!(settings.model, "bakllava");
        assert_eq!(settings.credentials.username, "cli-user");
        assert_eq!(settings.credentials.password, "file-pass");
        assert_eq!(settings.max_image_dimension, Some(512));
    }

    #[test]
    fn test_missing_password_is_an_error() {
        let overrides = Overrides {
            username: Some("admin".into()),
            ..Default::default()
        };
        let err = Settings::resolve(FileSettings::default(), overrides).unwrap_err();
        assert!(matches!(err, ConfigError::MissingCredentials));
    }

    #[test]
    fn test_empty_credentials_are_allowed() {
        let overrides = Overrides {
            username: Some(String::new()),
            password: Some(String::new()),
            ..Default::default()
        };
        let settings = Settings::resolve(FileSettings::default(), overrides).unwrap();
        assert_eq!(settings.credentials, Credentials::new("", ""));
    }

    #[test]
    fn test_host_trailing_slash_trimmed() {
        let overrides = Overrides {
            host: Some(" http://localhost:11434/ ".into()),
            ..creds_overrides()
        };
        let settings = Settings::resolve(FileSettings::default(), overrides).unwrap();
        assert_eq!(settings.host, "http://localhost:11434");
    }

    #[test]
    fn test_host_without_scheme_rejected() {
        let overrides = Overrides {
            host: Some("localhost:11434".into()),
            ..creds_overrides()
        };
        let err = Settings::resolve(FileSettings::default(), overrides).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHost(_)));
    }

    #[test]
    fn test_zero_image_dimension_disables_downscaling() {
        let overrides = Overrides {
            max_image_dimension: Some(0),
            ..creds_overrides()
        };
        let settings = Settings::resolve(FileSettings::default(), overrides).unwrap();
        assert_eq!(settings.max_image_dimension, None);
    }

    #[test]
    fn test_blank_model_falls_back_to_default() {
        let overrides = Overrides {
            model: Some("  ".into()),
            ..creds_overrides()
        };
        let settings = Settings::resolve(FileSettings::default(), overrides).unwrap();
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_parse_file() {
        let contents = r#"
            host = "http://127.0.0.1:11434"
            model = "llava:13b"
            username = "admin"
            password = "secret"
            max_image_dimension = 1024
        "#;
        let file = FileSettings::parse(Path::new("config.toml"), contents).unwrap();
        assert_eq!(file.model.as_deref(), Some("llava:13b"));
        assert_eq!(file.max_image_dimension, Some(1024));
    }

    #[test]
    fn test_parse_rejects_unknown_keys() {
        let err = FileSettings::parse(Path::new("config.toml"), "colour = \"red\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_missing_optional_file_is_default() {
        let temp = TempDir::new().unwrap();
        let file = FileSettings::load(&temp.path().join("nope.toml"), false).unwrap();
        assert!(file.host.is_none());
    }

    #[test]
    fn test_missing_required_file_is_error() {
        let temp = TempDir::new().unwrap();
        let err = FileSettings::load(&temp.path().join("nope.toml"), true).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_with_explicit_config_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lochat.toml");
        std::fs::write(&path, "username = \"u\"\npassword = \"p\"\nmodel = \"moondream\"\n").unwrap();

        let settings = Settings::load(Overrides {
            config_path: Some(path),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(settings.model, "moondream");
        assert_eq!(settings.credentials, Credentials::new("u", "p"));
    }

    #[test]
    fn test_credentials_debug_redacts_password() {
        let rendered = format!("{:?}", Credentials::new("admin", "hunter2"));
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
