//! Lochat - chat with a local model from the terminal.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lochat::cli;
use lochat::config::{Overrides, Settings};

/// Lochat - chat with a local model from the terminal
#[derive(Parser, Debug)]
#[command(name = "lochat")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a TOML config file (default: ~/.config/lochat/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Inference service base URL
    #[arg(long, env = "LOCHAT_HOST")]
    host: Option<String>,

    /// Model to chat with
    #[arg(short, long, env = "LOCHAT_MODEL")]
    model: Option<String>,

    /// Downscale image attachments larger than this many pixels on either side
    #[arg(long, env = "LOCHAT_MAX_IMAGE_DIMENSION")]
    max_image_dimension: Option<u32>,

    /// Login username
    #[arg(long, env = "LOCHAT_USERNAME", hide = true)]
    username: Option<String>,

    /// Login password
    #[arg(long, env = "LOCHAT_PASSWORD", hide = true, hide_env_values = true)]
    password: Option<String>,

    /// Enable debug logging (equivalent to RUST_LOG=debug)
    #[arg(short = 'd', long)]
    debug: bool,

    /// Enable verbose logging (equivalent to RUST_LOG=trace)
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            config_path: self.config.clone(),
            host: self.host.clone(),
            model: self.model.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            max_image_dimension: self.max_image_dimension,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Determine log level from args or env
    let default_filter = if args.verbose {
        "trace"
    } else if args.debug {
        "debug"
    } else {
        "warn" // Quiet by default for normal use
    };

    // Initialize tracing with stderr output
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_writer(std::io::stderr),
        )
        .init();

    if args.debug || args.verbose {
        tracing::info!("Debug logging enabled");
    }

    let settings = Settings::load(args.overrides())?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(cli::run(settings))
}
