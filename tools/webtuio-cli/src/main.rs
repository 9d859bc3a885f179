//! WebTUIO CLI — drive the TUIO encoder from recorded or live pointer input.
//!
//! Usage:
//!   webtuio replay <EVENTS>     Replay recorded pointer events to frames
//!   webtuio stream              Encode pointer events from stdin live
//!   webtuio osc <PACKETS>       Render frame JSON lines as binary OSC (hex)
//!   webtuio config              Show the effective configuration
//!
//! Frames are written to stdout as JSON lines; logs go to stderr.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use webtuio_common::config::{config_file_path, AppConfig};
use webtuio_common::error::TuioError;

mod commands;

#[derive(Parser)]
#[command(
    name = "webtuio",
    about = "Pointer input to TUIO 1.1 2Dcur frames",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/webtuio/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Encoder flag overrides shared by the encoding commands.
#[derive(Args, Debug, Clone, Default)]
pub struct EncoderOverrides {
    /// Flip the vertical axis
    #[arg(long)]
    invert_y: bool,

    /// Send a single message bare instead of always bundling
    #[arg(long)]
    no_bundle: bool,

    /// Disable heartbeat frames
    #[arg(long)]
    no_periodic: bool,

    /// Display-only coordinate scale
    #[arg(long)]
    scale: Option<f64>,

    /// TUIO source name
    #[arg(long)]
    source_name: Option<String>,
}

impl EncoderOverrides {
    fn apply(&self, config: &mut AppConfig) {
        if self.invert_y {
            config.encoder.invert_y = true;
        }
        if self.no_bundle {
            config.encoder.full_bundle = false;
        }
        if self.no_periodic {
            config.encoder.periodic_updates = false;
        }
        if let Some(scale) = self.scale {
            config.encoder.coordinate_scale = scale;
        }
        if let Some(name) = &self.source_name {
            config.encoder.source_name = name.clone();
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded pointer event file (JSON lines with `t` in ns)
    Replay {
        /// Path to the events file
        path: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        overrides: EncoderOverrides,
    },

    /// Read pointer events from stdin and stream frames to stdout
    Stream {
        #[command(flatten)]
        overrides: EncoderOverrides,
    },

    /// Render frame JSON lines as hex-encoded binary OSC
    ///
    /// Each line is a message, a `{timeTag, packets}` bundle, a
    /// `{"bundle": true, "packets": [...]}` object, or an array of messages.
    Osc {
        /// Path to a frames file (`-` for stdin)
        path: PathBuf,
    },

    /// Print the effective configuration
    Config {
        /// Write the effective configuration to the standard location
        #[arg(long)]
        save: bool,
    },
}

/// An explicit `--config` must load; a broken default file falls back to
/// defaults and its error is returned for logging.
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<(AppConfig, Option<TuioError>)> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .map(|config| (config, None))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display())),
        None => Ok(AppConfig::load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (mut config, config_error) = load_config(cli.config.as_ref())?;

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    webtuio_common::logging::init_logging(&config.logging);

    if let Some(e) = config_error {
        tracing::warn!(
            path = %config_file_path().display(),
            error = %e,
            "Ignoring unusable config file, using defaults"
        );
    }

    match cli.command {
        Commands::Replay {
            path,
            output,
            overrides,
        } => {
            overrides.apply(&mut config);
            config.validate()?;
            commands::replay::run(&config, path, output)
        }
        Commands::Stream { overrides } => {
            overrides.apply(&mut config);
            config.validate()?;
            commands::stream::run(&config).await
        }
        Commands::Osc { path } => commands::osc::run(path),
        Commands::Config { save } => commands::config::run(&config, save),
    }
}
