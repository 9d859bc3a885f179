//! Application configuration.
//!
//! The encoder flags are normally supplied by an external settings form, so
//! the camelCase spellings it writes (`fullBundle`, `invertY`, ...) are
//! accepted as aliases.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{TuioError, TuioResult};

/// Default TUIO source name announced in `source` messages.
pub const DEFAULT_SOURCE_NAME: &str = "WebTUIO@localhost";

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Frame encoding flags.
    pub encoder: EncoderConfig,

    /// Send cadence.
    pub timing: TimingConfig,

    /// Session id allocation.
    pub session: SessionConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Flags controlling how frames are built and framed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderConfig {
    /// Send heartbeat frames while cursors are active.
    #[serde(alias = "periodicUpdates")]
    pub periodic_updates: bool,

    /// Always wrap frames in a bundle envelope.
    #[serde(alias = "fullBundle")]
    pub full_bundle: bool,

    /// Flip the vertical axis (`y' = 1 - y`).
    #[serde(alias = "invertY")]
    pub invert_y: bool,

    /// Display-only coordinate scale. Never applied to wire values.
    #[serde(alias = "coordinateScale")]
    pub coordinate_scale: f64,

    /// Name announced in the `source` message.
    #[serde(alias = "sourceName")]
    pub source_name: String,
}

/// Send cadence and sampling thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Period of the run-loop ticker.
    pub tick_interval_ms: u64,

    /// Minimum gap between heartbeat frames (~30 Hz).
    pub heartbeat_interval_ms: u64,

    /// Minimum gap between move-triggered frames (~60 Hz).
    pub move_interval_ms: u64,

    /// Samples closer together than this (microseconds) update position
    /// only and keep the previous velocity and acceleration.
    pub min_sample_interval_us: u64,
}

/// Session id allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Highest id handed out before the counter wraps to 0.
    pub id_ceiling: i32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "webtuio=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path. Logs go to stderr when unset.
    pub file: Option<PathBuf>,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            periodic_updates: true,
            full_bundle: true,
            invert_y: false,
            coordinate_scale: 1.0,
            source_name: DEFAULT_SOURCE_NAME.to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 16,
            heartbeat_interval_ms: 33,
            move_interval_ms: 16,
            min_sample_interval_us: 1_000,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { id_ceiling: 10_000 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    ///
    /// See [`load_or_default`](Self::load_or_default).
    pub fn load() -> (Self, Option<TuioError>) {
        Self::load_or_default(&config_file_path())
    }

    /// Load config from `path` if it exists.
    ///
    /// A file that exists but is unusable yields the defaults together with
    /// the error, so the caller can report it once logging is initialized.
    pub fn load_or_default(path: &Path) -> (Self, Option<TuioError>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load_from(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> TuioResult<Self> {
        if !path.exists() {
            return Err(TuioError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Reject values the encoder cannot run with.
    pub fn validate(&self) -> TuioResult<()> {
        let scale = self.encoder.coordinate_scale;
        if !scale.is_finite() || scale <= 0.0 {
            return Err(TuioError::config(format!(
                "coordinate_scale must be a positive number, got {scale}"
            )));
        }
        if self.encoder.source_name.trim().is_empty() {
            return Err(TuioError::config("source_name must not be empty"));
        }
        let timing = &self.timing;
        for (name, value) in [
            ("tick_interval_ms", timing.tick_interval_ms),
            ("heartbeat_interval_ms", timing.heartbeat_interval_ms),
            ("move_interval_ms", timing.move_interval_ms),
        ] {
            if value == 0 {
                return Err(TuioError::config(format!("{name} must be > 0")));
            }
        }
        if self.session.id_ceiling < 0 {
            return Err(TuioError::config(format!(
                "id_ceiling must be >= 0, got {}",
                self.session.id_ceiling
            )));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("webtuio").join("config.json")
}
