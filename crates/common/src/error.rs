//! Error types shared across WebTUIO crates.

use std::path::PathBuf;

/// Top-level error type for WebTUIO operations.
#[derive(Debug, thiserror::Error)]
pub enum TuioError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Input error: {message}")]
    Input { message: String },

    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Encode error: {message}")]
    Encode { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using TuioError.
pub type TuioResult<T> = Result<T, TuioError>;

impl TuioError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input {
            message: msg.into(),
        }
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode {
            message: msg.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            TuioError::config("coordinate_scale must be > 0").to_string(),
            "Configuration error: coordinate_scale must be > 0"
        );
        assert_eq!(
            TuioError::transport("closed").to_string(),
            "Transport error: closed"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: TuioError = err.into();
        assert!(matches!(err, TuioError::Json(_)));
    }
}
