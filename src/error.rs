//! Error types for map collector operations.

use std::path::PathBuf;

use thiserror::Error;

/// Why the host could not hand over a usable artifact.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeldItemError {
    #[error("No active session")]
    NoSession,

    #[error("Hold a map in your main hand.")]
    NotAnArtifact,

    #[error("Map data not loaded yet. Try again.")]
    NotLoaded,

    #[error("Map colors missing or invalid.")]
    InvalidBuffer { actual: usize },
}

/// Primary error type for capture operations.
#[derive(Error, Debug)]
pub enum MapError {
    // Host errors
    #[error(transparent)]
    HeldItem(#[from] HeldItemError),

    // Decoder errors
    #[error("Invalid map buffer: expected {expected} bytes, got {actual}")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("Failed to encode image {path}: {reason}")]
    ImageEncode { path: PathBuf, reason: String },

    // Storage errors
    #[error("Map index error at {path}: {source}")]
    IndexIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config error at {path}: {reason}")]
    ConfigIo { path: PathBuf, reason: String },

    // Command errors
    #[error("Invalid mode '{token}'. Use deny/warn/allow.")]
    InvalidMode { token: String },
}

impl MapError {
    /// Returns true if the error is recoverable by the user.
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::HeldItem(_) | Self::InvalidBuffer { .. } | Self::InvalidMode { .. }
        )
    }

    /// Returns a suggestion for how to fix the error.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::HeldItem(HeldItemError::NotAnArtifact) => Some("Run: hold <buffer-file>"),
            Self::InvalidMode { .. } => Some("Use one of: deny, warn, allow"),
            Self::IndexIo { .. } => Some("Check that the collection directory is writable"),
            Self::ConfigIo { .. } => Some("The setting still applies until exit"),
            _ => None,
        }
    }

    pub(crate) fn index_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::IndexIo {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config_io(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::ConfigIo {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Convenience type alias for Results using MapError.
pub type Result<T> = std::result::Result<T, MapError>;
