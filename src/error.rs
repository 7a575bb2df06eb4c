//! Error types for loading game configuration
//!
//! The simulation itself has no failure modes; only reading tuning data can fail.

use std::path::PathBuf;

use thiserror::Error;

/// Failure while reading or validating a [`crate::Tuning`] file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("tuning field `{field}` {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
