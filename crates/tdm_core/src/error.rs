//! Error types for tdm_core operations.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tdm_core operations.
///
/// Most failures inside the store are advisory: they are logged and the
/// lookup degrades to "value not found". Only operations that return
/// `Result` surface one of these.
#[derive(Error, Debug)]
pub enum TdmError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A data document exists but could not be parsed as a JSON object.
    #[error("malformed document at {}: {}", path.display(), reason)]
    MalformedDocument {
        /// Path to the malformed document
        path: PathBuf,
        /// Description of the parse failure
        reason: String,
    },

    /// A feature name or scenario key cannot be used as a path component.
    #[error("invalid {kind} name: {name:?}")]
    InvalidName {
        /// What the name identifies ("feature" or "scenario")
        kind: &'static str,
        /// The rejected name
        name: String,
    },

    /// Serialization error when writing a document or entity.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error (loading, parsing, invalid values).
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// `store_data` was called before the store was configured for a scenario.
    #[error("store is not configured for a scenario")]
    NotConfigured,

    /// The durable tier could not be updated for a key.
    ///
    /// Only returned under `WriteFailurePolicy::Fail`; the in-memory write
    /// has already happened.
    #[error("failed to persist key '{key}': {source}")]
    Persist {
        /// Key whose durable write failed
        key: String,
        /// Underlying failure
        #[source]
        source: Box<TdmError>,
    },

    /// A run identifier string is not in the expected timestamp shape.
    #[error("invalid run id: {0}")]
    InvalidRunId(String),

    /// The advisory lock guarding the durable file could not be taken.
    #[error("failed to lock {}: {}", path.display(), reason)]
    LockFailed {
        /// Path of the lock file
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },
}

impl TdmError {
    /// Returns a user-friendly recovery suggestion for the error, if available.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            Self::NotConfigured => {
                Some("Call configure(environment, feature, scenario_key) at scenario start.")
            }
            Self::MalformedDocument { .. } => {
                Some("Fix the JSON syntax; data documents must have an object at the root.")
            }
            Self::InvalidName { .. } => {
                Some("Feature names and scenario keys must be plain directory/file names.")
            }
            Self::InvalidRunId(_) => {
                Some("Use 'tdm run-id' to generate a run id, or unset TDM_RUN_ID.")
            }
            Self::Persist { .. } | Self::LockFailed { .. } => {
                Some("Check that the results directory exists and is writable.")
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TdmError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Convenience Result type for tdm_core operations.
pub type Result<T> = std::result::Result<T, TdmError>;
