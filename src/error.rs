//! Error types for planboard.
//!
//! Port traits report failures as [`PortError`]; the aggregator and store wrap
//! them into [`Error`] so callers match on one enum.

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error returned by port trait methods.
pub type PortError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for planboard operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A store rejected a create, update or delete.
    #[error("{op} failed: {source}")]
    Store {
        /// The operation that failed (e.g. `"update task abc"`).
        op: String,
        /// The underlying port error.
        #[source]
        source: PortError,
    },

    /// The id is not in the current merged view and the routing policy
    /// refuses to guess a store.
    #[error("Task {0} is not in the current view")]
    NotInView(String),

    /// A task document could not be found in the store.
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// A workspace task path does not have the expected shape.
    #[error("Invalid task path: {0}")]
    InvalidPath(String),

    /// A value supplied by the user could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration could not be loaded.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read a configuration file.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// The file being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// YAML (de)serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Wraps a port failure with a description of the attempted operation.
    pub fn store(op: impl Into<String>, source: PortError) -> Self {
        Self::Store { op: op.into(), source }
    }
}

/// Result type alias for planboard operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_names_operation_and_cause() {
        let err = Error::store("delete task t-1", "permission denied".into());
        assert_eq!(err.to_string(), "delete task t-1 failed: permission denied");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn not_in_view_mentions_id() {
        let err = Error::NotInView("ghost".into());
        assert!(err.to_string().contains("ghost"));
    }
}
