//! Unified error types for the appack workspace.
//!
//! Every error is a deterministic input error: nothing here is retried, and
//! each variant renders as a single human-readable line naming the offending
//! path, key, or condition.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum AppError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// No application package exists at the requested location.
    #[error("application not found: {location}")]
    NotFound {
        /// Path or name that was searched.
        location: String,
    },

    /// A directory scan found more than one package candidate.
    #[error(
        "multiple applications found in current directory, specify the application name on the command line (found: {})",
        candidates.join(", ")
    )]
    MultipleApplications {
        /// Names of every candidate, sorted.
        candidates: Vec<String>,
    },

    /// The package container is corrupt or unreadable.
    #[error("invalid application package {path}: {reason}")]
    InvalidPackageFormat {
        /// Package path.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// The destination of a write already exists.
    #[error("destination already exists: {path} (use --overwrite to replace it)")]
    DestinationExists {
        /// Destination path.
        path: PathBuf,
    },

    /// A parameters file is not a flat mapping of scalars.
    #[error("invalid parameters file {source_name}: {reason}")]
    InvalidParameterFile {
        /// File path or source label.
        source_name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `--set` entry is not of the form `key=value`.
    #[error("invalid --set entry \"{entry}\": expected key=value")]
    InvalidSetSyntax {
        /// The offending entry, verbatim.
        entry: String,
    },

    /// The rendered compose document could not be structurally parsed.
    #[error("malformed compose file: {reason}")]
    MalformedCompose {
        /// Parser diagnostic.
        reason: String,
    },

    /// Metadata or parameters violate the package schema.
    #[error("schema violation: {field}: {reason}")]
    SchemaViolation {
        /// Offending field, e.g. `metadata.name`.
        field: String,
        /// Violated rule.
        reason: String,
    },

    /// Strict validation found variable references with no value.
    #[error("unfilled parameters: {}", names.join(", "))]
    UnfilledParameters {
        /// Variable names without a resolvable value.
        names: Vec<String>,
    },
}

impl AppError {
    /// Builds an [`AppError::Io`] for the given path.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Builds an [`AppError::InvalidPackageFormat`] for the given path.
    pub fn invalid_package(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidPackageFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, AppError>;
