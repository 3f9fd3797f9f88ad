//! Error types for folio.
//!
//! Library crates use [`FolioError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all folio operations.
#[derive(Debug, thiserror::Error)]
pub enum FolioError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A persisted document could not be read or parsed at startup.
    #[error("failed to load {what}: {message}")]
    Load { what: String, message: String },

    /// A save would replace a file that exists but failed to load.
    #[error("refusing to overwrite {path:?}: it failed to load and would be replaced by an empty default")]
    UnsafeOverwrite { path: PathBuf },

    /// An auxiliary JSON-shaped field failed to parse at save time.
    #[error("invalid {field}: {message}")]
    StructuredField { field: String, message: String },

    /// A mutation was rejected because it would break a document invariant.
    #[error("invariant violation: {message}")]
    InvariantViolation { message: String },

    /// Site map or crawler policy generation failed.
    #[error("artifact generation failed: {0}")]
    ArtifactGeneration(String),

    /// JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Data validation error (unknown key, index out of range, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The version-control client is not installed or not runnable.
    #[error("version control tooling unavailable: {0}")]
    ToolingUnavailable(String),

    /// The working tree is not a version-controlled directory.
    #[error("not a version-controlled directory: {0}")]
    NotAVersionControlledDirectory(String),

    /// No remote repository is configured.
    #[error("no remote repository configured; add a remote origin first")]
    NoRemoteConfigured,

    /// Committer identity is missing and was not set.
    #[error("committer identity not configured: {0}")]
    IdentityNotConfigured(String),

    /// The push to the upstream repository failed.
    #[error("push failed: {0}")]
    PushRejected(String),

    /// A version-control command failed.
    #[error("`{command}` failed: {message}")]
    Vcs { command: String, message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, FolioError>;

impl FolioError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Create an invariant violation from any displayable message.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: msg.into(),
        }
    }

    /// Create a load error for the named document.
    pub fn load(what: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Load {
            what: what.into(),
            message: msg.into(),
        }
    }

    /// Create a structured-field error for the named field.
    pub fn structured_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::StructuredField {
            field: field.into(),
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a version-control command failure.
    pub fn vcs(command: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Vcs {
            command: command.into(),
            message: msg.into(),
        }
    }

    /// Whether this error belongs to the publish (`push`) phase.
    pub fn is_publish_error(&self) -> bool {
        matches!(
            self,
            Self::ToolingUnavailable(_)
                | Self::NotAVersionControlledDirectory(_)
                | Self::NoRemoteConfigured
                | Self::IdentityNotConfigured(_)
                | Self::PushRejected(_)
                | Self::Vcs { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = FolioError::invariant("cannot remove the last language 'en'");
        assert_eq!(
            err.to_string(),
            "invariant violation: cannot remove the last language 'en'"
        );

        let err = FolioError::PushRejected("! [rejected] main -> main (fetch first)".into());
        assert!(err.to_string().contains("[rejected] main -> main"));
    }

    #[test]
    fn publish_errors_are_classified() {
        assert!(FolioError::NoRemoteConfigured.is_publish_error());
        assert!(FolioError::vcs("git add .", "fatal").is_publish_error());
        assert!(!FolioError::structured_field("skills", "EOF").is_publish_error());
    }
}
