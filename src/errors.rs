//! Error taxonomy for artifact publication and log extraction.
//!
//! Backend transport failures are carried as [`PublishError::Transport`] and
//! display exactly as the backend reported them.

use std::path::PathBuf;

use thiserror::Error;

use crate::constants::MIN_OBJECT_STORAGE_VERSION;

/// Errors raised by the publishing layer
#[derive(Debug, Error)]
pub enum PublishError {
    /// Remote publication requested but no destination could be resolved
    #[error("You're trying to upload artifact files, but the remote target path is not configured.")]
    NotConfigured,

    /// Host does not provide the object storage abstraction
    #[error(
        "You're trying to specify remote target path {target}, but the required object storage \
         feature is unavailable in host version {host_version}. Please upgrade to {} or later.",
        MIN_OBJECT_STORAGE_VERSION
    )]
    CapabilityUnavailable { target: String, host_version: String },

    /// Caller supplied an input that would produce a malformed destination
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No `show` array present in the log text
    #[error("Could not find 'show' JSON array in string.")]
    Extraction,

    /// The `show` fragment was found but is not valid JSON
    #[error("JSON decoding failed: {0}")]
    MalformedPayload(#[source] serde_json::Error),

    /// A file the docs build must produce is absent
    #[error("required documentation file not found: {}", .0.display())]
    MissingDocsArtifact(PathBuf),

    /// Local filesystem failure while walking or reading artifacts
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by a storage backend or while connecting to one
    #[error(transparent)]
    Transport(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, PublishError>;
