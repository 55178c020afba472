//! Storage error handling
//!
//! Typed errors for the settings registry, with descriptive messages and
//! recovery suggestions for display by the application layer.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The settings file exists but could not be opened or parsed
    #[error("Settings file '{path}' could not be opened: {source}")]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A namespace with this name is already registered
    #[error("Namespace '{name}' already exists")]
    DuplicateNamespace { name: String },

    /// Writing the settings file failed
    #[error("Failed to write settings to '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The registry could not be encoded
    #[error("Failed to serialize settings: {0}")]
    Serialize(String),
}

impl StorageError {
    /// Build an `Inaccessible` error from a parse failure
    pub(crate) fn corrupt(path: PathBuf, details: impl std::fmt::Display) -> Self {
        StorageError::Inaccessible {
            path,
            source: io::Error::new(io::ErrorKind::InvalidData, details.to_string()),
        }
    }

    /// Whether the application should stop after this error
    ///
    /// Environment problems are fatal; a duplicate namespace is a logic error
    /// in the caller.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            StorageError::Inaccessible { .. } | StorageError::WriteFailed { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::Inaccessible { source, .. } => match source.kind() {
                io::ErrorKind::PermissionDenied => {
                    Some("Check the file's permissions, or whether another program has it open.")
                }
                io::ErrorKind::InvalidData => {
                    Some("The file is not valid settings data. Move it aside to start with default settings.")
                }
                _ => Some("It may be in use by another program, or may have incorrect permission settings."),
            },
            StorageError::WriteFailed { source, .. } if is_disk_full_error(source) => {
                Some("Free up disk space and try again.")
            }
            StorageError::WriteFailed { .. } => {
                Some("Check that the settings directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
