//! Unified error type definition

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ExportBatch;

// Re-export library error type
pub use nextdns_logs_client::ClientError;

/// A download that failed after zero or more pages were collected.
///
/// `partial` holds every entry accumulated before the failure; its metadata
/// is marked incomplete.
#[derive(Error, Debug)]
#[error("download aborted after {} entries: {error}", .partial.len())]
pub struct DownloadAborted {
    #[source]
    pub error: ClientError,
    pub partial: ExportBatch,
}

/// Core layer error type
#[derive(Error, Debug)]
pub enum CoreError {
    /// Client error (converting from library)
    #[error("{0}")]
    Client(#[from] ClientError),

    /// The download failed; whatever was collected has been saved where possible.
    #[error("Download failed after saving {saved} entries: {source}")]
    DownloadFailed {
        source: ClientError,
        /// Entries in each of `files`; zero when no file was written.
        saved: usize,
        /// Files holding the partial export.
        files: Vec<PathBuf>,
        /// Why saving the partial export stopped early, if it did.
        write_error: Option<Box<CoreError>>,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// File system error
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl CoreError {
    /// Whether it is expected behavior (user input, bad credentials, ...), used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    #[must_use]
    pub fn is_expected(&self) -> bool {
        match self {
            Self::ValidationError(_) => true,
            Self::Client(e) | Self::DownloadFailed { source: e, .. } => e.is_auth_error(),
            _ => false,
        }
    }

    /// The client error behind this failure, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Self::Client(e) | Self::DownloadFailed { source: e, .. } => Some(e),
            _ => None,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Core layer Result type alias
pub type CoreResult<T> = std::result::Result<T, CoreError>;
