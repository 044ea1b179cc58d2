//! Errors raised by the local backend's own storage.

use std::path::PathBuf;

use renter_core::ServiceError;
use thiserror::Error;

/// Failure reading or writing the local network directory.
#[derive(Error, Debug)]
pub enum LocalnetError {
    /// Filesystem failure on a specific path.
    #[error("io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A metadata file exists but does not parse.
    #[error("corrupt metadata file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A stored sector no longer hashes to its root.
    #[error("sector {} failed its integrity check", path.display())]
    Integrity { path: PathBuf },

    /// The height file does not hold a block number.
    #[error("invalid height in {}: {value:?}", path.display())]
    Height { path: PathBuf, value: String },
}

impl LocalnetError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<LocalnetError> for ServiceError {
    fn from(e: LocalnetError) -> Self {
        match e {
            LocalnetError::Io { path, source } => ServiceError::Io(std::io::Error::new(
                source.kind(),
                format!("{}: {source}", path.display()),
            )),
            other => ServiceError::Unavailable(other.to_string()),
        }
    }
}
