//! # Worker Errors
//!
//! The failure taxonomy of upload and download jobs. Every variant aborts
//! the job that produced it; there is no partial-success reporting across
//! slabs or files.

use std::path::PathBuf;

use renter_core::{DigestError, ServiceError, SlabError};
use thiserror::Error;

/// Error from a worker job.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Fewer live contracts than the redundancy requires.
    #[error("not enough usable contracts: need {required}, have {available}")]
    InsufficientContracts {
        /// Contracts the job needs.
        required: usize,
        /// Contracts that passed the liveness filter.
        available: usize,
    },

    /// Fewer live shards than a slab's minimum.
    #[error("slab {slab_index} has {available} live shards but needs {required}")]
    InsufficientShards {
        /// Position of the slab in the object.
        slab_index: usize,
        /// Shards whose host has a live contract.
        available: usize,
        /// The slab's `min_shards`.
        required: usize,
    },

    /// A local file could not be inspected, read or written.
    #[error("local io error on {}: {source}", path.display())]
    LocalIo {
        /// The offending path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The checksum algorithm name is not recognized.
    #[error(transparent)]
    UnsupportedDigest(#[from] DigestError),

    /// A collaborator call failed.
    #[error("transport error: {0}")]
    Transport(#[from] ServiceError),

    /// Redundancy parameters were invalid, or slabs did not add up to the
    /// file lengths.
    #[error(transparent)]
    Slab(#[from] SlabError),

    /// The upload pipeline broke down between its two halves.
    #[error("upload pipeline failed: {0}")]
    Pipeline(String),
}

impl WorkerError {
    /// Build a [`WorkerError::LocalIo`] for `path`.
    pub fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::LocalIo {
            path: path.into(),
            source,
        }
    }

    /// Whether the error is a pipeline breakdown rather than a root cause.
    pub fn is_pipeline(&self) -> bool {
        matches!(self, Self::Pipeline(_))
    }
}
