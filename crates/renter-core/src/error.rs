//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types produced by the domain model and by the
//! collaborator traits. All errors use `thiserror` for derive-based
//! `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Collaborator failures are opaque: [`ServiceError`] carries a message and
//!   a coarse category, never a backend-specific type.
//! - Slab arithmetic errors name the byte counts that disagreed.

use thiserror::Error;

/// Failure reported by an external collaborator (contract directory, host
/// directory, chain height source, slab transport or object store).
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The collaborator could not be reached or could not serve the request.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// The collaborator refused the request as malformed or unsatisfiable.
    #[error("request rejected: {0}")]
    Rejected(String),

    /// The collaborator's own storage failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Unrecognized checksum algorithm name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    /// The name is not one of `sha256`, `sha1`, `md5`.
    #[error("unsupported digest algorithm: {0:?} (expected sha256, sha1 or md5)")]
    Unsupported(String),
}

/// Errors in slab parameters or slab partitioning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlabError {
    /// Redundancy parameters violate `total ≥ min ≥ 1`.
    #[error("invalid redundancy: need total shards ({total}) >= min shards ({min}) >= 1")]
    InvalidRedundancy {
        /// Requested minimum shard count.
        min: u8,
        /// Requested total shard count.
        total: u8,
    },

    /// `min_shards × sector_size` is zero or overflows.
    #[error("slab size {min_shards} x {sector_size} bytes is out of range")]
    SlabSize {
        /// Shards required per slab.
        min_shards: u8,
        /// Bytes per sector.
        sector_size: u64,
    },

    /// The per-file lengths ask for more bytes than the slabs hold.
    #[error("slab sequence holds {available} bytes but {requested} were requested")]
    Overrun {
        /// Total bytes across all slabs.
        available: u64,
        /// Sum of the requested lengths.
        requested: u64,
    },

    /// The slabs hold bytes that no length accounts for.
    #[error("slab sequence holds {available} bytes but only {requested} were assigned")]
    Underrun {
        /// Total bytes across all slabs.
        available: u64,
        /// Sum of the requested lengths.
        requested: u64,
    },
}

/// Error parsing a human-readable size or duration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnitError {
    /// The string does not start with a decimal number.
    #[error("expected a number followed by a unit, got {0:?}")]
    Malformed(String),

    /// The unit suffix is not recognized.
    #[error("unknown unit: {0:?}")]
    UnknownUnit(String),

    /// The scaled value does not fit in 64 bits.
    #[error("value out of range: {0:?}")]
    Overflow(String),
}

/// Error parsing the text form of an identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The string does not carry the identifier's prefix.
    #[error("expected prefix {expected:?} in {input:?}")]
    MissingPrefix {
        /// The prefix this identifier kind requires.
        expected: &'static str,
        /// The rejected input.
        input: String,
    },

    /// The payload is not 64 hex characters.
    #[error("expected 64 hex characters, got {0:?}")]
    InvalidHex(String),
}
