//! # renter-worker — Slab Orchestration
//!
//! Coordinates erasure-coded file storage across independent hosts reachable
//! only through storage contracts. Three components, in dependency order:
//!
//! - **Contract selection** ([`contracts`]): filters the contract directory
//!   down to contracts that are live at the current height, resolves host
//!   addresses, and shuffles the result so repeated jobs spread load.
//! - **Upload** ([`upload`]): packs input files into one stream, cuts it into
//!   `m × sector_size` slabs handed to the slab transport one at a time, and
//!   registers one object per file.
//! - **Download** ([`download`]): resolves an object's shards to live
//!   contracts, then streams every slab through the transport into the
//!   destination while computing a checksum, or emits the per-slab request
//!   documents in dry-run mode.
//!
//! ## Collaborators
//!
//! Everything outside this layer (contract directory, chain height, host
//! directory, slab transport, object store) is reached through the traits in
//! [`renter_core::services`], bundled into [`Services`] and handed to
//! [`Worker::new`]. A worker holds no other state; each job computes its own
//! contract snapshot.
//!
//! ## Crate Policy
//!
//! - No retries: retry policy belongs to the collaborators.
//! - Errors are fail-fast. The one exception is expired-contract pruning,
//!   whose failures are logged and dropped.

pub mod config;
pub mod contracts;
pub mod download;
pub mod error;
pub mod pipe;
pub mod upload;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, WorkerConfig, MAX_PIPE_CHUNK_SIZE, MAX_SECTOR_SIZE};
pub use contracts::{partition_contracts, ContractPartition};
pub use download::{DownloadPlan, DownloadReport, DownloadRequest};
pub use error::WorkerError;
pub use upload::{UploadReport, UploadedObject};
pub use worker::{Services, Worker};
