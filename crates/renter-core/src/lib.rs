//! # renter-core — Foundational Types for the Renter Stack
//!
//! This crate defines the domain model shared by every other crate in the
//! workspace: storage contracts, slabs and their shards, objects, checksum
//! digests, and the traits through which the orchestration layer talks to
//! its external collaborators. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for identifiers.** `ContractId`, `HostKey`,
//!    `SectorRoot` and `EncryptionKey` are distinct 32-byte types with a
//!    prefixed hex text form. You cannot pass a host key where a contract id
//!    is expected.
//!
//! 2. **Liveness is a property of the contract.** [`Contract::liveness()`]
//!    is the single definition of "usable at this height"; selection and
//!    download resolution both go through it.
//!
//! 3. **Objects reference slab windows.** Packed uploads share boundary slabs
//!    between files, so an [`Object`] holds [`SlabSlice`]s rather than whole
//!    slabs. [`split_slabs()`] is the only way slices are cut.
//!
//! 4. **Collaborators are traits.** Contract directory, chain height, host
//!    directory, slab transport and object store live in [`services`] and are
//!    always passed explicitly.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `renter-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod contract;
pub mod digest;
pub mod error;
pub mod identity;
pub mod object;
pub mod services;
pub mod slab;
pub mod units;

// Re-export primary types for ergonomic imports.
pub use contract::{
    Contract, ContractHandle, ContractSummary, Currency, Liveness, PROOF_WINDOW_MARGIN,
};
pub use digest::{Checksum, ChecksumAlgorithm, StreamHasher};
pub use error::{DigestError, IdError, ServiceError, SlabError, UnitError};
pub use identity::{ContractId, EncryptionKey, HostKey, SectorRoot};
pub use object::Object;
pub use services::{ChainHeight, ContractDirectory, HostDirectory, ObjectStore, SlabTransport};
pub use slab::{split_slabs, Redundancy, Sector, Slab, SlabSlice, SECTOR_SIZE};
pub use units::{parse_block_duration, parse_byte_size};
