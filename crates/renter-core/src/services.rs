//! # Collaborator Interfaces
//!
//! The orchestration layer does not form contracts, track the chain, scan
//! hosts, move sectors or persist objects itself. It reaches each of those
//! services through one of the traits below, passed in explicitly by the
//! caller.
//!
//! All traits are object-safe and `Send + Sync` so implementations can be
//! shared behind an `Arc` and used from the upload pipeline's threads.
//! Every call is blocking; implementations own their retry policy.

use std::io::{Read, Write};

use crate::contract::{Contract, ContractHandle};
use crate::error::ServiceError;
use crate::identity::{ContractId, HostKey};
use crate::object::Object;
use crate::slab::{Slab, SlabSlice};

/// Directory of the renter's formed contracts.
pub trait ContractDirectory: Send + Sync {
    /// All known contracts.
    fn contracts(&self) -> Result<Vec<Contract>, ServiceError>;

    /// A single contract by id.
    fn contract(&self, id: &ContractId) -> Result<Contract, ServiceError>;

    /// Remove a contract from the directory.
    fn delete_contract(&self, id: &ContractId) -> Result<(), ServiceError>;
}

/// Source of the current block height.
pub trait ChainHeight: Send + Sync {
    /// Height of the current chain tip.
    fn height(&self) -> Result<u64, ServiceError>;
}

/// Directory of host announcements.
pub trait HostDirectory: Send + Sync {
    /// The host's most recently announced network address.
    fn host_address(&self, host: &HostKey) -> Result<String, ServiceError>;
}

/// Moves slabs to and from hosts.
pub trait SlabTransport: Send + Sync {
    /// Erasure-code everything readable from `data` into one slab of
    /// `total_shards` shards, storing them through `contracts`.
    fn upload_slab(
        &self,
        data: &mut dyn Read,
        min_shards: u8,
        total_shards: u8,
        height: u64,
        contracts: &[ContractHandle],
    ) -> Result<Slab, ServiceError>;

    /// Reconstruct the slice's byte window from shards reachable through
    /// `contracts` and write it to `dst`.
    fn download_slab(
        &self,
        dst: &mut dyn Write,
        slice: &SlabSlice,
        contracts: &[ContractHandle],
    ) -> Result<(), ServiceError>;
}

/// Persistent object metadata store.
pub trait ObjectStore: Send + Sync {
    /// Register (or replace) an object under `key`.
    fn add_object(&self, key: &str, object: &Object) -> Result<(), ServiceError>;

    /// Fetch an object by key.
    fn object(&self, key: &str) -> Result<Object, ServiceError>;

    /// Keys of all objects starting with `prefix`, sorted.
    fn object_keys(&self, prefix: &str) -> Result<Vec<String>, ServiceError>;
}
