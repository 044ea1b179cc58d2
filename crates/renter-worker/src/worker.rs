//! # Worker and Collaborator Bundle
//!
//! A [`Worker`] is a configuration plus the five collaborator handles it
//! talks through. Job methods live next to the component they implement:
//! selection in [`crate::contracts`], uploads in [`crate::upload`], downloads
//! in [`crate::download`].

use std::sync::Arc;

use renter_core::{ChainHeight, ContractDirectory, HostDirectory, ObjectStore, SlabTransport};

use crate::config::WorkerConfig;

/// Handles to every external service a job may call.
#[derive(Clone)]
pub struct Services {
    /// Contract directory (list, get, delete).
    pub contracts: Arc<dyn ContractDirectory>,
    /// Current block height.
    pub chain: Arc<dyn ChainHeight>,
    /// Host announcements.
    pub hosts: Arc<dyn HostDirectory>,
    /// Slab upload and download.
    pub transport: Arc<dyn SlabTransport>,
    /// Object metadata.
    pub objects: Arc<dyn ObjectStore>,
}

impl Services {
    /// Use one backend that implements every collaborator trait.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ContractDirectory + ChainHeight + HostDirectory + SlabTransport + ObjectStore + 'static,
    {
        Self {
            contracts: backend.clone(),
            chain: backend.clone(),
            hosts: backend.clone(),
            transport: backend.clone(),
            objects: backend,
        }
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}

/// Runs upload and download jobs against a set of collaborators.
#[derive(Debug, Clone)]
pub struct Worker {
    pub(crate) services: Services,
    pub(crate) config: WorkerConfig,
}

impl Worker {
    /// Create a worker.
    pub fn new(services: Services, config: WorkerConfig) -> Self {
        Self { services, config }
    }
}
