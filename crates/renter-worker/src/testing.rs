//! In-memory collaborators for unit tests.
//!
//! Shards are full copies of the slab payload, so any single surviving shard
//! reconstructs the slab. Failures are injected per call type.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::sync::Arc;

use parking_lot::Mutex;
use renter_core::{
    ChainHeight, Contract, ContractDirectory, ContractHandle, ContractId, Currency, HostDirectory,
    HostKey, Object, ObjectStore, Sector, SectorRoot, ServiceError, Slab, SlabSlice, SlabTransport,
};

use crate::config::WorkerConfig;
use crate::worker::{Services, Worker};

/// A contract whose id and host key are both filled with `tag`.
pub(crate) fn contract(tag: u8, end_height: u64, proof_window_start: u64, funds: u128) -> Contract {
    Contract {
        id: ContractId([tag; 32]),
        host_key: HostKey([tag; 32]),
        end_height,
        proof_window_start,
        renter_funds: Currency(funds),
    }
}

#[derive(Default)]
struct State {
    height: u64,
    contracts: Vec<Contract>,
    hosts: HashMap<HostKey, String>,
    sectors: HashMap<(HostKey, SectorRoot), Vec<u8>>,
    objects: BTreeMap<String, Object>,
    deleted: Vec<ContractId>,
    fail_deletes: bool,
    fail_upload_at: Option<usize>,
    short_upload_at: Option<usize>,
    fail_add_object_at: Option<usize>,
    upload_calls: Vec<Vec<ContractId>>,
    download_calls: usize,
    add_object_calls: usize,
    next_root: u64,
}

#[derive(Clone)]
pub(crate) struct FakeNetwork {
    state: Arc<Mutex<State>>,
}

impl FakeNetwork {
    pub(crate) fn new(height: u64) -> Self {
        let state = State {
            height,
            ..State::default()
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// A worker with a small sector size so tests produce several slabs.
    pub(crate) fn worker(&self) -> Worker {
        self.worker_with(WorkerConfig {
            sector_size: 64,
            pipe_depth: 2,
            pipe_chunk_size: 16,
            ..WorkerConfig::default()
        })
    }

    pub(crate) fn worker_with(&self, config: WorkerConfig) -> Worker {
        Worker::new(Services::from_backend(Arc::new(self.clone())), config)
    }

    pub(crate) fn add_contract(&self, c: Contract) {
        let mut s = self.state.lock();
        s.hosts
            .insert(c.host_key, format!("host-{}.test:9982", c.host_key.0[0]));
        s.contracts.push(c);
    }

    pub(crate) fn remove_contract(&self, tag: u8) {
        let mut s = self.state.lock();
        s.contracts.retain(|c| c.id != ContractId([tag; 32]));
    }

    pub(crate) fn forget_host(&self, tag: u8) {
        self.state.lock().hosts.remove(&HostKey([tag; 32]));
    }

    pub(crate) fn set_height(&self, height: u64) {
        self.state.lock().height = height;
    }

    pub(crate) fn fail_deletes(&self) {
        self.state.lock().fail_deletes = true;
    }

    /// Fail the `n`th upload call (zero-based).
    pub(crate) fn fail_upload_at(&self, n: usize) {
        self.state.lock().fail_upload_at = Some(n);
    }

    /// Make the `n`th upload call encode only half of what it read.
    pub(crate) fn short_upload_at(&self, n: usize) {
        self.state.lock().short_upload_at = Some(n);
    }

    /// Fail the `n`th object registration (zero-based).
    pub(crate) fn fail_add_object_at(&self, n: usize) {
        self.state.lock().fail_add_object_at = Some(n);
    }

    pub(crate) fn deleted(&self) -> Vec<ContractId> {
        self.state.lock().deleted.clone()
    }

    pub(crate) fn contract_count(&self) -> usize {
        self.state.lock().contracts.len()
    }

    pub(crate) fn upload_calls(&self) -> Vec<Vec<ContractId>> {
        self.state.lock().upload_calls.clone()
    }

    pub(crate) fn download_calls(&self) -> usize {
        self.state.lock().download_calls
    }

    pub(crate) fn stored_object(&self, key: &str) -> Option<Object> {
        self.state.lock().objects.get(key).cloned()
    }

    pub(crate) fn object_count(&self) -> usize {
        self.state.lock().objects.len()
    }

    pub(crate) fn put_object(&self, object: Object) {
        let mut s = self.state.lock();
        s.objects.insert(object.key.clone(), object);
    }
}

impl ContractDirectory for FakeNetwork {
    fn contracts(&self) -> Result<Vec<Contract>, ServiceError> {
        Ok(self.state.lock().contracts.clone())
    }

    fn contract(&self, id: &ContractId) -> Result<Contract, ServiceError> {
        self.state
            .lock()
            .contracts
            .iter()
            .find(|c| c.id == *id)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    fn delete_contract(&self, id: &ContractId) -> Result<(), ServiceError> {
        let mut s = self.state.lock();
        if s.fail_deletes {
            return Err(ServiceError::Unavailable("directory is read-only".into()));
        }
        s.contracts.retain(|c| c.id != *id);
        s.deleted.push(*id);
        Ok(())
    }
}

impl ChainHeight for FakeNetwork {
    fn height(&self) -> Result<u64, ServiceError> {
        Ok(self.state.lock().height)
    }
}

impl HostDirectory for FakeNetwork {
    fn host_address(&self, host: &HostKey) -> Result<String, ServiceError> {
        self.state
            .lock()
            .hosts
            .get(host)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(host.to_string()))
    }
}

impl SlabTransport for FakeNetwork {
    fn upload_slab(
        &self,
        data: &mut dyn Read,
        min_shards: u8,
        total_shards: u8,
        _height: u64,
        contracts: &[ContractHandle],
    ) -> Result<Slab, ServiceError> {
        let mut payload = Vec::new();
        data.read_to_end(&mut payload)?;

        let mut s = self.state.lock();
        let call = s.upload_calls.len();
        s.upload_calls
            .push(contracts.iter().map(|c| c.id).collect());
        if s.fail_upload_at == Some(call) {
            return Err(ServiceError::Unavailable("host went away".into()));
        }
        if contracts.len() < usize::from(total_shards) {
            return Err(ServiceError::Rejected("not enough contracts".into()));
        }
        if s.short_upload_at == Some(call) {
            payload.truncate(payload.len() / 2);
        }

        let mut shards = Vec::with_capacity(usize::from(total_shards));
        for handle in &contracts[..usize::from(total_shards)] {
            s.next_root += 1;
            let mut root = [0u8; 32];
            root[..8].copy_from_slice(&s.next_root.to_be_bytes());
            let root = SectorRoot(root);
            s.sectors.insert((handle.host_key, root), payload.clone());
            shards.push(Sector {
                host: handle.host_key,
                root,
            });
        }
        Ok(Slab {
            min_shards,
            shards,
            length: payload.len() as u64,
        })
    }

    fn download_slab(
        &self,
        dst: &mut dyn Write,
        slice: &SlabSlice,
        contracts: &[ContractHandle],
    ) -> Result<(), ServiceError> {
        let payload = {
            let mut s = self.state.lock();
            s.download_calls += 1;
            let found: Vec<&Vec<u8>> = slice
                .slab
                .shards
                .iter()
                .filter(|sector| contracts.iter().any(|c| c.host_key == sector.host))
                .filter_map(|sector| s.sectors.get(&(sector.host, sector.root)))
                .collect();
            if found.len() < usize::from(slice.slab.min_shards) {
                return Err(ServiceError::Unavailable("too few shards".into()));
            }
            found[0].clone()
        };
        let start = slice.offset as usize;
        let end = start + slice.length as usize;
        dst.write_all(&payload[start..end])?;
        Ok(())
    }
}

impl ObjectStore for FakeNetwork {
    fn add_object(&self, key: &str, object: &Object) -> Result<(), ServiceError> {
        let mut s = self.state.lock();
        let call = s.add_object_calls;
        s.add_object_calls += 1;
        if s.fail_add_object_at == Some(call) {
            return Err(ServiceError::Unavailable("object store offline".into()));
        }
        s.objects.insert(key.to_string(), object.clone());
        Ok(())
    }

    fn object(&self, key: &str) -> Result<Object, ServiceError> {
        self.state
            .lock()
            .objects
            .get(key)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(key.to_string()))
    }

    fn object_keys(&self, prefix: &str) -> Result<Vec<String>, ServiceError> {
        Ok(self
            .state
            .lock()
            .objects
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
