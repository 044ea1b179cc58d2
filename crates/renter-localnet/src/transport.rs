//! # Replicated Sector Storage
//!
//! Each shard is stored at `sectors/<host hex>/<root hex>.bin`, where the
//! root is `SHA-256(host key ‖ payload)`. Reads recompute the root and treat
//! a mismatch as a lost shard.
//!
//! Uploads check each contract against the contract directory at the
//! job's height, the way a host refuses revisions on a dead contract.

use std::fs;
use std::io::{Read, Write};
use std::path::PathBuf;

use renter_core::{
    ContractDirectory, ContractHandle, HostKey, Sector, SectorRoot, ServiceError, Slab, SlabSlice,
    SlabTransport,
};
use sha2::{Digest, Sha256};

use crate::{LocalNetwork, LocalnetError, SECTORS_DIR};

fn sector_root(host: &HostKey, payload: &[u8]) -> SectorRoot {
    let mut hasher = Sha256::new();
    hasher.update(host.as_bytes());
    hasher.update(payload);
    SectorRoot(hasher.finalize().into())
}

impl LocalNetwork {
    fn sector_path(&self, host: &HostKey, root: &SectorRoot) -> PathBuf {
        self.root
            .join(SECTORS_DIR)
            .join(host.to_hex())
            .join(format!("{}.bin", root.to_hex()))
    }

    fn store_sector(&self, host: &HostKey, payload: &[u8]) -> Result<SectorRoot, LocalnetError> {
        let root = sector_root(host, payload);
        let path = self.sector_path(host, &root);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| LocalnetError::io(dir, e))?;
        }
        match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut f) => f.write_all(payload).map_err(|e| LocalnetError::io(&path, e))?,
            // Same root, same bytes.
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(LocalnetError::io(path, e)),
        }
        Ok(root)
    }

    /// Read a sector, or `None` if it is missing or fails its integrity check.
    fn load_sector(&self, sector: &Sector) -> Result<Option<Vec<u8>>, LocalnetError> {
        let path = self.sector_path(&sector.host, &sector.root);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(LocalnetError::io(path, e)),
        };
        if sector_root(&sector.host, &bytes) != sector.root {
            tracing::warn!("{}", LocalnetError::Integrity { path });
            return Ok(None);
        }
        Ok(Some(bytes))
    }
}

impl SlabTransport for LocalNetwork {
    fn upload_slab(
        &self,
        data: &mut dyn Read,
        min_shards: u8,
        total_shards: u8,
        height: u64,
        contracts: &[ContractHandle],
    ) -> Result<Slab, ServiceError> {
        if min_shards == 0 || total_shards < min_shards {
            return Err(ServiceError::Rejected(format!(
                "invalid redundancy {min_shards}-of-{total_shards}"
            )));
        }
        let n = usize::from(total_shards);
        if contracts.len() < n {
            return Err(ServiceError::Rejected(format!(
                "{n} shards need {n} contracts, got {}",
                contracts.len()
            )));
        }

        let mut payload = Vec::new();
        data.read_to_end(&mut payload)?;

        let mut shards = Vec::with_capacity(n);
        for handle in &contracts[..n] {
            let contract = self.contract(&handle.id)?;
            if contract.host_key != handle.host_key || height >= contract.end_height {
                return Err(ServiceError::Rejected(format!(
                    "contract {} cannot be revised at height {height}",
                    handle.id
                )));
            }
            let root = self.store_sector(&handle.host_key, &payload)?;
            shards.push(Sector {
                host: handle.host_key,
                root,
            });
        }

        tracing::debug!(bytes = payload.len(), shards = n, "stored slab");
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
        let required = usize::from(slice.slab.min_shards);
        let mut intact = Vec::new();
        for sector in &slice.slab.shards {
            if intact.len() == required.max(1) {
                break;
            }
            if !contracts.iter().any(|c| c.host_key == sector.host) {
                continue;
            }
            if let Some(bytes) = self.load_sector(sector)? {
                intact.push(bytes);
            }
        }
        if intact.len() < required || intact.is_empty() {
            return Err(ServiceError::Unavailable(format!(
                "only {} of {required} required shards reachable",
                intact.len()
            )));
        }

        let payload = &intact[0];
        let start = usize::try_from(slice.offset).unwrap_or(usize::MAX);
        let end = start.saturating_add(usize::try_from(slice.length).unwrap_or(usize::MAX));
        let window = payload.get(start..end).ok_or_else(|| {
            ServiceError::Rejected(format!(
                "window {}+{} outside slab of {} bytes",
                slice.offset,
                slice.length,
                payload.len()
            ))
        })?;
        dst.write_all(window)?;
        Ok(())
    }
}
