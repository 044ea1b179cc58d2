//! # Download
//!
//! Reconstructs an object from whichever shards are still reachable.
//!
//! Planning fetches the object and the live contract map, then walks the
//! slabs in order. For each slab it counts the shards whose host still has a
//! usable contract; the first time a host appears its address is resolved
//! and a [`ContractHandle`] is appended to the plan. A slab with fewer live
//! shards than its `min_shards` fails the plan before anything is
//! transferred.
//!
//! The plan is rebuilt on every call and never cached.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use renter_core::{Checksum, ChecksumAlgorithm, ContractHandle, Object, SlabSlice, StreamHasher};
use serde::{Deserialize, Serialize};

use crate::error::WorkerError;
use crate::pipe::FanOut;
use crate::worker::Worker;

/// An object together with the contracts that can serve its shards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadPlan {
    /// The object being downloaded.
    pub object: Object,
    /// One handle per live host, in first-encounter order.
    pub contracts: Vec<ContractHandle>,
}

impl DownloadPlan {
    /// One request per slab slice, in object order.
    pub fn requests(&self) -> Vec<DownloadRequest> {
        self.object
            .slabs
            .iter()
            .map(|slice| DownloadRequest {
                slab: slice.clone(),
                contracts: self.contracts.clone(),
            })
            .collect()
    }
}

/// What the slab transport would be asked to fetch for one slab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadRequest {
    /// The slab window to reconstruct.
    pub slab: SlabSlice,
    /// Contracts the transport may use.
    pub contracts: Vec<ContractHandle>,
}

/// Outcome of a download job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DownloadReport {
    /// Object key.
    pub key: String,
    /// Bytes written to the destination.
    pub length: u64,
    /// Checksum of the bytes written.
    pub checksum: Checksum,
}

impl Worker {
    /// Resolve every slab of `key` to live contracts.
    ///
    /// Expired contracts encountered along the way are pruned.
    pub fn plan_download(&self, key: &str) -> Result<DownloadPlan, WorkerError> {
        let object = self.services.objects.object(key)?;
        let live = self.live_host_contracts()?;

        let mut seen = HashSet::new();
        let mut contracts = Vec::new();
        for (slab_index, slice) in object.slabs.iter().enumerate() {
            let mut available = 0;
            for sector in &slice.slab.shards {
                let Some(contract) = live.get(&sector.host) else {
                    continue;
                };
                available += 1;
                if seen.insert(sector.host) {
                    contracts.push(self.resolve_handle(contract)?);
                }
            }
            let required = usize::from(slice.slab.min_shards);
            if available < required {
                return Err(WorkerError::InsufficientShards {
                    slab_index,
                    available,
                    required,
                });
            }
        }

        tracing::debug!(
            key,
            slabs = object.slabs.len(),
            contracts = contracts.len(),
            "planned download"
        );
        Ok(DownloadPlan { object, contracts })
    }

    /// The per-slab requests a download of `key` would issue.
    ///
    /// Makes no transport calls and writes nothing locally.
    pub fn dry_run(&self, key: &str) -> Result<Vec<DownloadRequest>, WorkerError> {
        Ok(self.plan_download(key)?.requests())
    }

    /// Download `key` into `destination`, hashing the bytes with `digest`.
    ///
    /// The destination is created (or truncated) once planning succeeds. On
    /// a transfer failure the partially written file is left behind.
    pub fn download(
        &self,
        key: &str,
        destination: &Path,
        digest: &str,
    ) -> Result<DownloadReport, WorkerError> {
        let algorithm: ChecksumAlgorithm = digest.parse()?;
        let plan = self.plan_download(key)?;
        let length = plan.object.length();
        tracing::info!(
            key,
            bytes = length,
            slabs = plan.object.slabs.len(),
            dest = %destination.display(),
            "starting download"
        );

        let file = File::create(destination).map_err(|e| WorkerError::local_io(destination, e))?;
        let mut sink = FanOut::new(file, StreamHasher::new(algorithm));
        for (index, slice) in plan.object.slabs.iter().enumerate() {
            self.services
                .transport
                .download_slab(&mut sink, slice, &plan.contracts)?;
            tracing::debug!(slab = index, bytes = slice.length, "downloaded slab");
        }

        let (file, hasher) = sink.into_parts();
        file.sync_all()
            .map_err(|e| WorkerError::local_io(destination, e))?;
        let checksum = hasher.finalize();

        tracing::info!(key, bytes = length, checksum = %checksum, "download complete");
        Ok(DownloadReport {
            key: key.to_string(),
            length,
            checksum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{contract, FakeNetwork};
    use renter_core::{ContractId, EncryptionKey, HostKey, Sector, SectorRoot, ServiceError, Slab};
    use std::fs;
    use std::path::PathBuf;

    fn uploaded(net: &FakeNetwork, dir: &Path, data: &[u8], m: u8, n: u8) -> PathBuf {
        let path = dir.join("payload.bin");
        fs::write(&path, data).unwrap();
        net.worker().upload(&[path.clone()], m, n, "sha256").unwrap();
        path
    }

    fn network(contracts: u8) -> FakeNetwork {
        let net = FakeNetwork::new(10);
        for tag in 1..=contracts {
            net.add_contract(contract(tag, 10_000, 9_000, 100));
        }
        net
    }

    #[test]
    fn round_trip_matches_upload() {
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..1000u32).map(|i| (i * 7 % 251) as u8).collect();
        let net = network(3);
        uploaded(&net, dir.path(), &data, 2, 3);

        let dest = dir.path().join("out.bin");
        let report = net.worker().download("payload.bin", &dest, "sha256").unwrap();
        assert_eq!(report.length, 1000);
        assert_eq!(fs::read(&dest).unwrap(), data);

        let mut h = StreamHasher::new(ChecksumAlgorithm::Sha256);
        h.update(&data);
        assert_eq!(report.checksum, h.finalize());
    }

    #[test]
    fn plan_deduplicates_hosts_across_slabs() {
        let dir = tempfile::tempdir().unwrap();
        let net = network(3);
        uploaded(&net, dir.path(), &[5u8; 500], 1, 3);

        let plan = net.worker().plan_download("payload.bin").unwrap();
        assert!(plan.object.slabs.len() > 1);
        assert_eq!(plan.contracts.len(), 3);
        let hosts: HashSet<HostKey> = plan.contracts.iter().map(|c| c.host_key).collect();
        assert_eq!(hosts.len(), 3);
    }

    #[test]
    fn lost_contracts_leave_slab_unrecoverable() {
        let dir = tempfile::tempdir().unwrap();
        let net = network(3);
        uploaded(&net, dir.path(), &[1u8; 300], 2, 3);
        net.remove_contract(1);
        net.remove_contract(2);

        let err = net.worker().plan_download("payload.bin").unwrap_err();
        assert!(matches!(
            err,
            WorkerError::InsufficientShards {
                slab_index: 0,
                available: 1,
                required: 2
            }
        ));
    }

    #[test]
    fn expired_contracts_are_pruned_while_planning() {
        let dir = tempfile::tempdir().unwrap();
        let net = FakeNetwork::new(10);
        net.add_contract(contract(1, 10_000, 9_000, 100));
        net.add_contract(contract(2, 10_000, 9_000, 100));
        net.add_contract(contract(3, 50, 9_000, 100));
        uploaded(&net, dir.path(), &[1u8; 64], 1, 3);

        net.set_height(60);
        let plan = net.worker().plan_download("payload.bin").unwrap();
        assert_eq!(plan.contracts.len(), 2);
        assert_eq!(net.deleted(), vec![ContractId([3; 32])]);
    }

    #[test]
    fn dry_run_neither_transfers_nor_writes() {
        let dir = tempfile::tempdir().unwrap();
        let net = network(3);
        uploaded(&net, dir.path(), &[3u8; 300], 2, 3);

        let requests = net.worker().dry_run("payload.bin").unwrap();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].contracts.len(), 3);
        assert_eq!(requests.iter().map(|r| r.slab.length).sum::<u64>(), 300);
        assert_eq!(net.download_calls(), 0);

        let json = serde_json::to_value(&requests[0]).unwrap();
        assert!(json["slab"]["slab"]["shards"].is_array());
        assert_eq!(json["contracts"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn empty_object_downloads_to_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let net = network(1);
        net.put_object(Object {
            key: "empty".into(),
            encryption_key: EncryptionKey([0; 32]),
            slabs: vec![],
        });
        let dest = dir.path().join("empty.out");
        let report = net.worker().download("empty", &dest, "sha1").unwrap();
        assert_eq!(report.length, 0);
        assert_eq!(fs::metadata(&dest).unwrap().len(), 0);
        assert_eq!(net.download_calls(), 0);
    }

    #[test]
    fn unknown_object_is_a_transport_error() {
        let net = network(1);
        let err = net.worker().plan_download("nope").unwrap_err();
        assert!(matches!(err, WorkerError::Transport(ServiceError::NotFound(_))));
    }

    #[test]
    fn shards_on_unknown_hosts_do_not_count() {
        let net = network(1);
        let slab = Slab {
            min_shards: 2,
            shards: vec![
                Sector {
                    host: HostKey([1; 32]),
                    root: SectorRoot([1; 32]),
                },
                Sector {
                    host: HostKey([99; 32]),
                    root: SectorRoot([2; 32]),
                },
            ],
            length: 10,
        };
        net.put_object(Object {
            key: "k".into(),
            encryption_key: EncryptionKey([0; 32]),
            slabs: vec![SlabSlice {
                slab,
                offset: 0,
                length: 10,
            }],
        });
        let err = net.worker().plan_download("k").unwrap_err();
        assert!(matches!(
            err,
            WorkerError::InsufficientShards {
                available: 1,
                required: 2,
                ..
            }
        ));
    }
}
