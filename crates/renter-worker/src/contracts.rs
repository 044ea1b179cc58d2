//! # Contract Selection
//!
//! Turns the contract directory into the set of contracts a job may use.
//!
//! ## Pipeline
//!
//! ```text
//! contracts() + height()  ──▶  partition_contracts()  ──▶  live / expired
//!                                                            │      │
//!                               resolve host address ◀───────┘      └──▶ prune_expired()
//!                                        │                               (best effort)
//!                                        ▼
//!                                 shuffle, check count
//! ```
//!
//! Classification is a pure function of the snapshot. Pruning is a separate
//! maintenance operation; [`Worker::select_usable`] and the download resolver
//! compose the two, and a failed delete never fails the surrounding job.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use renter_core::{Contract, ContractHandle, ContractId, ContractSummary, HostKey, Liveness};

use crate::error::WorkerError;
use crate::worker::Worker;

/// A contract snapshot split by liveness at one height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractPartition {
    /// Height the snapshot was classified at.
    pub height: u64,
    /// Usable contracts, in directory order.
    pub live: Vec<Contract>,
    /// Contracts past their end height.
    pub expired: Vec<ContractId>,
    /// Contracts that are neither usable nor expired (near the proof window,
    /// or out of funds).
    pub unusable: usize,
}

/// Classify contracts at `height`.
pub fn partition_contracts(contracts: Vec<Contract>, height: u64) -> ContractPartition {
    let mut partition = ContractPartition {
        height,
        live: Vec::with_capacity(contracts.len()),
        expired: Vec::new(),
        unusable: 0,
    };
    for contract in contracts {
        match contract.liveness(height) {
            Liveness::Usable => partition.live.push(contract),
            Liveness::Expired => partition.expired.push(contract.id),
            Liveness::NearProofWindow | Liveness::Drained => partition.unusable += 1,
        }
    }
    partition
}

impl Worker {
    /// Read the contract directory and chain height and classify the result.
    ///
    /// Read-only: nothing is deleted.
    pub fn contract_partition(&self) -> Result<ContractPartition, WorkerError> {
        let contracts = self.services.contracts.contracts()?;
        let height = self.services.chain.height()?;
        Ok(partition_contracts(contracts, height))
    }

    /// Delete the given contracts from the directory, ignoring failures.
    ///
    /// Returns how many deletes succeeded.
    pub fn prune_expired(&self, expired: &[ContractId]) -> usize {
        let mut pruned = 0;
        for id in expired {
            match self.services.contracts.delete_contract(id) {
                Ok(()) => {
                    pruned += 1;
                    tracing::debug!(contract = %id, "pruned expired contract");
                }
                Err(e) => {
                    tracing::warn!(contract = %id, "failed to prune expired contract: {e}");
                }
            }
        }
        pruned
    }

    /// Return at least `required` usable contracts with resolved host
    /// addresses, in uniformly random order.
    ///
    /// Expired contracts found along the way are pruned.
    pub fn select_usable(&self, required: usize) -> Result<Vec<ContractHandle>, WorkerError> {
        let partition = self.contract_partition()?;
        self.prune_expired(&partition.expired);

        let mut usable = partition
            .live
            .iter()
            .map(|c| self.resolve_handle(c))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            height = partition.height,
            usable = usable.len(),
            expired = partition.expired.len(),
            unusable = partition.unusable,
            "selected contracts"
        );

        if usable.len() < required {
            return Err(WorkerError::InsufficientContracts {
                required,
                available: usable.len(),
            });
        }

        usable.shuffle(&mut rand::thread_rng());
        Ok(usable)
    }

    /// Map each host with a usable contract to that contract.
    ///
    /// Expired contracts found along the way are pruned. When a host has more
    /// than one usable contract the last one in directory order wins.
    pub fn live_host_contracts(&self) -> Result<HashMap<HostKey, Contract>, WorkerError> {
        let partition = self.contract_partition()?;
        self.prune_expired(&partition.expired);
        Ok(partition
            .live
            .into_iter()
            .map(|c| (c.host_key, c))
            .collect())
    }

    /// Summaries of every contract in the directory, with the listing height.
    pub fn contract_summaries(&self) -> Result<(u64, Vec<ContractSummary>), WorkerError> {
        let contracts = self.services.contracts.contracts()?;
        let height = self.services.chain.height()?;
        let rows = contracts
            .iter()
            .map(|c| ContractSummary::new(c, height))
            .collect();
        Ok((height, rows))
    }

    /// Attach the host's latest announced address to a contract.
    pub(crate) fn resolve_handle(&self, contract: &Contract) -> Result<ContractHandle, WorkerError> {
        let host_addr = self.services.hosts.host_address(&contract.host_key)?;
        Ok(ContractHandle {
            id: contract.id,
            host_key: contract.host_key,
            host_addr,
        })
    }
}
