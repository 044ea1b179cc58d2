//! Contracts, chain height and host announcements.

use std::collections::BTreeMap;
use std::fs;

use renter_core::{
    ChainHeight, Contract, ContractDirectory, ContractId, HostDirectory, HostKey, ServiceError,
};

use crate::{LocalNetwork, LocalnetError, CONTRACTS_FILE, HEIGHT_FILE, HOSTS_FILE};

type Announcements = BTreeMap<HostKey, Vec<String>>;

impl LocalNetwork {
    /// Insert a contract, replacing any existing contract with the same id.
    pub fn add_contract(&self, contract: Contract) -> Result<(), LocalnetError> {
        tracing::debug!(contract = %contract.id, host = %contract.host_key, "seeding contract");
        self.update_json(CONTRACTS_FILE, |contracts: &mut Vec<Contract>| {
            match contracts.iter_mut().find(|c| c.id == contract.id) {
                Some(existing) => *existing = contract,
                None => contracts.push(contract),
            }
        })
    }

    /// Record a host announcement. The latest announcement wins.
    pub fn announce_host(&self, host: HostKey, addr: impl Into<String>) -> Result<(), LocalnetError> {
        let addr = addr.into();
        tracing::debug!(host = %host, addr = %addr, "announcing host");
        self.update_json(HOSTS_FILE, |hosts: &mut Announcements| {
            hosts.entry(host).or_default().push(addr);
        })
    }

    /// Set the chain height.
    pub fn set_height(&self, height: u64) -> Result<(), LocalnetError> {
        let _guard = self.meta_lock.lock();
        crate::write_atomic(&self.path(HEIGHT_FILE), format!("{height}\n").as_bytes())
    }

    fn read_height(&self) -> Result<u64, LocalnetError> {
        let path = self.path(HEIGHT_FILE);
        match fs::read_to_string(&path) {
            Ok(raw) => raw.trim().parse().map_err(|_| LocalnetError::Height {
                path,
                value: raw.trim().to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(LocalnetError::io(path, e)),
        }
    }
}

impl ContractDirectory for LocalNetwork {
    fn contracts(&self) -> Result<Vec<Contract>, ServiceError> {
        Ok(self.read_json(CONTRACTS_FILE)?)
    }

    fn contract(&self, id: &ContractId) -> Result<Contract, ServiceError> {
        let contracts: Vec<Contract> = self.read_json(CONTRACTS_FILE)?;
        contracts
            .into_iter()
            .find(|c| c.id == *id)
            .ok_or_else(|| ServiceError::NotFound(format!("contract {id}")))
    }

    fn delete_contract(&self, id: &ContractId) -> Result<(), ServiceError> {
        let removed = self.update_json(CONTRACTS_FILE, |contracts: &mut Vec<Contract>| {
            let before = contracts.len();
            contracts.retain(|c| c.id != *id);
            before != contracts.len()
        })?;
        if !removed {
            return Err(ServiceError::NotFound(format!("contract {id}")));
        }
        tracing::debug!(contract = %id, "deleted contract");
        Ok(())
    }
}

impl ChainHeight for LocalNetwork {
    fn height(&self) -> Result<u64, ServiceError> {
        Ok(self.read_height()?)
    }
}

impl HostDirectory for LocalNetwork {
    fn host_address(&self, host: &HostKey) -> Result<String, ServiceError> {
        let hosts: Announcements = self.read_json(HOSTS_FILE)?;
        hosts
            .get(host)
            .and_then(|addrs| addrs.last())
            .cloned()
            .ok_or_else(|| ServiceError::NotFound(format!("no announcement for host {host}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use renter_core::Currency;

    fn contract(tag: u8, end_height: u64) -> Contract {
        Contract {
            id: ContractId([tag; 32]),
            host_key: HostKey([tag; 32]),
            end_height,
            proof_window_start: end_height,
            renter_funds: Currency(1),
        }
    }

    #[test]
    fn empty_directory_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let net = LocalNetwork::open(dir.path()).unwrap();
        assert!(net.contracts().unwrap().is_empty());
        assert_eq!(net.height().unwrap(), 0);
        assert!(matches!(
            net.host_address(&HostKey([1; 32])),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn contracts_persist_and_replace_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let net = LocalNetwork::open(dir.path()).unwrap();
        net.add_contract(contract(1, 100)).unwrap();
        net.add_contract(contract(2, 200)).unwrap();
        net.add_contract(contract(1, 300)).unwrap();

        let reopened = LocalNetwork::open(dir.path()).unwrap();
        let all = reopened.contracts().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(reopened.contract(&ContractId([1; 32])).unwrap().end_height, 300);
    }

    #[test]
    fn delete_reports_missing_contract() {
        let dir = tempfile::tempdir().unwrap();
        let net = LocalNetwork::open(dir.path()).unwrap();
        net.add_contract(contract(1, 100)).unwrap();
        net.delete_contract(&ContractId([1; 32])).unwrap();
        assert!(matches!(
            net.delete_contract(&ContractId([1; 32])),
            Err(ServiceError::NotFound(_))
        ));
    }

    #[test]
    fn latest_announcement_wins() {
        let dir = tempfile::tempdir().unwrap();
        let net = LocalNetwork::open(dir.path()).unwrap();
        let host = HostKey([4; 32]);
        net.announce_host(host, "old.example:9982").unwrap();
        net.announce_host(host, "new.example:9982").unwrap();
        assert_eq!(net.host_address(&host).unwrap(), "new.example:9982");
    }

    #[test]
    fn height_round_trips_and_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let net = LocalNetwork::open(dir.path()).unwrap();
        net.set_height(4321).unwrap();
        assert_eq!(net.height().unwrap(), 4321);

        fs::write(dir.path().join(HEIGHT_FILE), "soon").unwrap();
        assert!(matches!(net.height(), Err(ServiceError::Unavailable(_))));
    }

    #[test]
    fn corrupt_metadata_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let net = LocalNetwork::open(dir.path()).unwrap();
        fs::write(dir.path().join(CONTRACTS_FILE), "{not json").unwrap();
        let err = net.contracts().unwrap_err();
        assert!(err.to_string().contains("corrupt metadata"));
    }
}
