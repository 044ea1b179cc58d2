//! # renter-cli — Operator CLI for the Renter Stack
//!
//! Provides the `renterc` command-line interface over a [`Worker`] wired to
//! the directory-backed [`LocalNetwork`] collaborators.
//!
//! ## Subcommands
//!
//! - `renterc contracts` — List contracts, show one, or prune expired ones.
//! - `renterc objects` — List object keys or print one object.
//! - `renterc upload` — Pack files into slabs and register one object each.
//! - `renterc download` — Reconstruct an object, or print its slab requests.
//! - `renterc localnet` — Seed contracts, host announcements and height.
//!
//! ```bash
//! renterc localnet set-height 100
//! renterc localnet seed-contract --host ed25519:<hex> --duration 2w --addr 10.0.0.7:9982
//! renterc upload -m 1 -n 1 notes.txt photo.jpg
//! renterc download photo.jpg ./photo.jpg --digest sha1
//! ```

pub mod contracts;
pub mod download;
pub mod localnet;
pub mod objects;
pub mod upload;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use renter_localnet::LocalNetwork;
use renter_worker::{Services, Worker, WorkerConfig};

/// Open the local network directory.
pub fn open_network(data_dir: &Path) -> Result<Arc<LocalNetwork>> {
    let net = LocalNetwork::open(data_dir)
        .with_context(|| format!("failed to open data directory {}", data_dir.display()))?;
    Ok(Arc::new(net))
}

/// Load worker configuration from the environment.
pub fn load_config() -> Result<WorkerConfig> {
    WorkerConfig::from_env().context("invalid worker configuration")
}

/// Build a worker whose collaborators all live under `data_dir`.
pub fn open_worker(data_dir: &Path, config: WorkerConfig) -> Result<Worker> {
    config.validate().context("invalid worker configuration")?;
    let net = open_network(data_dir)?;
    Ok(Worker::new(Services::from_backend(net), config))
}
