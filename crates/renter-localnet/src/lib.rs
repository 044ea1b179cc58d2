//! # renter-localnet — Directory-Backed Collaborators
//!
//! A single [`LocalNetwork`] implements every collaborator trait from
//! [`renter_core::services`] on top of one directory, so the worker and the
//! CLI can run complete upload and download jobs without a network.
//!
//! ## Layout
//!
//! ```text
//! <root>/
//!   contracts.json                  Vec<Contract>
//!   hosts.json                      host key → announced addresses (latest last)
//!   height                          current block height, decimal text
//!   objects.json                    key → Object
//!   sectors/<host hex>/<root hex>.bin
//! ```
//!
//! Missing files read as empty (height 0). Metadata files are rewritten
//! whole through a temporary file and a rename; a process-local lock
//! serializes read-modify-write cycles.
//!
//! ## Shards
//!
//! The transport stores a full copy of the slab payload as every shard.
//! That satisfies the m-of-n contract trivially: any `m ≥ 1` reachable shards
//! reconstruct the slab. Downloads still refuse to proceed with fewer than
//! `m` reachable, intact shards so shard-loss scenarios behave as they would
//! against real hosts.

pub mod error;
pub mod network;
pub mod objects;
pub mod transport;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use error::LocalnetError;

const CONTRACTS_FILE: &str = "contracts.json";
const HOSTS_FILE: &str = "hosts.json";
const HEIGHT_FILE: &str = "height";
const OBJECTS_FILE: &str = "objects.json";
const SECTORS_DIR: &str = "sectors";

/// Collaborator backend rooted at a local directory.
#[derive(Debug)]
pub struct LocalNetwork {
    root: PathBuf,
    meta_lock: Mutex<()>,
}

impl LocalNetwork {
    /// Open (creating if needed) a local network directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LocalnetError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| LocalnetError::io(&root, e))?;
        Ok(Self {
            root,
            meta_lock: Mutex::new(()),
        })
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Read a JSON metadata file, or the default value if it does not exist.
    fn read_json<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, LocalnetError> {
        let path = self.path(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(LocalnetError::io(path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|source| LocalnetError::Corrupt { path, source })
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), LocalnetError> {
        let path = self.path(name);
        let bytes = serde_json::to_vec_pretty(value).map_err(|source| LocalnetError::Corrupt {
            path: path.clone(),
            source,
        })?;
        write_atomic(&path, &bytes)
    }

    /// Apply `f` to a metadata file under the metadata lock and write the
    /// result back.
    fn update_json<T, R>(&self, name: &str, f: impl FnOnce(&mut T) -> R) -> Result<R, LocalnetError>
    where
        T: Serialize + DeserializeOwned + Default,
    {
        let _guard = self.meta_lock.lock();
        let mut value: T = self.read_json(name)?;
        let out = f(&mut value);
        self.write_json(name, &value)?;
        Ok(out)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), LocalnetError> {
    let tmp = path.with_extension("tmp");
    let mut f = fs::File::create(&tmp).map_err(|e| LocalnetError::io(&tmp, e))?;
    f.write_all(bytes).map_err(|e| LocalnetError::io(&tmp, e))?;
    f.sync_all().map_err(|e| LocalnetError::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| LocalnetError::io(path, e))
}
