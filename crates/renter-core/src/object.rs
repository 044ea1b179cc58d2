//! # Objects
//!
//! An object is one uploaded file: a name, a per-object encryption key and
//! the ordered slab windows holding its bytes. Objects are created once per
//! uploaded file and never modified by this layer.

use serde::{Deserialize, Serialize};

use crate::identity::EncryptionKey;
use crate::slab::SlabSlice;

/// A named, encrypted sequence of slab slices representing one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Object {
    /// Object key (the uploaded file's base name).
    pub key: String,
    /// Encryption key for the object's data.
    pub encryption_key: EncryptionKey,
    /// Slab windows in file order.
    pub slabs: Vec<SlabSlice>,
}

impl Object {
    /// Create an object with a freshly generated encryption key.
    pub fn new(key: impl Into<String>, slabs: Vec<SlabSlice>) -> Self {
        Self {
            key: key.into(),
            encryption_key: EncryptionKey::generate(),
            slabs,
        }
    }

    /// Total object length in bytes.
    pub fn length(&self) -> u64 {
        self.slabs.iter().map(|s| s.length).sum()
    }
}
