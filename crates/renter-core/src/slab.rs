//! # Slabs, Shards and Slab Slices
//!
//! A slab is the erasure-coding unit: up to `m × SECTOR_SIZE` bytes of
//! payload encoded into `n` shards, any `m` of which reconstruct it. Each
//! shard is one sector on one host.
//!
//! Uploads pack several files into one continuous stream, so slab
//! boundaries rarely line up with file boundaries. An object therefore refers
//! to [`SlabSlice`]s: a slab plus the byte window of its payload that belongs
//! to the object. [`split_slabs()`] cuts those windows from the slab sequence
//! using the per-file lengths.

use serde::{Deserialize, Serialize};

use crate::error::SlabError;
use crate::identity::{HostKey, SectorRoot};

/// Size of one host sector in bytes (4 MiB).
pub const SECTOR_SIZE: u64 = 1 << 22;

/// Erasure-coding parameters `(m, n)` with `n ≥ m ≥ 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Redundancy {
    min_shards: u8,
    total_shards: u8,
}

impl Redundancy {
    /// Validate and build redundancy parameters.
    pub fn new(min_shards: u8, total_shards: u8) -> Result<Self, SlabError> {
        if min_shards == 0 || total_shards < min_shards {
            return Err(SlabError::InvalidRedundancy {
                min: min_shards,
                total: total_shards,
            });
        }
        Ok(Self {
            min_shards,
            total_shards,
        })
    }

    /// Shards required to reconstruct a slab (`m`).
    pub fn min_shards(&self) -> u8 {
        self.min_shards
    }

    /// Shards produced per slab (`n`).
    pub fn total_shards(&self) -> u8 {
        self.total_shards
    }

    /// Payload bytes carried by one full slab.
    ///
    /// Fails when the product is zero or does not fit in a `u64`.
    pub fn slab_size(&self, sector_size: u64) -> Result<u64, SlabError> {
        u64::from(self.min_shards)
            .checked_mul(sector_size)
            .filter(|&size| size > 0)
            .ok_or(SlabError::SlabSize {
                min_shards: self.min_shards,
                sector_size,
            })
    }
}

/// One shard of a slab: a sector stored on a specific host.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Sector {
    /// Host holding the sector.
    pub host: HostKey,
    /// Root of the stored sector.
    pub root: SectorRoot,
}

/// An erasure-coded slab as returned by the slab transport.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slab {
    /// Shards needed to reconstruct the payload.
    pub min_shards: u8,
    /// All shards, in encoding order.
    pub shards: Vec<Sector>,
    /// Payload bytes encoded in this slab.
    pub length: u64,
}

/// A byte window `[offset, offset + length)` of a slab's payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlabSlice {
    /// The underlying slab.
    pub slab: Slab,
    /// Start of the window within the slab payload.
    pub offset: u64,
    /// Length of the window.
    pub length: u64,
}

/// Partition a slab sequence into per-file slice sequences.
///
/// `lengths[i]` is the byte length of file `i` in the packed stream; the
/// result has one entry per length, in order. Zero-length files get an empty
/// sequence. The lengths must account for every slab byte exactly.
pub fn split_slabs(slabs: &[Slab], lengths: &[u64]) -> Result<Vec<Vec<SlabSlice>>, SlabError> {
    let available: u64 = slabs.iter().map(|s| s.length).sum();
    let requested: u64 = lengths.iter().sum();
    if requested > available {
        return Err(SlabError::Overrun {
            available,
            requested,
        });
    }
    if requested < available {
        return Err(SlabError::Underrun {
            available,
            requested,
        });
    }

    // Skip empty slabs up front so the cursor always points at payload.
    let mut remaining_slabs = slabs.iter().filter(|s| s.length > 0);
    let mut current = remaining_slabs.next();
    let mut offset = 0u64;

    let mut out = Vec::with_capacity(lengths.len());
    for &length in lengths {
        let mut slices = Vec::new();
        let mut left = length;
        while left > 0 {
            // Totals were checked above, so a slab is always available here.
            let Some(slab) = current else {
                return Err(SlabError::Overrun {
                    available,
                    requested,
                });
            };
            let take = left.min(slab.length - offset);
            slices.push(SlabSlice {
                slab: slab.clone(),
                offset,
                length: take,
            });
            offset += take;
            left -= take;
            if offset == slab.length {
                current = remaining_slabs.next();
                offset = 0;
            }
        }
        out.push(slices);
    }
    Ok(out)
}
