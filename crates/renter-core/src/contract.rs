//! # Storage Contracts
//!
//! A contract is a pre-negotiated storage agreement with one host, valid over
//! a block-height range and funded by the renter. Contracts are formed and
//! owned by an external collaborator; this layer only reads them and prunes
//! the ones that have expired.
//!
//! ## Liveness
//!
//! At chain height `h` a contract is usable iff
//!
//! ```text
//! h < end_height  &&  h < proof_window_start − 144  &&  renter_funds > 0
//! ```
//!
//! The 144-block margin (one day of blocks) keeps new work away from
//! contracts whose storage-proof window is about to open. A contract with
//! `h > end_height` has expired and may be deleted from the directory.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::identity::{ContractId, HostKey};

/// Blocks before the proof window during which a contract is not used.
pub const PROOF_WINDOW_MARGIN: u64 = 144;

/// An amount of the chain's base currency unit.
///
/// Serialized as a decimal string; amounts routinely exceed `u64`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Currency(pub u128);

impl Currency {
    /// Whether the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Currency {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Currency)
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> String {
        c.to_string()
    }
}

impl TryFrom<String> for Currency {
    type Error = std::num::ParseIntError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A storage contract as reported by the contract directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// Contract identifier.
    pub id: ContractId,
    /// Public key of the host on the other side of the agreement.
    pub host_key: HostKey,
    /// Block height at which the agreement expires.
    pub end_height: u64,
    /// Block height at which the host's storage-proof window opens.
    pub proof_window_start: u64,
    /// Remaining value of the renter's valid proof output.
    pub renter_funds: Currency,
}

/// Why a contract is or is not usable at a given height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Liveness {
    /// Usable for new uploads and downloads.
    Usable,
    /// Past its end height; eligible for deletion.
    Expired,
    /// At or past `proof_window_start − 144`, or at its end height.
    NearProofWindow,
    /// No renter funds remain.
    Drained,
}

impl Liveness {
    /// Whether the contract may be used.
    pub fn is_usable(&self) -> bool {
        matches!(self, Self::Usable)
    }
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Usable => "usable",
            Self::Expired => "expired",
            Self::NearProofWindow => "near-proof-window",
            Self::Drained => "drained",
        };
        f.write_str(s)
    }
}

impl Contract {
    /// Whether the contract is past its end height.
    pub fn is_expired(&self, height: u64) -> bool {
        height > self.end_height
    }

    /// Classify the contract at the given chain height.
    ///
    /// A `proof_window_start` below the margin saturates to zero, which makes
    /// the contract unusable at every height.
    pub fn liveness(&self, height: u64) -> Liveness {
        if self.is_expired(height) {
            Liveness::Expired
        } else if height >= self.end_height
            || height >= self.proof_window_start.saturating_sub(PROOF_WINDOW_MARGIN)
        {
            Liveness::NearProofWindow
        } else if self.renter_funds.is_zero() {
            Liveness::Drained
        } else {
            Liveness::Usable
        }
    }
}

/// Everything the slab transport needs to reach a host under a contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractHandle {
    /// Contract identifier.
    pub id: ContractId,
    /// Host public key.
    pub host_key: HostKey,
    /// Host's most recently announced network address.
    pub host_addr: String,
}

/// One row of a contract listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSummary {
    /// Contract identifier.
    pub id: ContractId,
    /// Host public key.
    pub host_key: HostKey,
    /// Whether the chain has reached the end height.
    pub expired: bool,
    /// Liveness classification at the listing height.
    pub liveness: Liveness,
    /// Expiration height.
    pub end_height: u64,
    /// Unspent renter funds.
    pub renter_funds: Currency,
}

impl ContractSummary {
    /// Summarize a contract at the given height.
    pub fn new(contract: &Contract, height: u64) -> Self {
        Self {
            id: contract.id,
            host_key: contract.host_key,
            expired: height >= contract.end_height,
            liveness: contract.liveness(height),
            end_height: contract.end_height,
            renter_funds: contract.renter_funds,
        }
    }
}
