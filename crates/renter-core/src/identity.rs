//! # Identifier Newtypes
//!
//! 32-byte identifiers for contracts, hosts, sectors and object encryption
//! keys. Each has a prefixed lowercase-hex text form (`fcid:…`,
//! `ed25519:…`, `key:…`; sector roots are bare hex) used for display,
//! parsing and serde, so JSON documents stay human-readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IdError;

/// Render bytes as lowercase hex.
pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

fn decode_hex32(s: &str) -> Result<[u8; 32], IdError> {
    if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(IdError::InvalidHex(s.to_string()));
    }
    let mut out = [0u8; 32];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&s[2 * i..2 * i + 2], 16)
            .map_err(|_| IdError::InvalidHex(s.to_string()))?;
    }
    Ok(out)
}

macro_rules! hex_identifier {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(into = "String", try_from = "String")]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Text prefix of this identifier kind.
            pub const PREFIX: &'static str = $prefix;

            /// Access the raw bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Render the payload as lowercase hex, without the prefix.
            pub fn to_hex(&self) -> String {
                to_hex(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", Self::PREFIX, self.to_hex())
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let hex = s.strip_prefix(Self::PREFIX).ok_or_else(|| IdError::MissingPrefix {
                    expected: Self::PREFIX,
                    input: s.to_string(),
                })?;
                Ok(Self(decode_hex32(&hex.to_ascii_lowercase())?))
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.to_string()
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }
    };
}

hex_identifier!(
    /// Identifier of a storage contract, as assigned at formation.
    ContractId,
    "fcid:"
);

hex_identifier!(
    /// A host's ed25519 public key.
    HostKey,
    "ed25519:"
);

hex_identifier!(
    /// Merkle root of one stored sector; addresses a shard on its host.
    SectorRoot,
    ""
);

hex_identifier!(
    /// Per-object encryption key. Generated once when the object is created.
    EncryptionKey,
    "key:"
);

impl EncryptionKey {
    /// Generate a fresh random key from the thread-local CSPRNG.
    pub fn generate() -> Self {
        Self(rand::random())
    }
}
