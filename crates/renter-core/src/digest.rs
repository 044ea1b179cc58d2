//! # Checksum Digests
//!
//! Per-file integrity checksums computed while bytes stream through the
//! upload and download pipelines. The algorithm is chosen by name from a
//! small fixed set; [`StreamHasher`] is an `io::Write` sink so it can sit
//! behind a fan-out writer next to the real destination.

use std::fmt;
use std::io;
use std::str::FromStr;

use md5::Md5;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::DigestError;
use crate::identity::to_hex;

/// The hash algorithm used for a file checksum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    /// SHA-256.
    #[default]
    Sha256,
    /// SHA-1. Kept for compatibility with existing checksum listings.
    Sha1,
    /// MD5. Kept for compatibility with existing checksum listings.
    Md5,
}

impl ChecksumAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha256 => "sha256",
            Self::Sha1 => "sha1",
            Self::Md5 => "md5",
        }
    }
}

impl fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChecksumAlgorithm {
    type Err = DigestError;

    /// Parse an algorithm name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha256" => Ok(Self::Sha256),
            "sha1" => Ok(Self::Sha1),
            "md5" => Ok(Self::Md5),
            _ => Err(DigestError::Unsupported(s.to_string())),
        }
    }
}

/// A finished checksum with its algorithm tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum {
    /// The algorithm that produced this checksum.
    pub algorithm: ChecksumAlgorithm,
    /// Raw digest bytes (32, 20 or 16 bytes long).
    pub bytes: Vec<u8>,
}

impl Checksum {
    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        to_hex(&self.bytes)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.to_hex())
    }
}

/// Incremental hasher over one of the supported algorithms.
#[derive(Clone)]
pub enum StreamHasher {
    Sha256(Sha256),
    Sha1(Sha1),
    Md5(Md5),
}

impl StreamHasher {
    /// Start a fresh hash.
    pub fn new(algorithm: ChecksumAlgorithm) -> Self {
        match algorithm {
            ChecksumAlgorithm::Sha256 => Self::Sha256(Sha256::new()),
            ChecksumAlgorithm::Sha1 => Self::Sha1(Sha1::new()),
            ChecksumAlgorithm::Md5 => Self::Md5(Md5::new()),
        }
    }

    /// The algorithm this hasher computes.
    pub fn algorithm(&self) -> ChecksumAlgorithm {
        match self {
            Self::Sha256(_) => ChecksumAlgorithm::Sha256,
            Self::Sha1(_) => ChecksumAlgorithm::Sha1,
            Self::Md5(_) => ChecksumAlgorithm::Md5,
        }
    }

    /// Feed bytes into the hash.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha256(h) => h.update(data),
            Self::Sha1(h) => h.update(data),
            Self::Md5(h) => h.update(data),
        }
    }

    /// Consume the hasher and produce the checksum.
    pub fn finalize(self) -> Checksum {
        let algorithm = self.algorithm();
        let bytes = match self {
            Self::Sha256(h) => h.finalize().to_vec(),
            Self::Sha1(h) => h.finalize().to_vec(),
            Self::Md5(h) => h.finalize().to_vec(),
        };
        Checksum { algorithm, bytes }
    }
}

impl fmt::Debug for StreamHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StreamHasher").field(&self.algorithm()).finish()
    }
}

impl io::Write for StreamHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn hex_of(algorithm: ChecksumAlgorithm, data: &[u8]) -> String {
        let mut h = StreamHasher::new(algorithm);
        h.update(data);
        h.finalize().to_hex()
    }

    #[test]
    fn test_known_vectors() {
        assert_eq!(
            hex_of(ChecksumAlgorithm::Sha256, b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(
            hex_of(ChecksumAlgorithm::Sha1, b"abc"),
            "a9993e364706816aba3e25717850c26c9cd0d89d"
        );
        assert_eq!(
            hex_of(ChecksumAlgorithm::Md5, b"abc"),
            "900150983cd24fb0d6963f7d28e17f72"
        );
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("SHA256".parse(), Ok(ChecksumAlgorithm::Sha256));
        assert_eq!("Md5".parse(), Ok(ChecksumAlgorithm::Md5));
        assert_eq!(" sha1 ".parse(), Ok(ChecksumAlgorithm::Sha1));
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "blake2b".parse::<ChecksumAlgorithm>().unwrap_err();
        assert_eq!(err, DigestError::Unsupported("blake2b".into()));
    }

    #[test]
    fn test_incremental_matches_one_shot() {
        let mut h = StreamHasher::new(ChecksumAlgorithm::Sha256);
        h.write_all(b"a").unwrap();
        h.write_all(b"bc").unwrap();
        assert_eq!(h.finalize().to_hex(), hex_of(ChecksumAlgorithm::Sha256, b"abc"));
    }

    #[test]
    fn test_checksum_display() {
        let c = StreamHasher::new(ChecksumAlgorithm::Md5).finalize();
        let s = c.to_string();
        assert!(s.starts_with("md5:"));
        assert_eq!(s.len(), 4 + 32);
    }
}
