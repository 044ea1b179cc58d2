//! Worker configuration.
//!
//! Controls slab sizing, the upload pipe's memory bound and the default
//! checksum algorithm. Defaults match the host protocol's 4 MiB sectors.
//! Override via environment variables or explicit construction for tests.

use renter_core::{parse_byte_size, ChecksumAlgorithm, DigestError, UnitError, SECTOR_SIZE};

/// Largest accepted sector size (1 GiB).
pub const MAX_SECTOR_SIZE: u64 = 1 << 30;

/// Largest accepted pipe chunk (64 MiB).
pub const MAX_PIPE_CHUNK_SIZE: usize = 64 << 20;

/// Configuration for upload and download jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Bytes per host sector; a slab carries `min_shards × sector_size`.
    pub sector_size: u64,
    /// Chunks the upload pipe holds before the file reader blocks.
    pub pipe_depth: usize,
    /// Size of each chunk handed from the file reader to the uploader.
    pub pipe_chunk_size: usize,
    /// Checksum algorithm used when a job does not name one.
    pub digest: ChecksumAlgorithm,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sector_size: SECTOR_SIZE,
            pipe_depth: 4,
            pipe_chunk_size: 1 << 20,
            digest: ChecksumAlgorithm::Sha256,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `RENTER_SECTOR_SIZE` (default: `4MiB`, any unit accepted by
    ///   [`parse_byte_size`])
    /// - `RENTER_PIPE_DEPTH` (default: 4)
    /// - `RENTER_PIPE_CHUNK_SIZE` (default: `1MiB`)
    /// - `RENTER_DIGEST` (default: `sha256`)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            sector_size: match std::env::var("RENTER_SECTOR_SIZE") {
                Ok(raw) => parse_byte_size(&raw).map_err(|e| ConfigError::InvalidSize {
                    var: "RENTER_SECTOR_SIZE",
                    source: e,
                })?,
                Err(_) => defaults.sector_size,
            },
            pipe_depth: env_count("RENTER_PIPE_DEPTH", defaults.pipe_depth)?,
            pipe_chunk_size: match std::env::var("RENTER_PIPE_CHUNK_SIZE") {
                Ok(raw) => parse_byte_size(&raw)
                    .map_err(|e| ConfigError::InvalidSize {
                        var: "RENTER_PIPE_CHUNK_SIZE",
                        source: e,
                    })
                    .and_then(|n| {
                        usize::try_from(n).map_err(|_| ConfigError::Invalid {
                            var: "RENTER_PIPE_CHUNK_SIZE",
                            value: raw.clone(),
                        })
                    })?,
                Err(_) => defaults.pipe_chunk_size,
            },
            digest: match std::env::var("RENTER_DIGEST") {
                Ok(raw) => raw.parse()?,
                Err(_) => defaults.digest,
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would stall or break the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sector_size == 0 {
            return Err(ConfigError::Zero("sector_size"));
        }
        if self.pipe_depth == 0 {
            return Err(ConfigError::Zero("pipe_depth"));
        }
        if self.pipe_chunk_size == 0 {
            return Err(ConfigError::Zero("pipe_chunk_size"));
        }
        if self.sector_size > MAX_SECTOR_SIZE {
            return Err(ConfigError::TooLarge {
                field: "sector_size",
                value: self.sector_size,
                max: MAX_SECTOR_SIZE,
            });
        }
        if self.pipe_chunk_size > MAX_PIPE_CHUNK_SIZE {
            return Err(ConfigError::TooLarge {
                field: "pipe_chunk_size",
                value: self.pipe_chunk_size as u64,
                max: MAX_PIPE_CHUNK_SIZE as u64,
            });
        }
        Ok(())
    }
}

fn env_count(var: &'static str, default: usize) -> Result<usize, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { var, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid size in {var}: {source}")]
    InvalidSize {
        var: &'static str,
        #[source]
        source: UnitError,
    },
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
    #[error("{field} of {value} bytes exceeds the maximum of {max}")]
    TooLarge {
        field: &'static str,
        value: u64,
        max: u64,
    },
    #[error(transparent)]
    Digest(#[from] DigestError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let cfg = WorkerConfig::default();
        assert_eq!(cfg.sector_size, 4 << 20);
        assert_eq!(cfg.digest, ChecksumAlgorithm::Sha256);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn zero_depth_is_rejected() {
        let cfg = WorkerConfig {
            pipe_depth: 0,
            ..WorkerConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Zero("pipe_depth"))));
    }

    #[test]
    fn oversized_sector_is_rejected() {
        let cfg = WorkerConfig {
            sector_size: parse_byte_size("1048576TiB").unwrap(),
            ..WorkerConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::TooLarge { field: "sector_size", .. })
        ));

        let at_limit = WorkerConfig {
            sector_size: MAX_SECTOR_SIZE,
            ..WorkerConfig::default()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn oversized_chunk_is_rejected() {
        let cfg = WorkerConfig {
            pipe_chunk_size: MAX_PIPE_CHUNK_SIZE + 1,
            ..WorkerConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::TooLarge { field: "pipe_chunk_size", .. })
        ));
    }

    #[test]
    fn env_count_uses_default_when_var_absent() {
        assert_eq!(env_count("RENTER_NONEXISTENT_VAR_4821", 7).unwrap(), 7);
    }

    #[test]
    fn env_count_rejects_garbage() {
        std::env::set_var("RENTER_TEST_BAD_COUNT", "many");
        let result = env_count("RENTER_TEST_BAD_COUNT", 1);
        std::env::remove_var("RENTER_TEST_BAD_COUNT");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
