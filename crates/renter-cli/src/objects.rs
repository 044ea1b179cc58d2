//! # Objects Subcommand
//!
//! Lists object keys, or prints a single object (slab windows, shard
//! locations and encryption key) as JSON.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use renter_core::ObjectStore;

/// Arguments for the `renterc objects` subcommand.
#[derive(Args, Debug)]
pub struct ObjectsArgs {
    /// Print this object instead of listing keys.
    pub key: Option<String>,

    /// Only list keys starting with this prefix.
    #[arg(long, default_value = "", conflicts_with = "key")]
    pub prefix: String,
}

/// Execute the objects subcommand.
pub fn run_objects(args: &ObjectsArgs, data_dir: &Path) -> Result<u8> {
    let net = crate::open_network(data_dir)?;
    match &args.key {
        Some(key) => {
            let object = net
                .object(key)
                .with_context(|| format!("failed to get object {key:?}"))?;
            println!("{}", serde_json::to_string_pretty(&object)?);
        }
        None => {
            let keys = net
                .object_keys(&args.prefix)
                .context("failed to list objects")?;
            if keys.is_empty() {
                println!("No objects found.");
            } else {
                println!("Objects ({}):", keys.len());
                for key in &keys {
                    println!("  {key}");
                }
            }
        }
    }
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_object_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = ObjectsArgs {
            key: Some("nope".into()),
            prefix: String::new(),
        };
        assert!(run_objects(&args, dir.path()).is_err());
    }

    #[test]
    fn empty_listing_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let args = ObjectsArgs {
            key: None,
            prefix: String::new(),
        };
        assert_eq!(run_objects(&args, dir.path()).unwrap(), 0);
    }
}
