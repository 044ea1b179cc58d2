//! # Upload Subcommand
//!
//! Packs one or more files into slabs and registers one object per file,
//! keyed by the file's base name. `-m` is the number of shards needed to
//! recover a slab and `-n` the number of hosts it is spread over; `-m 1 -n 3`
//! survives the loss of any two hosts. Contracts with at least `n` hosts
//! must exist before uploading.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use renter_core::parse_byte_size;
use renter_worker::UploadReport;

/// Arguments for the `renterc upload` subcommand.
#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Shards required to recover each slab.
    #[arg(short = 'm', long = "min-shards", default_value_t = 1)]
    pub min_shards: u8,

    /// Shards (hosts) each slab is spread over.
    #[arg(short = 'n', long = "total-shards", default_value_t = 1)]
    pub total_shards: u8,

    /// Checksum algorithm: sha256, sha1 or md5. Defaults to `RENTER_DIGEST`.
    #[arg(long)]
    pub digest: Option<String>,

    /// Sector size override (e.g. `4MiB`). Defaults to `RENTER_SECTOR_SIZE`.
    #[arg(long)]
    pub sector_size: Option<String>,

    /// Files to upload, packed in this order.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Execute the upload subcommand.
pub fn run_upload(args: &UploadArgs, data_dir: &Path) -> Result<u8> {
    let mut config = crate::load_config()?;
    if let Some(raw) = &args.sector_size {
        config.sector_size =
            parse_byte_size(raw).with_context(|| format!("invalid --sector-size {raw:?}"))?;
    }
    let digest = args
        .digest
        .clone()
        .unwrap_or_else(|| config.digest.to_string());
    let worker = crate::open_worker(data_dir, config)?;

    println!("Uploading {} objects", args.files.len());
    let start = Instant::now();
    let report = worker
        .upload(&args.files, args.min_shards, args.total_shards, &digest)
        .context("failed to upload files")?;
    print_report(&report);
    println!(
        "Uploaded {} objects ({} bytes, {} slabs) in {:.2?}",
        report.objects.len(),
        report.total_length(),
        report.slabs,
        start.elapsed()
    );
    Ok(0)
}

fn print_report(report: &UploadReport) {
    for object in &report.objects {
        println!(
            "Added object {} - {} bytes ({})",
            object.key, object.length, object.checksum
        );
    }
}
