//! # Download Subcommand
//!
//! `renterc download <key> <dest>` reconstructs an object into a local file
//! and prints its checksum. `renterc download <key> --dry-run` prints the
//! request the slab transport would receive for each slab and touches
//! nothing.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Args;
use renter_worker::DownloadRequest;

/// Arguments for the `renterc download` subcommand.
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Object key.
    pub key: String,

    /// Destination file. Not allowed with `--dry-run`.
    pub dest: Option<PathBuf>,

    /// Print the per-slab download requests instead of downloading.
    #[arg(long)]
    pub dry_run: bool,

    /// Overwrite an existing destination without asking.
    #[arg(short = 'y', long)]
    pub yes: bool,

    /// Checksum algorithm: sha256, sha1 or md5. Defaults to `RENTER_DIGEST`.
    #[arg(long)]
    pub digest: Option<String>,
}

/// Execute the download subcommand.
pub fn run_download(args: &DownloadArgs, data_dir: &Path) -> Result<u8> {
    let config = crate::load_config()?;
    let digest = args
        .digest
        .clone()
        .unwrap_or_else(|| config.digest.to_string());

    let dest = match (args.dry_run, &args.dest) {
        (true, Some(_)) => bail!("only the object key is allowed with --dry-run"),
        (true, None) => None,
        (false, Some(dest)) => Some(dest),
        (false, None) => bail!("<key> and <dest> are required"),
    };
    let worker = crate::open_worker(data_dir, config)?;

    let Some(dest) = dest else {
        let requests = worker
            .dry_run(&args.key)
            .with_context(|| format!("failed to plan download of {:?}", args.key))?;
        print_requests(&mut io::stdout().lock(), &requests)?;
        return Ok(0);
    };

    if dest.exists() && !args.yes {
        let stdin = io::stdin();
        if !confirm_overwrite(dest, &mut stdin.lock(), &mut io::stdout())? {
            bail!("download aborted");
        }
    }

    println!("Downloading object with key {}", args.key);
    let start = Instant::now();
    let report = worker
        .download(&args.key, dest, &digest)
        .with_context(|| format!("failed to download {:?}", args.key))?;
    println!(
        "Downloaded {} ({} bytes) in {:.2?} ({})",
        report.key,
        report.length,
        start.elapsed(),
        report.checksum
    );
    Ok(0)
}

/// Print each request as `-- Request i of n --` followed by indented JSON.
pub fn print_requests(out: &mut impl Write, requests: &[DownloadRequest]) -> Result<()> {
    let n = requests.len();
    for (i, request) in requests.iter().enumerate() {
        writeln!(out, "-- Request {} of {n} --", i + 1)?;
        writeln!(out, "{}", serde_json::to_string_pretty(request)?)?;
    }
    Ok(())
}

/// Ask whether to overwrite `path`. Only `y` or `yes` (any case) confirms.
pub fn confirm_overwrite(path: &Path, input: &mut impl BufRead, out: &mut impl Write) -> Result<bool> {
    write!(out, "file {} already exists. Overwrite? (y/n): ", path.display())?;
    out.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
