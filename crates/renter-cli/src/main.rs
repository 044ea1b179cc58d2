//! # renterc CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use renter_cli::contracts::{run_contracts, ContractsArgs};
use renter_cli::download::{run_download, DownloadArgs};
use renter_cli::localnet::{run_localnet, LocalnetArgs};
use renter_cli::objects::{run_objects, ObjectsArgs};
use renter_cli::upload::{run_upload, UploadArgs};

/// renterc: store files across independent hosts with erasure-coded slabs.
///
/// Uploads pack files into slabs spread over `n` hosts, any `m` of which
/// recover the data. Downloads rebuild each slab from whichever shards still
/// have a live contract.
#[derive(Parser, Debug)]
#[command(name = "renterc", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Data directory holding contracts, hosts, objects and sectors.
    #[arg(short = 'd', long, global = true, env = "RENTER_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List contracts, show one, or prune expired ones.
    Contracts(ContractsArgs),

    /// List object keys or show one object.
    Objects(ObjectsArgs),

    /// Upload file(s), packing them into shared slabs.
    Upload(UploadArgs),

    /// Download an object, or print its slab requests with --dry-run.
    Download(DownloadArgs),

    /// Seed the local network: contracts, host announcements, height.
    Localnet(LocalnetArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(data_dir = %cli.data_dir.display(), "renterc starting");

    let result = match &cli.command {
        Commands::Contracts(args) => run_contracts(args, &cli.data_dir),
        Commands::Objects(args) => run_objects(args, &cli.data_dir),
        Commands::Upload(args) => run_upload(args, &cli.data_dir),
        Commands::Download(args) => run_download(args, &cli.data_dir),
        Commands::Localnet(args) => run_localnet(args, &cli.data_dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
