//! # Localnet Subcommand
//!
//! Seeds the collaborator state behind the local data directory: contracts
//! formed elsewhere, host announcements and the chain height. None of these
//! negotiate anything; they only record state the worker will read.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use renter_core::{parse_block_duration, ChainHeight, Contract, ContractId, Currency, HostKey};

/// Arguments for the `renterc localnet` subcommand.
#[derive(Args, Debug)]
pub struct LocalnetArgs {
    #[command(subcommand)]
    pub command: LocalnetCommand,
}

/// Local network seeding subcommands.
#[derive(Subcommand, Debug)]
pub enum LocalnetCommand {
    /// Record a contract with a host.
    SeedContract {
        /// Host public key (`ed25519:<hex>`).
        #[arg(long)]
        host: String,
        /// Contract id (`fcid:<hex>`). Random if omitted.
        #[arg(long)]
        id: Option<String>,
        /// Absolute end height.
        #[arg(long, conflicts_with = "duration", required_unless_present = "duration")]
        end_height: Option<u64>,
        /// Duration from the current height (e.g. `2w`, `30d`, `1y`).
        #[arg(long)]
        duration: Option<String>,
        /// Height the proof window opens. Defaults to the end height.
        #[arg(long)]
        proof_window_start: Option<u64>,
        /// Renter funds remaining in the contract.
        #[arg(long, default_value = "1000000000")]
        funds: String,
        /// Also announce the host at this address.
        #[arg(long)]
        addr: Option<String>,
    },

    /// Record a host announcement. The latest announcement wins.
    AnnounceHost {
        /// Host public key (`ed25519:<hex>`).
        host: String,
        /// Network address, e.g. `203.0.113.7:9982`.
        addr: String,
    },

    /// Set the chain height.
    SetHeight {
        /// New block height.
        height: u64,
    },

    /// Print the chain height.
    Height,
}

/// Execute the localnet subcommand.
pub fn run_localnet(args: &LocalnetArgs, data_dir: &Path) -> Result<u8> {
    let net = crate::open_network(data_dir)?;
    match &args.command {
        LocalnetCommand::SeedContract {
            host,
            id,
            end_height,
            duration,
            proof_window_start,
            funds,
            addr,
        } => {
            let host: HostKey = host
                .parse()
                .with_context(|| format!("invalid host key {host:?}"))?;
            let id = match id {
                Some(raw) => raw
                    .parse()
                    .with_context(|| format!("invalid contract id {raw:?}"))?,
                None => ContractId(rand::random()),
            };
            let end_height = match (end_height, duration) {
                (Some(h), _) => *h,
                (None, Some(raw)) => {
                    let blocks = parse_block_duration(raw)
                        .with_context(|| format!("invalid --duration {raw:?}"))?;
                    net.height()?.saturating_add(blocks)
                }
                (None, None) => anyhow::bail!("either --end-height or --duration is required"),
            };
            let renter_funds: Currency = funds
                .parse()
                .with_context(|| format!("invalid --funds {funds:?}"))?;

            net.add_contract(Contract {
                id,
                host_key: host,
                end_height,
                proof_window_start: proof_window_start.unwrap_or(end_height),
                renter_funds,
            })?;
            if let Some(addr) = addr {
                net.announce_host(host, addr.as_str())?;
            }
            println!("Seeded contract {id} with host {host} (ends at {end_height})");
        }
        LocalnetCommand::AnnounceHost { host, addr } => {
            let host: HostKey = host
                .parse()
                .with_context(|| format!("invalid host key {host:?}"))?;
            net.announce_host(host, addr.as_str())?;
            println!("Announced {host} at {addr}");
        }
        LocalnetCommand::SetHeight { height } => {
            net.set_height(*height)?;
            println!("Height set to {height}");
        }
        LocalnetCommand::Height => {
            println!("{}", net.height()?);
        }
    }
    Ok(0)
}
