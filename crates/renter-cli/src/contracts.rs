//! # Contracts Subcommand
//!
//! - `renterc contracts` — table of every contract at the current height.
//! - `renterc contracts <id>` — one contract as JSON.
//! - `renterc contracts prune` — delete expired contracts from the directory.

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use renter_core::{ContractDirectory, ContractId, ContractSummary};
use renter_worker::Worker;

/// Arguments for the `renterc contracts` subcommand.
#[derive(Args, Debug)]
#[command(args_conflicts_with_subcommands = true)]
pub struct ContractsArgs {
    #[command(subcommand)]
    pub command: Option<ContractsCommand>,

    /// Show a single contract (e.g. `fcid:<64 hex>`).
    pub id: Option<String>,
}

/// Contract maintenance subcommands.
#[derive(Subcommand, Debug)]
pub enum ContractsCommand {
    /// Delete every contract past its end height.
    Prune,
}

/// Execute the contracts subcommand.
pub fn run_contracts(args: &ContractsArgs, data_dir: &Path) -> Result<u8> {
    match (&args.command, &args.id) {
        (Some(ContractsCommand::Prune), _) => {
            let worker = crate::open_worker(data_dir, crate::load_config()?)?;
            cmd_prune(&worker)
        }
        (None, Some(id)) => cmd_show(data_dir, id),
        (None, None) => {
            let worker = crate::open_worker(data_dir, crate::load_config()?)?;
            cmd_list(&worker)
        }
    }
}

fn cmd_list(worker: &Worker) -> Result<u8> {
    let (height, rows) = worker
        .contract_summaries()
        .context("failed to list contracts")?;
    if rows.is_empty() {
        println!("No contracts found.");
        return Ok(0);
    }
    println!("Contracts ({}) at height {height}:", rows.len());
    print!("{}", render_table(&rows));
    Ok(0)
}

fn cmd_show(data_dir: &Path, id: &str) -> Result<u8> {
    let id: ContractId = id
        .parse()
        .with_context(|| format!("invalid contract id {id:?}"))?;
    let net = crate::open_network(data_dir)?;
    let contract = net
        .contract(&id)
        .with_context(|| format!("failed to get contract {id}"))?;
    println!("{}", serde_json::to_string_pretty(&contract)?);
    Ok(0)
}

fn cmd_prune(worker: &Worker) -> Result<u8> {
    let partition = worker
        .contract_partition()
        .context("failed to list contracts")?;
    if partition.expired.is_empty() {
        println!("No expired contracts at height {}.", partition.height);
        return Ok(0);
    }
    let pruned = worker.prune_expired(&partition.expired);
    println!(
        "Pruned {pruned} of {} expired contracts at height {}.",
        partition.expired.len(),
        partition.height
    );
    Ok(if pruned == partition.expired.len() { 0 } else { 1 })
}

/// Render contract rows as an aligned text table.
pub fn render_table(rows: &[ContractSummary]) -> String {
    let header = ["ID", "Expired", "Host", "Expiration Height", "Unspent Funds"];
    let body: Vec<[String; 5]> = rows
        .iter()
        .map(|r| {
            [
                r.id.to_string(),
                r.expired.to_string(),
                r.host_key.to_string(),
                r.end_height.to_string(),
                r.renter_funds.to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: [&str; 5]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };
    push_row(header);
    for row in &body {
        push_row([&row[0], &row[1], &row[2], &row[3], &row[4]]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use renter_core::{ChainHeight, Contract, Currency, HostKey};

    #[test]
    fn table_has_header_and_one_line_per_contract() {
        let dir = tempfile::tempdir().unwrap();
        testing::seed(dir.path(), 2);
        let worker = crate::open_worker(dir.path(), testing::config()).unwrap();
        let (_, rows) = worker.contract_summaries().unwrap();
        let table = render_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[0].contains("Unspent Funds"));
        assert!(lines[1].starts_with("fcid:"));
        assert!(lines[1].contains("false"));
    }

    #[test]
    fn prune_removes_only_expired() {
        let dir = tempfile::tempdir().unwrap();
        let net = testing::seed(dir.path(), 2);
        net.add_contract(Contract {
            id: ContractId([9; 32]),
            host_key: HostKey([9; 32]),
            end_height: 50,
            proof_window_start: 50,
            renter_funds: Currency(1),
        })
        .unwrap();
        assert_eq!(net.height().unwrap(), 100);

        let worker = crate::open_worker(dir.path(), testing::config()).unwrap();
        assert_eq!(cmd_prune(&worker).unwrap(), 0);
        let left = net.contracts().unwrap();
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|c| c.id != ContractId([9; 32])));
    }

    #[test]
    fn show_rejects_malformed_id() {
        let dir = tempfile::tempdir().unwrap();
        assert!(cmd_show(dir.path(), "not-an-id").is_err());
    }

    #[test]
    fn show_prints_known_contract() {
        let dir = tempfile::tempdir().unwrap();
        testing::seed(dir.path(), 1);
        let id = ContractId([1; 32]).to_string();
        assert_eq!(cmd_show(dir.path(), &id).unwrap(), 0);
    }
}
