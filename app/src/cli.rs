// orderflow_app/src/cli.rs

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Batch-insert and read back orders with their line items.
///
/// Uses PostgreSQL when DATABASE_URL is set, otherwise a per-process
/// in-memory store.
#[derive(Debug, Parser)]
#[command(name = "orderflow", version, about)]
pub struct Cli {
  #[command(subcommand)]
  pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
  /// Insert a JSON array of orders (with items) as one transaction.
  Insert {
    /// JSON file to read, or `-` for stdin.
    file: PathBuf,
  },
  /// Print one page of orders as JSON.
  List {
    /// Restrict to these order ids (repeatable).
    #[arg(long = "id")]
    ids: Vec<i64>,
    /// Restrict to these customers (repeatable).
    #[arg(long = "customer-id")]
    customer_ids: Vec<i64>,
    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1)]
    page: u32,
    /// Orders per page. Defaults to DEFAULT_PAGE_SIZE.
    #[arg(long)]
    page_size: Option<u32>,
    /// Include each order's line items.
    #[arg(long)]
    with_items: bool,
  },
}
