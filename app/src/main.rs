// orderflow_app/src/main.rs

mod cli;
mod config;
mod errors;

use crate::cli::{Cli, Command};
use crate::config::{AppConfig, LogFormat};
use crate::errors::Result as AppResult;

use clap::Parser;
use orderflow::{
  GetOrdersRequest, MemoryDatabase, MemoryOrderService, NewOrderUnit, OrderItemStore, OrderService, OrderStore,
  PgDatabase, PgOrderService, TransactionScope,
};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::fmt::format::FmtSpan; // For span events in tracing
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
  let cli = Cli::parse();

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      eprintln!("{}", e);
      std::process::exit(e.exit_code());
    }
  };
  init_tracing(app_config.log_format);

  let cancel = CancellationToken::new();
  let ctrl_c_token = cancel.clone();
  tokio::spawn(async move {
    match tokio::signal::ctrl_c().await {
      Ok(()) => {
        tracing::warn!("Interrupt received, cancelling the running operation.");
        ctrl_c_token.cancel();
      }
      Err(err) => tracing::error!(error = %err, "Unable to listen for interrupt signal."),
    }
  });

  if let Err(e) = run(cli.command, &app_config, &cancel).await {
    tracing::error!(error = %e, "Command failed.");
    std::process::exit(e.exit_code());
  }
}

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  // stdout carries the command's JSON output; logs go to stderr.
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter) // Allow RUST_LOG override
    .with_span_events(FmtSpan::CLOSE) // Log when spans close, showing duration
    .with_writer(std::io::stderr);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

async fn run(command: Command, config: &AppConfig, cancel: &CancellationToken) -> AppResult<()> {
  match &config.database_url {
    Some(url) => {
      let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(url)
        .await?;
      tracing::info!(max_connections = config.db_max_connections, "Connected to the database.");
      let service = PgOrderService::postgres(PgDatabase::new(pool));
      execute(&service, command, config, cancel).await
    }
    None => {
      tracing::info!("DATABASE_URL not set, using the in-memory store.");
      let service = MemoryOrderService::in_memory(MemoryDatabase::new());
      execute(&service, command, config, cancel).await
    }
  }
}

async fn execute<S, O, I>(
  service: &OrderService<S, O, I>,
  command: Command,
  config: &AppConfig,
  cancel: &CancellationToken,
) -> AppResult<()>
where
  S: TransactionScope + 'static,
  S::Tx: 'static,
  O: OrderStore<S::Tx> + 'static,
  I: OrderItemStore<S::Tx> + 'static,
{
  match command {
    Command::Insert { file } => {
      let raw = read_input(&file).await?;
      let units: Vec<NewOrderUnit> = serde_json::from_str(&raw)?;
      let inserted = service.batch_insert(units, cancel).await?;
      print_json(&inserted)
    }
    Command::List {
      ids,
      customer_ids,
      page,
      page_size,
      with_items,
    } => {
      let request = GetOrdersRequest {
        ids,
        customer_ids,
        page,
        page_size: page_size.unwrap_or(config.default_page_size),
        include_items: with_items,
      };
      let orders = service.get_orders(request, cancel).await?;
      print_json(&orders)
    }
  }
}

async fn read_input(path: &Path) -> AppResult<String> {
  if path.as_os_str() == "-" {
    let mut raw = String::new();
    tokio::io::stdin().read_to_string(&mut raw).await?;
    return Ok(raw);
  }
  Ok(tokio::fs::read_to_string(path).await?)
}

fn print_json<T: Serialize>(value: &T) -> AppResult<()> {
  let out = serde_json::to_string_pretty(value)?;
  println!("{}", out);
  Ok(())
}
