// orderflow_app/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use orderflow::DEFAULT_PAGE_SIZE;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  /// `None` runs against the in-memory store.
  pub database_url: Option<String>,
  pub db_max_connections: u32,
  pub default_page_size: u32,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());

    let database_url = get_env("DATABASE_URL");

    let db_max_connections = match get_env("DB_MAX_CONNECTIONS") {
      Some(raw) => raw
        .parse::<u32>()
        .map_err(|e| AppError::Config(format!("Invalid DB_MAX_CONNECTIONS: {}", e)))?,
      None => 5,
    };

    let default_page_size = match get_env("DEFAULT_PAGE_SIZE") {
      Some(raw) => match raw.parse::<u32>() {
        Ok(0) => return Err(AppError::Config("DEFAULT_PAGE_SIZE must be at least 1".to_string())),
        Ok(size) => size,
        Err(e) => return Err(AppError::Config(format!("Invalid DEFAULT_PAGE_SIZE: {}", e))),
      },
      None => DEFAULT_PAGE_SIZE,
    };

    let log_format = match get_env("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase).as_deref() {
      None | Some("pretty") => LogFormat::Pretty,
      Some("json") => LogFormat::Json,
      Some(other) => {
        return Err(AppError::Config(format!(
          "Invalid LOG_FORMAT '{}': expected 'pretty' or 'json'",
          other
        )))
      }
    };

    Ok(Self {
      database_url,
      db_max_connections,
      default_page_size,
      log_format,
    })
  }
}
