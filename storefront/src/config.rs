// storefront/src/config.rs

use crate::errors::{AppError, Result};
use crate::services::order_number::DEFAULT_PREFIX;
use crate::services::pricing::VariantPolicy;
use crate::services::validation::normalize_currency;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Postgres,
  /// In-process store; data is lost on restart.
  Memory,
}

impl FromStr for StoreBackend {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
      "memory" => Ok(StoreBackend::Memory),
      other => Err(format!("unknown store backend '{}'", other)),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

impl FromStr for LogFormat {
  type Err = String;

  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pretty" | "text" => Ok(LogFormat::Pretty),
      "json" => Ok(LogFormat::Json),
      other => Err(format!("unknown log format '{}'", other)),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  /// Required when `store_backend` is `Postgres`.
  pub database_url: Option<String>,
  pub database_max_connections: u32,
  pub run_migrations: bool,
  pub seed_db: bool,
  pub default_currency: String,
  pub order_number_prefix: String,
  pub variant_policy: VariantPolicy,
  pub log_format: LogFormat,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      store_backend: StoreBackend::Memory,
      database_url: None,
      database_max_connections: 10,
      run_migrations: true,
      seed_db: false,
      default_currency: "RUB".to_string(),
      order_number_prefix: DEFAULT_PREFIX.to_string(),
      variant_policy: VariantPolicy::Fallback,
      log_format: LogFormat::Pretty,
    }
  }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(var_name) {
    Some(raw) if !raw.trim().is_empty() => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    _ => Ok(default),
  }
}

impl AppConfig {
  /// Loads `.env` (if present) and reads the process environment.
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|var_name| env::var(var_name).ok())
  }

  /// Builds the configuration from an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = Self::default();

    let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse_var(&lookup, "SERVER_PORT", defaults.server_port)?;
    let store_backend = parse_var(&lookup, "STORE_BACKEND", StoreBackend::Postgres)?;
    let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required when STORE_BACKEND=postgres)".to_string(),
      ));
    }
    let database_max_connections = parse_var(&lookup, "DATABASE_MAX_CONNECTIONS", defaults.database_max_connections)?;
    if database_max_connections == 0 {
      return Err(AppError::Config("DATABASE_MAX_CONNECTIONS must be at least 1".to_string()));
    }
    let run_migrations = parse_var(&lookup, "RUN_MIGRATIONS", defaults.run_migrations)?;
    let seed_db = parse_var(&lookup, "SEED_DB", defaults.seed_db)?;

    let default_currency = match lookup("DEFAULT_CURRENCY") {
      None => defaults.default_currency,
      Some(raw) => normalize_currency(&raw)
        .ok_or_else(|| AppError::Config(format!("Invalid DEFAULT_CURRENCY value '{}'", raw)))?,
    };
    let order_number_prefix = match lookup("ORDER_NUMBER_PREFIX") {
      None => defaults.order_number_prefix,
      Some(raw) if !raw.trim().is_empty() && raw.trim().chars().all(|c| c.is_ascii_alphanumeric() || c == '-') => {
        raw.trim().to_string()
      }
      Some(raw) => return Err(AppError::Config(format!("Invalid ORDER_NUMBER_PREFIX value '{}'", raw))),
    };
    let variant_policy = parse_var(&lookup, "VARIANT_POLICY", defaults.variant_policy)?;
    let log_format = parse_var(&lookup, "LOG_FORMAT", defaults.log_format)?;

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      database_max_connections,
      run_migrations,
      seed_db,
      default_currency,
      order_number_prefix,
      variant_policy,
      log_format,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn load(vars: &[(&str, &str)]) -> Result<AppConfig> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    AppConfig::from_lookup(|k| map.get(k).cloned())
  }

  #[test]
  fn postgres_defaults() {
    let config = load(&[("DATABASE_URL", "postgres://localhost/bootbox")]).unwrap();
    assert_eq!(config.store_backend, StoreBackend::Postgres);
    assert_eq!(config.server_port, 8080);
    assert_eq!(config.default_currency, "RUB");
    assert_eq!(config.order_number_prefix, "BB");
    assert_eq!(config.variant_policy, VariantPolicy::Fallback);
    assert!(config.run_migrations);
    assert!(!config.seed_db);
  }

  #[test]
  fn postgres_needs_a_database_url() {
    assert!(matches!(load(&[]), Err(AppError::Config(_))));
  }

  #[test]
  fn memory_backend_with_overrides() {
    let config = load(&[
      ("STORE_BACKEND", "memory"),
      ("SERVER_PORT", "9090"),
      ("DEFAULT_CURRENCY", "eur"),
      ("VARIANT_POLICY", "strict"),
      ("LOG_FORMAT", "json"),
      ("SEED_DB", "true"),
    ])
    .unwrap();
    assert_eq!(config.store_backend, StoreBackend::Memory);
    assert_eq!(config.server_port, 9090);
    assert_eq!(config.default_currency, "EUR");
    assert_eq!(config.variant_policy, VariantPolicy::Strict);
    assert_eq!(config.log_format, LogFormat::Json);
    assert!(config.seed_db);
  }

  #[test]
  fn invalid_values_are_config_errors() {
    for (var, value) in [
      ("SERVER_PORT", "eighty"),
      ("VARIANT_POLICY", "lenient"),
      ("DEFAULT_CURRENCY", "RUBLE"),
      ("ORDER_NUMBER_PREFIX", "B B"),
      ("DATABASE_MAX_CONNECTIONS", "0"),
    ] {
      let result = load(&[("STORE_BACKEND", "memory"), (var, value)]);
      assert!(matches!(result, Err(AppError::Config(_))), "{}={} should be rejected", var, value);
    }
  }
}
