// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use std::sync::Arc;

use storefront::config::{AppConfig, LogFormat, StoreBackend};
use storefront::seed::seed_demo_data;
use storefront::state::AppState;
use storefront::store::{MemoryStore, PgStore, Store};
use storefront::telemetry::init_tracing;
use storefront::web::configure_app_routes;

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
  tracing::error!(error = %err, "{}", context);
  std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, err))
}

async fn open_store(config: &AppConfig) -> storefront::Result<Arc<dyn Store>> {
  match config.store_backend {
    StoreBackend::Postgres => {
      let url = config.database_url.as_deref().unwrap_or_default();
      let store = PgStore::connect(url, config.database_max_connections).await?;
      tracing::info!("Successfully connected to the database.");
      if config.run_migrations {
        store.migrate().await?;
        tracing::info!("Database migrations applied.");
      }
      Ok(Arc::new(store))
    }
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on shutdown.");
      Ok(Arc::new(MemoryStore::new()))
    }
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      init_tracing(LogFormat::Pretty);
      return Err(startup_error("Failed to load application configuration", e));
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!(backend = ?app_config.store_backend, "Starting BootBox storefront...");

  let store = open_store(&app_config)
    .await
    .map_err(|e| startup_error("Failed to open the store", e))?;

  let app_state =
    AppState::new(store.clone(), app_config.clone()).map_err(|e| startup_error("Failed to register pipelines", e))?;
  tracing::info!(pipelines = app_state.flows.len(), "Pipelines registered.");

  if app_config.seed_db {
    seed_demo_data(store.as_ref())
      .await
      .map_err(|e| startup_error("Failed to seed demo data", e))?;
  }

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Binding server to {}...", server_address);

  let result = HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await;

  store.close().await;
  tracing::info!("Storefront shut down.");
  result
}
