// storefront/src/lib.rs

//! BootBox storefront service: catalog, customer and manager directories, and
//! the order-placement pipeline, served over actix-web.

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod seed;
pub mod services;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod web;

pub use config::AppConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
