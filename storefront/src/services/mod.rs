// storefront/src/services/mod.rs

//! Pure business services used by the pipelines and handlers.

pub mod auth_service;
pub mod order_number;
pub mod pricing;
pub mod validation;
