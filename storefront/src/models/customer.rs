// storefront/src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
  pub id: Uuid,
  pub full_name: String,
  pub email: Option<String>,
  pub phone: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
  pub full_name: String,
  pub email: Option<String>,
  pub phone: Option<String>,
}
