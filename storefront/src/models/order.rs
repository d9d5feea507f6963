// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use uuid::Uuid;

use super::customer::Customer;
use super::manager::Manager;
use super::order_item::{OrderItemDetail, OrderItemDraft};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
  #[default]
  Pending,
  Paid,
  Failed,
  Refunded,
}

impl PaymentStatus {
  pub const ALL: [PaymentStatus; 4] = [Self::Pending, Self::Paid, Self::Failed, Self::Refunded];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "PENDING",
      Self::Paid => "PAID",
      Self::Failed => "FAILED",
      Self::Refunded => "REFUNDED",
    }
  }

  /// Exact match on the wire name.
  pub fn parse(raw: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|s| s.as_str() == raw)
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "delivery_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryStatus {
  #[default]
  Pending,
  Processing,
  Shipped,
  Delivered,
  Cancelled,
}

impl DeliveryStatus {
  pub const ALL: [DeliveryStatus; 5] = [
    Self::Pending,
    Self::Processing,
    Self::Shipped,
    Self::Delivered,
    Self::Cancelled,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "PENDING",
      Self::Processing => "PROCESSING",
      Self::Shipped => "SHIPPED",
      Self::Delivered => "DELIVERED",
      Self::Cancelled => "CANCELLED",
    }
  }

  pub fn parse(raw: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|s| s.as_str() == raw)
  }
}

impl fmt::Display for DeliveryStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub order_number: String,
  pub customer_id: Uuid,
  pub manager_id: Option<Uuid>,
  pub currency: String,
  /// Snapshotted at creation; later catalog price changes never touch it.
  pub total_amount: Decimal,
  pub payment_status: PaymentStatus,
  pub delivery_status: DeliveryStatus,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// An order with everything the back office shows next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItemDetail>,
  pub customer: Option<Customer>,
  /// `None` both for unassigned orders and for ids that match no manager.
  pub manager: Option<Manager>,
}

/// Everything `OrderStore::insert_order` writes in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
  pub order_number: String,
  pub customer_id: Uuid,
  pub manager_id: Option<Uuid>,
  pub currency: String,
  pub total_amount: Decimal,
  pub payment_status: PaymentStatus,
  pub delivery_status: DeliveryStatus,
  pub created_at: DateTime<Utc>,
  pub items: Vec<OrderItemDraft>,
}

/// Partial update. `manager_id: Some(None)` unassigns the manager.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPatch {
  pub payment_status: Option<PaymentStatus>,
  pub delivery_status: Option<DeliveryStatus>,
  pub manager_id: Option<Option<Uuid>>,
}

impl OrderPatch {
  pub fn is_empty(&self) -> bool {
    self.payment_status.is_none() && self.delivery_status.is_none() && self.manager_id.is_none()
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilter {
  pub payment_status: Option<PaymentStatus>,
  pub delivery_status: Option<DeliveryStatus>,
  pub customer_id: Option<Uuid>,
  pub manager_id: Option<Uuid>,
}

impl OrderFilter {
  pub fn matches(&self, order: &Order) -> bool {
    self.payment_status.map_or(true, |s| order.payment_status == s)
      && self.delivery_status.map_or(true, |s| order.delivery_status == s)
      && self.customer_id.map_or(true, |id| order.customer_id == id)
      && self.manager_id.map_or(true, |id| order.manager_id == Some(id))
  }
}
