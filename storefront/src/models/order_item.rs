// storefront/src/models/order_item.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::product::{ProductSummary, ProductVariant};

/// A persisted order line. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub variant_id: Option<Uuid>,
  pub quantity: i32,
  /// Price captured when the order was placed.
  pub unit_price: Decimal,
  pub position: i32,
}

/// A line item that has been priced but not yet written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemDraft {
  pub product_id: Uuid,
  pub variant_id: Option<Uuid>,
  pub quantity: i32,
  pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDetail {
  #[serde(flatten)]
  pub item: OrderItem,
  pub product: Option<ProductSummary>,
  pub variant: Option<ProductVariant>,
}
