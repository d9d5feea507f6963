// storefront/src/models/payloads.rs

//! Request bodies and query strings as they arrive on the wire.
//!
//! Identifiers stay raw strings and `quantity` stays raw JSON so that bad
//! values are reported per field by `services::validation` instead of failing
//! JSON decoding as a whole.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderItemRequest {
  pub product_id: Option<String>,
  pub variant_id: Option<String>,
  pub quantity: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
  pub customer_id: Option<String>,
  pub manager_id: Option<String>,
  pub currency: Option<String>,
  pub payment_status: Option<String>,
  pub delivery_status: Option<String>,
  pub items: Option<Vec<CreateOrderItemRequest>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderRequest {
  pub payment_status: Option<String>,
  pub delivery_status: Option<String>,
  #[serde(default, deserialize_with = "deserialize_some")]
  pub manager_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListQuery {
  pub payment_status: Option<String>,
  pub delivery_status: Option<String>,
  pub customer_id: Option<String>,
  pub manager_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPayload {
  pub slug: Option<String>,
  pub name_ru: Option<String>,
  pub name_en: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantPayload {
  pub label: Option<String>,
  pub price: Option<Decimal>,
  pub stock: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
  pub sku: Option<String>,
  pub name_ru: Option<String>,
  pub name_en: Option<String>,
  pub description_ru: Option<String>,
  pub description_en: Option<String>,
  pub price: Option<Decimal>,
  pub old_price: Option<Decimal>,
  pub stock_total: Option<i32>,
  pub low_stock_threshold: Option<i32>,
  pub category_id: Option<String>,
  pub category: Option<CategoryPayload>,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub images: Vec<String>,
  #[serde(default)]
  pub variants: Vec<VariantPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
  pub price: Option<Decimal>,
  #[serde(default, deserialize_with = "deserialize_some")]
  pub old_price: Option<Option<Decimal>>,
  pub stock_total: Option<i32>,
  pub low_stock_threshold: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListQuery {
  pub category_id: Option<String>,
  pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerRequest {
  pub full_name: Option<String>,
  pub email: Option<String>,
  pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateManagerRequest {
  pub full_name: Option<String>,
  pub email: Option<String>,
  pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SigninRequest {
  pub email: String,
  pub password: String,
}
