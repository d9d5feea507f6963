// storefront/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub sku: String,
  pub name_ru: String,
  pub name_en: String,
  pub description_ru: Option<String>,
  pub description_en: Option<String>,
  pub price: Decimal,
  /// Crossed-out price shown next to a discounted `price`.
  pub old_price: Option<Decimal>,
  pub stock_total: i32,
  pub low_stock_threshold: i32,
  pub category_id: Option<Uuid>,
  pub tags: Vec<String>,
  pub images: Vec<String>,
  #[sqlx(skip)]
  pub variants: Vec<ProductVariant>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  pub fn is_low_stock(&self) -> bool {
    self.stock_total <= self.low_stock_threshold
  }

  pub fn summary(&self) -> ProductSummary {
    ProductSummary {
      id: self.id,
      sku: self.sku.clone(),
      name_ru: self.name_ru.clone(),
      name_en: self.name_en.clone(),
      price: self.price,
      images: self.images.clone(),
    }
  }
}

/// A purchasable option of a product, e.g. a shoe size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
  pub id: Uuid,
  pub product_id: Uuid,
  pub label: String,
  /// `None` means the variant sells at the parent product's price.
  pub price: Option<Decimal>,
  pub stock: i32,
  pub position: i32,
}

/// The slice of a product embedded in order read-backs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
  pub id: Uuid,
  pub sku: String,
  pub name_ru: String,
  pub name_en: String,
  pub price: Decimal,
  pub images: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
  pub category_id: Option<Uuid>,
  pub tag: Option<String>,
}

/// How a new product names its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryRef {
  Existing(Uuid),
  /// Looked up by slug and created when absent.
  Provision {
    slug: String,
    name_ru: String,
    name_en: String,
  },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVariant {
  pub label: String,
  pub price: Option<Decimal>,
  pub stock: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
  pub sku: String,
  pub name_ru: String,
  pub name_en: String,
  pub description_ru: Option<String>,
  pub description_en: Option<String>,
  pub price: Decimal,
  pub old_price: Option<Decimal>,
  pub stock_total: i32,
  pub low_stock_threshold: i32,
  pub category: Option<CategoryRef>,
  pub tags: Vec<String>,
  pub images: Vec<String>,
  pub variants: Vec<NewVariant>,
}

/// Admin edit of the mutable commercial fields. `old_price: Some(None)` clears it.
///
/// Existing order items keep the unit price they were placed at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPatch {
  pub price: Option<Decimal>,
  pub old_price: Option<Option<Decimal>>,
  pub stock_total: Option<i32>,
  pub low_stock_threshold: Option<i32>,
}

impl ProductPatch {
  pub fn is_empty(&self) -> bool {
    self.price.is_none() && self.old_price.is_none() && self.stock_total.is_none() && self.low_stock_threshold.is_none()
  }
}
