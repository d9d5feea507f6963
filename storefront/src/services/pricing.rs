// storefront/src/services/pricing.rs

//! Price snapshotting for new orders.
//!
//! All arithmetic is `rust_decimal::Decimal`; line totals and the order total
//! are exact sums of `unit_price * quantity`.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{event, Level};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{OrderItemDraft, Product};
use crate::services::validation::ValidatedItem;

/// What to do with a `variantId` the product does not have.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VariantPolicy {
  /// Price at the base product price and drop the unknown variant id.
  #[default]
  Fallback,
  /// Reject the order with `AppError::VariantNotFound`.
  Strict,
}

impl VariantPolicy {
  pub fn as_str(self) -> &'static str {
    match self {
      VariantPolicy::Fallback => "fallback",
      VariantPolicy::Strict => "strict",
    }
  }
}

impl FromStr for VariantPolicy {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "fallback" => Ok(VariantPolicy::Fallback),
      "strict" => Ok(VariantPolicy::Strict),
      other => Err(format!("unknown variant policy '{}' (expected 'fallback' or 'strict')", other)),
    }
  }
}

impl fmt::Display for VariantPolicy {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPrice {
  pub unit_price: Decimal,
  /// The matched variant, if any.
  pub variant_id: Option<Uuid>,
}

/// Resolves the authoritative unit price of `product`, optionally narrowed to a variant.
pub fn resolve_unit_price(
  product: &Product,
  variant_id: Option<Uuid>,
  policy: VariantPolicy,
) -> Result<ResolvedPrice, AppError> {
  let Some(variant_id) = variant_id else {
    return Ok(ResolvedPrice {
      unit_price: product.price,
      variant_id: None,
    });
  };

  match product.variants.iter().find(|v| v.id == variant_id) {
    Some(variant) => Ok(ResolvedPrice {
      unit_price: variant.price.unwrap_or(product.price),
      variant_id: Some(variant.id),
    }),
    None => match policy {
      VariantPolicy::Fallback => {
        event!(
          Level::WARN,
          product_id = %product.id,
          %variant_id,
          "Variant does not belong to product; pricing at base product price."
        );
        Ok(ResolvedPrice {
          unit_price: product.price,
          variant_id: None,
        })
      }
      VariantPolicy::Strict => Err(AppError::VariantNotFound {
        product_id: product.id,
        variant_id,
      }),
    },
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceSnapshot {
  pub items: Vec<OrderItemDraft>,
  pub total: Decimal,
}

/// Prices `items` in input order against the resolved catalog.
pub fn snapshot_prices(
  items: &[ValidatedItem],
  products: &HashMap<Uuid, Product>,
  policy: VariantPolicy,
) -> Result<PriceSnapshot, AppError> {
  let mut drafts = Vec::with_capacity(items.len());
  let mut total = Decimal::ZERO;

  for item in items {
    let product = products.get(&item.product_id).ok_or_else(|| AppError::ProductNotFound {
      missing: vec![item.product_id],
    })?;
    let resolved = resolve_unit_price(product, item.variant_id, policy)?;

    total = resolved
      .unit_price
      .checked_mul(Decimal::from(item.quantity))
      .and_then(|line_total| total.checked_add(line_total))
      .ok_or_else(|| AppError::Internal("Order total overflowed the decimal range.".to_string()))?;

    drafts.push(OrderItemDraft {
      product_id: product.id,
      variant_id: resolved.variant_id,
      quantity: item.quantity,
      unit_price: resolved.unit_price,
    });
  }

  Ok(PriceSnapshot { items: drafts, total })
}
