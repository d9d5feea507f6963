// storefront/src/services/validation.rs

//! Turns wire payloads into typed, checked values.
//!
//! Every validator collects all problems it finds into a [`FieldErrors`] map
//! keyed by the wire name of the offending field (`customerId`,
//! `items[2].quantity`) and only returns a value when the map stays empty.

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::models::payloads::{
  CreateCustomerRequest, CreateManagerRequest, CreateOrderRequest, CreateProductRequest, OrderListQuery,
  ProductListQuery, UpdateOrderRequest, UpdateProductRequest,
};
use crate::models::{
  CategoryRef, DeliveryStatus, NewCustomer, NewProduct, NewVariant, OrderFilter, OrderPatch, PaymentStatus,
  ProductFilter, ProductPatch,
};

/// Largest quantity the `order_items.quantity` column can hold.
pub const MAX_QUANTITY: i64 = i32::MAX as i64;
pub const MIN_PASSWORD_LEN: usize = 8;
/// Money columns are `NUMERIC(_, 2)`.
pub const MAX_MONEY_SCALE: u32 = 2;
const NOTHING_TO_UPDATE: &str = "must change at least one field";
const MAX_SKU_LEN: usize = 64;

/// Field path -> messages, ordered by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn single(field: &str, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.add(field, message);
    errors
  }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.0.entry(field.to_string()).or_default().push(message.into());
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn contains(&self, field: &str) -> bool {
    self.0.contains_key(field)
  }

  pub fn get(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }

  pub fn fields(&self) -> impl Iterator<Item = &str> {
    self.0.keys().map(String::as_str)
  }

  /// `Ok(value)` when no error was recorded.
  pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
    if self.is_empty() {
      Ok(value)
    } else {
      Err(self)
    }
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut first = true;
    for (field, messages) in &self.0 {
      for message in messages {
        if !first {
          f.write_str("; ")?;
        }
        write!(f, "{}: {}", field, message)?;
        first = false;
      }
    }
    Ok(())
  }
}

/// A line item after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedItem {
  pub product_id: Uuid,
  pub variant_id: Option<Uuid>,
  pub quantity: i32,
}

/// A create-order request after validation, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
  pub customer_id: Uuid,
  pub manager_id: Option<Uuid>,
  pub currency: String,
  pub payment_status: PaymentStatus,
  pub delivery_status: DeliveryStatus,
  pub items: Vec<ValidatedItem>,
}

impl ValidatedOrder {
  /// Referenced product ids without duplicates, in first-seen order.
  pub fn distinct_product_ids(&self) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = Vec::with_capacity(self.items.len());
    for item in &self.items {
      if !ids.contains(&item.product_id) {
        ids.push(item.product_id);
      }
    }
    ids
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedManager {
  pub full_name: String,
  pub email: String,
  pub password: String,
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
  raw.map(str::trim).filter(|s| !s.is_empty())
}

pub fn parse_id(field: &str, raw: &str) -> Result<Uuid, FieldErrors> {
  Uuid::parse_str(raw.trim()).map_err(|_| FieldErrors::single(field, "must be a valid UUID"))
}

fn required_uuid(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<Uuid> {
  match non_blank(raw) {
    None => {
      errors.add(field, "is required");
      None
    }
    Some(s) => optional_uuid(errors, field, Some(s)),
  }
}

fn optional_uuid(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<Uuid> {
  let s = non_blank(raw)?;
  match Uuid::parse_str(s) {
    Ok(id) => Some(id),
    Err(_) => {
      errors.add(field, "must be a valid UUID");
      None
    }
  }
}

fn required_text(errors: &mut FieldErrors, field: &str, raw: Option<&str>) -> Option<String> {
  match non_blank(raw) {
    Some(s) => Some(s.to_string()),
    None => {
      errors.add(field, "is required");
      None
    }
  }
}

fn payment_status(errors: &mut FieldErrors, raw: Option<&str>) -> Option<PaymentStatus> {
  let s = raw?;
  let parsed = PaymentStatus::parse(s.trim());
  if parsed.is_none() {
    let known: Vec<&str> = PaymentStatus::ALL.iter().map(|s| s.as_str()).collect();
    errors.add("paymentStatus", format!("must be one of {}", known.join(", ")));
  }
  parsed
}

fn delivery_status(errors: &mut FieldErrors, raw: Option<&str>) -> Option<DeliveryStatus> {
  let s = raw?;
  let parsed = DeliveryStatus::parse(s.trim());
  if parsed.is_none() {
    let known: Vec<&str> = DeliveryStatus::ALL.iter().map(|s| s.as_str()).collect();
    errors.add("deliveryStatus", format!("must be one of {}", known.join(", ")));
  }
  parsed
}

/// Three ASCII letters, upper-cased.
pub fn normalize_currency(raw: &str) -> Option<String> {
  let trimmed = raw.trim();
  if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
    Some(trimmed.to_ascii_uppercase())
  } else {
    None
  }
}

fn quantity(errors: &mut FieldErrors, field: &str, raw: Option<&serde_json::Value>) -> Option<i32> {
  let value = match raw {
    None | Some(serde_json::Value::Null) => {
      errors.add(field, "is required");
      return None;
    }
    Some(v) => v,
  };
  match value.as_i64() {
    Some(n) if (1..=MAX_QUANTITY).contains(&n) => i32::try_from(n).ok(),
    Some(n) if n < 1 => {
      errors.add(field, "must be a positive integer");
      None
    }
    Some(_) => {
      errors.add(field, format!("must not exceed {}", MAX_QUANTITY));
      None
    }
    None => {
      errors.add(field, "must be a positive integer");
      None
    }
  }
}

/// Validates a create-order request. `default_currency` applies when the
/// request names none.
pub fn validate_create_order(req: &CreateOrderRequest, default_currency: &str) -> Result<ValidatedOrder, FieldErrors> {
  let mut errors = FieldErrors::new();

  let customer_id = required_uuid(&mut errors, "customerId", req.customer_id.as_deref());
  let manager_id = optional_uuid(&mut errors, "managerId", req.manager_id.as_deref());

  let currency = match req.currency.as_deref() {
    None => Some(default_currency.to_string()),
    Some(raw) => {
      let normalized = normalize_currency(raw);
      if normalized.is_none() {
        errors.add("currency", "must be a 3-letter currency code");
      }
      normalized
    }
  };

  let payment_status = payment_status(&mut errors, req.payment_status.as_deref());
  let delivery_status = delivery_status(&mut errors, req.delivery_status.as_deref());

  let mut items = Vec::new();
  match req.items.as_deref() {
    None => errors.add("items", "is required"),
    Some([]) => errors.add("items", "must contain at least one item"),
    Some(raw_items) => {
      for (idx, raw) in raw_items.iter().enumerate() {
        let product_id = required_uuid(&mut errors, &format!("items[{}].productId", idx), raw.product_id.as_deref());
        let variant_id = optional_uuid(&mut errors, &format!("items[{}].variantId", idx), raw.variant_id.as_deref());
        let quantity = quantity(&mut errors, &format!("items[{}].quantity", idx), raw.quantity.as_ref());
        if let (Some(product_id), Some(quantity)) = (product_id, quantity) {
          items.push(ValidatedItem {
            product_id,
            variant_id,
            quantity,
          });
        }
      }
    }
  }

  match (customer_id, currency) {
    (Some(customer_id), Some(currency)) if errors.is_empty() => Ok(ValidatedOrder {
      customer_id,
      manager_id,
      currency,
      payment_status: payment_status.unwrap_or_default(),
      delivery_status: delivery_status.unwrap_or_default(),
      items,
    }),
    _ => Err(errors),
  }
}

pub fn validate_order_patch(req: &UpdateOrderRequest) -> Result<OrderPatch, FieldErrors> {
  let mut errors = FieldErrors::new();
  let payment_status = payment_status(&mut errors, req.payment_status.as_deref());
  let delivery_status = delivery_status(&mut errors, req.delivery_status.as_deref());
  let manager_id = match &req.manager_id {
    None => None,
    Some(None) => Some(None),
    Some(Some(raw)) => match non_blank(Some(raw.as_str())) {
      // An empty string unassigns, same as null.
      None => Some(None),
      Some(s) => optional_uuid(&mut errors, "managerId", Some(s)).map(Some),
    },
  };
  let patch = OrderPatch {
    payment_status,
    delivery_status,
    manager_id,
  };
  if errors.is_empty() && patch.is_empty() {
    errors.add("body", NOTHING_TO_UPDATE);
  }
  errors.finish(patch)
}

pub fn validate_order_filter(query: &OrderListQuery) -> Result<OrderFilter, FieldErrors> {
  let mut errors = FieldErrors::new();
  let filter = OrderFilter {
    payment_status: payment_status(&mut errors, non_blank(query.payment_status.as_deref())),
    delivery_status: delivery_status(&mut errors, non_blank(query.delivery_status.as_deref())),
    customer_id: optional_uuid(&mut errors, "customerId", query.customer_id.as_deref()),
    manager_id: optional_uuid(&mut errors, "managerId", query.manager_id.as_deref()),
  };
  errors.finish(filter)
}

pub fn validate_product_filter(query: &ProductListQuery) -> Result<ProductFilter, FieldErrors> {
  let mut errors = FieldErrors::new();
  let filter = ProductFilter {
    category_id: optional_uuid(&mut errors, "categoryId", query.category_id.as_deref()),
    tag: non_blank(query.tag.as_deref()).map(str::to_string),
  };
  errors.finish(filter)
}

/// Lower-case ASCII slug built from `name`, e.g. "Winter Boots" -> "winter-boots".
pub fn slugify(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  for c in name.trim().chars() {
    if c.is_ascii_alphanumeric() {
      slug.push(c.to_ascii_lowercase());
    } else if !slug.is_empty() && !slug.ends_with('-') {
      slug.push('-');
    }
  }
  while slug.ends_with('-') {
    slug.pop();
  }
  slug
}

fn is_slug(s: &str) -> bool {
  !s.is_empty()
    && !s.starts_with('-')
    && !s.ends_with('-')
    && s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

fn non_negative_money(errors: &mut FieldErrors, field: &str, value: Option<Decimal>) -> Option<Decimal> {
  let v = value?;
  if v.is_sign_negative() && !v.is_zero() {
    errors.add(field, "must not be negative");
    return None;
  }
  if v.normalize().scale() > MAX_MONEY_SCALE {
    errors.add(field, format!("must have at most {} decimal places", MAX_MONEY_SCALE));
    return None;
  }
  Some(v)
}

fn non_negative_count(errors: &mut FieldErrors, field: &str, value: Option<i32>) -> i32 {
  match value {
    Some(n) if n < 0 => {
      errors.add(field, "must not be negative");
      0
    }
    Some(n) => n,
    None => 0,
  }
}

fn clean_list(values: &[String]) -> Vec<String> {
  let mut out: Vec<String> = Vec::with_capacity(values.len());
  for v in values {
    let v = v.trim();
    if !v.is_empty() && !out.iter().any(|o| o == v) {
      out.push(v.to_string());
    }
  }
  out
}

pub fn validate_new_product(req: &CreateProductRequest) -> Result<NewProduct, FieldErrors> {
  let mut errors = FieldErrors::new();

  let sku = required_text(&mut errors, "sku", req.sku.as_deref());
  if sku.as_ref().is_some_and(|s| s.len() > MAX_SKU_LEN) {
    errors.add("sku", format!("must be at most {} characters", MAX_SKU_LEN));
  }
  let name_ru = required_text(&mut errors, "nameRu", req.name_ru.as_deref());
  let name_en = required_text(&mut errors, "nameEn", req.name_en.as_deref());

  let price = match req.price {
    None => {
      errors.add("price", "is required");
      None
    }
    Some(p) => non_negative_money(&mut errors, "price", Some(p)),
  };
  let old_price = non_negative_money(&mut errors, "oldPrice", req.old_price);
  let stock_total = non_negative_count(&mut errors, "stockTotal", req.stock_total);
  let low_stock_threshold = non_negative_count(&mut errors, "lowStockThreshold", req.low_stock_threshold);

  let category = match (req.category_id.as_deref(), req.category.as_ref()) {
    (Some(_), Some(_)) => {
      errors.add("categoryId", "cannot be combined with category");
      None
    }
    (Some(raw), None) => optional_uuid(&mut errors, "categoryId", Some(raw)).map(CategoryRef::Existing),
    (None, Some(payload)) => {
      let cat_ru = required_text(&mut errors, "category.nameRu", payload.name_ru.as_deref());
      let cat_en = required_text(&mut errors, "category.nameEn", payload.name_en.as_deref());
      let slug = match non_blank(payload.slug.as_deref()) {
        Some(s) if is_slug(s) => Some(s.to_string()),
        Some(_) => {
          errors.add("category.slug", "must contain only lower-case letters, digits and '-'");
          None
        }
        None => cat_en.as_deref().map(slugify).filter(|s| !s.is_empty()).or_else(|| {
          if cat_en.is_some() {
            errors.add("category.slug", "is required when nameEn has no ASCII letters");
          }
          None
        }),
      };
      match (slug, cat_ru, cat_en) {
        (Some(slug), Some(name_ru), Some(name_en)) => Some(CategoryRef::Provision { slug, name_ru, name_en }),
        _ => None,
      }
    }
    (None, None) => None,
  };

  let mut variants = Vec::with_capacity(req.variants.len());
  for (idx, raw) in req.variants.iter().enumerate() {
    let label = required_text(&mut errors, &format!("variants[{}].label", idx), raw.label.as_deref());
    let price = non_negative_money(&mut errors, &format!("variants[{}].price", idx), raw.price);
    let stock = non_negative_count(&mut errors, &format!("variants[{}].stock", idx), raw.stock);
    if let Some(label) = label {
      variants.push(NewVariant { label, price, stock });
    }
  }

  match (sku, name_ru, name_en, price) {
    (Some(sku), Some(name_ru), Some(name_en), Some(price)) if errors.is_empty() => Ok(NewProduct {
      sku,
      name_ru,
      name_en,
      description_ru: non_blank(req.description_ru.as_deref()).map(str::to_string),
      description_en: non_blank(req.description_en.as_deref()).map(str::to_string),
      price,
      old_price,
      stock_total,
      low_stock_threshold,
      category,
      tags: clean_list(&req.tags),
      images: clean_list(&req.images),
      variants,
    }),
    _ => Err(errors),
  }
}

fn looks_like_email(s: &str) -> bool {
  match s.split_once('@') {
    Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
    None => false,
  }
}

pub fn validate_product_patch(req: &UpdateProductRequest) -> Result<ProductPatch, FieldErrors> {
  let mut errors = FieldErrors::new();
  let price = non_negative_money(&mut errors, "price", req.price);
  let old_price = match req.old_price {
    None => None,
    Some(None) => Some(None),
    Some(Some(p)) => non_negative_money(&mut errors, "oldPrice", Some(p)).map(Some),
  };
  let stock_total = req
    .stock_total
    .map(|n| non_negative_count(&mut errors, "stockTotal", Some(n)));
  let low_stock_threshold = req
    .low_stock_threshold
    .map(|n| non_negative_count(&mut errors, "lowStockThreshold", Some(n)));

  let patch = ProductPatch {
    price,
    old_price,
    stock_total,
    low_stock_threshold,
  };
  if errors.is_empty() && patch.is_empty() {
    errors.add("body", NOTHING_TO_UPDATE);
  }
  errors.finish(patch)
}

pub fn validate_new_customer(req: &CreateCustomerRequest) -> Result<NewCustomer, FieldErrors> {
  let mut errors = FieldErrors::new();
  let full_name = required_text(&mut errors, "fullName", req.full_name.as_deref());
  let email = non_blank(req.email.as_deref()).map(str::to_ascii_lowercase);
  if email.as_deref().is_some_and(|e| !looks_like_email(e)) {
    errors.add("email", "must be a valid email address");
  }
  let phone = non_blank(req.phone.as_deref()).map(str::to_string);
  if phone
    .as_deref()
    .is_some_and(|p| !p.chars().all(|c| c.is_ascii_digit() || "+-() ".contains(c)))
  {
    errors.add("phone", "must contain only digits, spaces and +-()");
  }
  match full_name {
    Some(full_name) if errors.is_empty() => Ok(NewCustomer { full_name, email, phone }),
    _ => Err(errors),
  }
}

pub fn validate_new_manager(req: &CreateManagerRequest) -> Result<ValidatedManager, FieldErrors> {
  let mut errors = FieldErrors::new();
  let full_name = required_text(&mut errors, "fullName", req.full_name.as_deref());
  let email = required_text(&mut errors, "email", req.email.as_deref()).map(|e| e.to_ascii_lowercase());
  if email.as_deref().is_some_and(|e| !looks_like_email(e)) {
    errors.add("email", "must be a valid email address");
  }
  let password = req.password.clone().unwrap_or_default();
  if password.chars().count() < MIN_PASSWORD_LEN {
    errors.add("password", format!("must be at least {} characters", MIN_PASSWORD_LEN));
  }
  match (full_name, email) {
    (Some(full_name), Some(email)) if errors.is_empty() => Ok(ValidatedManager {
      full_name,
      email,
      password,
    }),
    _ => Err(errors),
  }
}

pub fn validate_signin(email: &str, password: &str) -> Result<String, FieldErrors> {
  let mut errors = FieldErrors::new();
  let email = email.trim().to_ascii_lowercase();
  if !looks_like_email(&email) {
    errors.add("email", "must be a valid email address");
  }
  if password.is_empty() {
    errors.add("password", "is required");
  }
  errors.finish(email)
}
