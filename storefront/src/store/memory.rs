// storefront/src/store/memory.rs

//! In-process store backend.
//!
//! Each operation takes the single table lock once, so every write is
//! all-or-nothing exactly like a database transaction. Integrity rules that
//! the Postgres schema enforces with foreign keys are checked by hand and
//! reported as `AppError::Constraint`.

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{event, instrument, Level};
use uuid::Uuid;

use super::{CatalogStore, DetailRows, DirectoryStore, OrderStore, Store};
use crate::errors::{AppError, Result};
use crate::models::{
  Category, CategoryRef, Customer, Manager, NewCustomer, NewManager, NewOrder, NewProduct, Order, OrderDetail,
  OrderFilter, OrderItem, OrderPatch, Product, ProductFilter, ProductPatch, ProductVariant,
};

#[derive(Default)]
struct Tables {
  categories: Vec<Category>,
  products: Vec<Product>,
  customers: Vec<Customer>,
  managers: Vec<Manager>,
  /// Insertion order; newest last.
  orders: Vec<Order>,
  order_items: Vec<OrderItem>,
}

impl Tables {
  fn product(&self, id: Uuid) -> Option<&Product> {
    self.products.iter().find(|p| p.id == id)
  }

  fn details(&self, orders: Vec<Order>) -> Vec<OrderDetail> {
    let mut rows = DetailRows::default();
    for order in &orders {
      for item in self.order_items.iter().filter(|i| i.order_id == order.id) {
        if let Some(product) = self.product(item.product_id) {
          if let Some(vid) = item.variant_id {
            if let Some(variant) = product.variants.iter().find(|v| v.id == vid) {
              rows.variants.insert(vid, variant.clone());
            }
          }
          rows.products.insert(product.id, product.summary());
        }
        rows.items.push(item.clone());
      }
      if let Some(customer) = self.customers.iter().find(|c| c.id == order.customer_id) {
        rows.customers.insert(customer.id, customer.clone());
      }
      if let Some(manager) = order.manager_id.and_then(|mid| self.managers.iter().find(|m| m.id == mid)) {
        rows.managers.insert(manager.id, manager.clone());
      }
    }
    rows.assemble(orders)
  }
}

/// A `Store` kept entirely in process memory.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
  calls: AtomicUsize,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of store operations served so far.
  pub fn call_count(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }

  /// Orders currently held; does not count as a store call.
  pub fn order_count(&self) -> usize {
    self.tables.lock().orders.len()
  }

  /// Items currently held across all orders; does not count as a store call.
  pub fn order_item_count(&self) -> usize {
    self.tables.lock().order_items.len()
  }

  fn touch(&self, operation: &'static str) {
    let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
    event!(Level::TRACE, operation, call = n, "Memory store call.");
  }
}

#[async_trait]
impl CatalogStore for MemoryStore {
  #[instrument(name = "store::fetch_products_with_variants", skip(self), fields(requested = ids.len()))]
  async fn fetch_products_with_variants(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    self.touch("fetch_products_with_variants");
    let tables = self.tables.lock();
    Ok(tables.products.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
  }

  async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
    self.touch("list_products");
    let tables = self.tables.lock();
    let mut products: Vec<Product> = tables
      .products
      .iter()
      .filter(|p| filter.category_id.map_or(true, |cid| p.category_id == Some(cid)))
      .filter(|p| filter.tag.as_ref().map_or(true, |tag| p.tags.contains(tag)))
      .cloned()
      .collect();
    products.sort_by(|a, b| a.name_en.cmp(&b.name_en));
    Ok(products)
  }

  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    self.touch("get_product");
    Ok(self.tables.lock().product(id).cloned())
  }

  #[instrument(name = "store::create_product", skip(self, new_product), fields(sku = %new_product.sku))]
  async fn create_product(&self, new_product: NewProduct) -> Result<Uuid> {
    self.touch("create_product");
    let mut tables = self.tables.lock();

    if tables.products.iter().any(|p| p.sku == new_product.sku) {
      return Err(AppError::invalid("sku", "is already taken"));
    }

    let now = Utc::now();
    let mut provisioned: Option<Category> = None;
    let category_id = match new_product.category {
      None => None,
      Some(CategoryRef::Existing(id)) => {
        if !tables.categories.iter().any(|c| c.id == id) {
          return Err(AppError::Constraint(format!(
            "products.category_id references unknown category {}",
            id
          )));
        }
        Some(id)
      }
      Some(CategoryRef::Provision { slug, name_ru, name_en }) => match tables.categories.iter().find(|c| c.slug == slug) {
        Some(existing) => Some(existing.id),
        None => {
          let category = Category {
            id: Uuid::new_v4(),
            slug,
            name_ru,
            name_en,
            created_at: now,
          };
          let id = category.id;
          provisioned = Some(category);
          Some(id)
        }
      },
    };

    let id = Uuid::new_v4();
    let variants = new_product
      .variants
      .into_iter()
      .enumerate()
      .map(|(position, v)| ProductVariant {
        id: Uuid::new_v4(),
        product_id: id,
        label: v.label,
        price: v.price,
        stock: v.stock,
        position: position as i32,
      })
      .collect();

    if let Some(category) = provisioned {
      event!(Level::INFO, category_id = %category.id, slug = %category.slug, "Category provisioned.");
      tables.categories.push(category);
    }
    tables.products.push(Product {
      id,
      sku: new_product.sku,
      name_ru: new_product.name_ru,
      name_en: new_product.name_en,
      description_ru: new_product.description_ru,
      description_en: new_product.description_en,
      price: new_product.price,
      old_price: new_product.old_price,
      stock_total: new_product.stock_total,
      low_stock_threshold: new_product.low_stock_threshold,
      category_id,
      tags: new_product.tags,
      images: new_product.images,
      variants,
      created_at: now,
      updated_at: now,
    });
    Ok(id)
  }

  #[instrument(name = "store::update_product", skip(self, patch))]
  async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<bool> {
    self.touch("update_product");
    let mut tables = self.tables.lock();
    let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
      return Ok(false);
    };
    if let Some(price) = patch.price {
      product.price = price;
    }
    if let Some(old_price) = patch.old_price {
      product.old_price = old_price;
    }
    if let Some(stock_total) = patch.stock_total {
      product.stock_total = stock_total;
    }
    if let Some(threshold) = patch.low_stock_threshold {
      product.low_stock_threshold = threshold;
    }
    product.updated_at = Utc::now();
    Ok(true)
  }

  async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
    self.touch("get_category");
    Ok(self.tables.lock().categories.iter().find(|c| c.id == id).cloned())
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    self.touch("list_categories");
    let mut categories = self.tables.lock().categories.clone();
    categories.sort_by(|a, b| a.slug.cmp(&b.slug));
    Ok(categories)
  }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
  async fn create_customer(&self, new_customer: NewCustomer) -> Result<Customer> {
    self.touch("create_customer");
    let customer = Customer {
      id: Uuid::new_v4(),
      full_name: new_customer.full_name,
      email: new_customer.email,
      phone: new_customer.phone,
      created_at: Utc::now(),
    };
    self.tables.lock().customers.push(customer.clone());
    Ok(customer)
  }

  async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>> {
    self.touch("get_customer");
    Ok(self.tables.lock().customers.iter().find(|c| c.id == id).cloned())
  }

  async fn list_customers(&self) -> Result<Vec<Customer>> {
    self.touch("list_customers");
    let mut customers = self.tables.lock().customers.clone();
    customers.reverse();
    Ok(customers)
  }

  async fn create_manager(&self, new_manager: NewManager) -> Result<Manager> {
    self.touch("create_manager");
    let mut tables = self.tables.lock();
    if tables.managers.iter().any(|m| m.email.eq_ignore_ascii_case(&new_manager.email)) {
      return Err(AppError::invalid("email", "is already registered"));
    }
    let manager = Manager {
      id: Uuid::new_v4(),
      full_name: new_manager.full_name,
      email: new_manager.email,
      password_hash: new_manager.password_hash,
      created_at: Utc::now(),
    };
    tables.managers.push(manager.clone());
    Ok(manager)
  }

  async fn list_managers(&self) -> Result<Vec<Manager>> {
    self.touch("list_managers");
    Ok(self.tables.lock().managers.clone())
  }

  async fn find_manager_by_email(&self, email: &str) -> Result<Option<Manager>> {
    self.touch("find_manager_by_email");
    let tables = self.tables.lock();
    Ok(tables.managers.iter().find(|m| m.email.eq_ignore_ascii_case(email)).cloned())
  }
}

#[async_trait]
impl OrderStore for MemoryStore {
  #[instrument(
    name = "store::insert_order",
    skip(self, new_order),
    fields(order_number = %new_order.order_number, items = new_order.items.len())
  )]
  async fn insert_order(&self, new_order: NewOrder) -> Result<Uuid> {
    self.touch("insert_order");
    let mut tables = self.tables.lock();

    if !tables.customers.iter().any(|c| c.id == new_order.customer_id) {
      return Err(AppError::Constraint(format!(
        "orders.customer_id references unknown customer {}",
        new_order.customer_id
      )));
    }
    for draft in &new_order.items {
      let product = tables.product(draft.product_id).ok_or_else(|| {
        AppError::Constraint(format!("order_items.product_id references unknown product {}", draft.product_id))
      })?;
      if let Some(vid) = draft.variant_id {
        if !product.variants.iter().any(|v| v.id == vid) {
          return Err(AppError::Constraint(format!(
            "order_items.variant_id references unknown variant {}",
            vid
          )));
        }
      }
    }

    let id = Uuid::new_v4();
    let items: Vec<OrderItem> = new_order
      .items
      .iter()
      .enumerate()
      .map(|(position, draft)| OrderItem {
        id: Uuid::new_v4(),
        order_id: id,
        product_id: draft.product_id,
        variant_id: draft.variant_id,
        quantity: draft.quantity,
        unit_price: draft.unit_price,
        position: position as i32,
      })
      .collect();

    tables.orders.push(Order {
      id,
      order_number: new_order.order_number,
      customer_id: new_order.customer_id,
      manager_id: new_order.manager_id,
      currency: new_order.currency,
      total_amount: new_order.total_amount,
      payment_status: new_order.payment_status,
      delivery_status: new_order.delivery_status,
      created_at: new_order.created_at,
      updated_at: new_order.created_at,
    });
    tables.order_items.extend(items);
    Ok(id)
  }

  async fn get_order_detail(&self, id: Uuid) -> Result<Option<OrderDetail>> {
    self.touch("get_order_detail");
    let tables = self.tables.lock();
    let Some(order) = tables.orders.iter().find(|o| o.id == id).cloned() else {
      return Ok(None);
    };
    Ok(tables.details(vec![order]).pop())
  }

  #[instrument(name = "store::list_orders", skip(self))]
  async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderDetail>> {
    self.touch("list_orders");
    let tables = self.tables.lock();
    let mut orders: Vec<Order> = tables.orders.iter().rev().filter(|o| filter.matches(o)).cloned().collect();
    // Stable sort keeps the newest-inserted first among equal timestamps.
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(tables.details(orders))
  }

  async fn update_order(&self, id: Uuid, patch: OrderPatch) -> Result<bool> {
    self.touch("update_order");
    let mut tables = self.tables.lock();
    let Some(order) = tables.orders.iter_mut().find(|o| o.id == id) else {
      return Ok(false);
    };
    if let Some(status) = patch.payment_status {
      order.payment_status = status;
    }
    if let Some(status) = patch.delivery_status {
      order.delivery_status = status;
    }
    if let Some(manager_id) = patch.manager_id {
      order.manager_id = manager_id;
    }
    order.updated_at = Utc::now();
    Ok(true)
  }

  async fn delete_order(&self, id: Uuid) -> Result<bool> {
    self.touch("delete_order");
    let mut tables = self.tables.lock();
    let before = tables.orders.len();
    tables.orders.retain(|o| o.id != id);
    if tables.orders.len() == before {
      return Ok(false);
    }
    tables.order_items.retain(|i| i.order_id != id);
    Ok(true)
  }
}

#[async_trait]
impl Store for MemoryStore {
  fn backend_name(&self) -> &'static str {
    "memory"
  }

  async fn close(&self) {
    event!(Level::DEBUG, calls = self.call_count(), "Memory store closed.");
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{NewVariant, OrderItemDraft, PaymentStatus};
  use rust_decimal::Decimal;

  fn new_product(sku: &str, category: Option<CategoryRef>) -> NewProduct {
    NewProduct {
      sku: sku.to_string(),
      name_ru: "Сапоги".to_string(),
      name_en: "Boots".to_string(),
      description_ru: None,
      description_en: None,
      price: Decimal::new(5000, 0),
      old_price: None,
      stock_total: 5,
      low_stock_threshold: 1,
      category,
      tags: vec!["winter".to_string()],
      images: vec![],
      variants: vec![NewVariant {
        label: "41".to_string(),
        price: None,
        stock: 2,
      }],
    }
  }

  fn provision(slug: &str) -> Option<CategoryRef> {
    Some(CategoryRef::Provision {
      slug: slug.to_string(),
      name_ru: "Зима".to_string(),
      name_en: "Winter".to_string(),
    })
  }

  #[tokio::test]
  async fn provisioned_category_is_reused_by_slug() {
    let store = MemoryStore::new();
    let a = store.create_product(new_product("A", provision("winter"))).await.unwrap();
    let b = store.create_product(new_product("B", provision("winter"))).await.unwrap();

    let categories = store.list_categories().await.unwrap();
    assert_eq!(categories.len(), 1);
    let pa = store.get_product(a).await.unwrap().unwrap();
    let pb = store.get_product(b).await.unwrap().unwrap();
    assert_eq!(pa.category_id, Some(categories[0].id));
    assert_eq!(pb.category_id, pa.category_id);
    assert_eq!(pa.variants.len(), 1);
  }

  #[tokio::test]
  async fn failed_product_write_leaves_nothing_behind() {
    let store = MemoryStore::new();
    store.create_product(new_product("A", None)).await.unwrap();

    let dup = store.create_product(new_product("A", provision("spring"))).await;
    assert!(matches!(dup, Err(AppError::Validation(_))));
    assert!(store.list_categories().await.unwrap().is_empty());

    let orphan = store.create_product(new_product("C", Some(CategoryRef::Existing(Uuid::new_v4())))).await;
    assert!(matches!(orphan, Err(AppError::Constraint(_))));
    assert_eq!(store.list_products(&ProductFilter::default()).await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn unknown_customer_rejects_the_whole_order() {
    let store = MemoryStore::new();
    let product_id = store.create_product(new_product("A", None)).await.unwrap();

    let result = store
      .insert_order(NewOrder {
        order_number: "BB-1-1".to_string(),
        customer_id: Uuid::new_v4(),
        manager_id: None,
        currency: "RUB".to_string(),
        total_amount: Decimal::new(5000, 0),
        payment_status: PaymentStatus::Pending,
        delivery_status: Default::default(),
        created_at: Utc::now(),
        items: vec![OrderItemDraft {
          product_id,
          variant_id: None,
          quantity: 1,
          unit_price: Decimal::new(5000, 0),
        }],
      })
      .await;

    assert!(matches!(result, Err(AppError::Constraint(_))));
    assert_eq!(store.order_count(), 0);
    assert_eq!(store.order_item_count(), 0);
  }

  #[tokio::test]
  async fn product_patch_touches_only_named_fields() {
    let store = MemoryStore::new();
    let id = store.create_product(new_product("A", None)).await.unwrap();

    let patch = ProductPatch {
      old_price: Some(Some(Decimal::new(6500, 0))),
      stock_total: Some(0),
      ..ProductPatch::default()
    };
    assert!(store.update_product(id, patch).await.unwrap());

    let product = store.get_product(id).await.unwrap().unwrap();
    assert_eq!(product.price, Decimal::new(5000, 0));
    assert_eq!(product.old_price, Some(Decimal::new(6500, 0)));
    assert_eq!(product.stock_total, 0);
    assert_eq!(product.low_stock_threshold, 1);

    let cleared = ProductPatch {
      old_price: Some(None),
      ..ProductPatch::default()
    };
    assert!(store.update_product(id, cleared).await.unwrap());
    assert_eq!(store.get_product(id).await.unwrap().unwrap().old_price, None);

    assert!(!store.update_product(Uuid::new_v4(), ProductPatch::default()).await.unwrap());
  }

  #[tokio::test]
  async fn calls_are_counted() {
    let store = MemoryStore::new();
    assert_eq!(store.call_count(), 0);
    store.list_categories().await.unwrap();
    store.get_customer(Uuid::new_v4()).await.unwrap();
    assert_eq!(store.call_count(), 2);
    assert_eq!(store.order_count(), 0);
    assert_eq!(store.call_count(), 2);
  }
}
