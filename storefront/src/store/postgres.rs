// storefront/src/store/postgres.rs

//! PostgreSQL store backend on a shared `sqlx::PgPool`.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::HashMap;
use tracing::{event, instrument, Level};
use uuid::Uuid;

use super::{CatalogStore, DetailRows, DirectoryStore, OrderStore, Store};
use crate::errors::{AppError, Result};
use crate::models::{
  Category, CategoryRef, Customer, Manager, NewCustomer, NewManager, NewOrder, NewProduct, Order, OrderDetail,
  OrderFilter, OrderItem, OrderPatch, Product, ProductFilter, ProductPatch, ProductSummary, ProductVariant,
};

const PRODUCT_COLUMNS: &str = "id, sku, name_ru, name_en, description_ru, description_en, price, old_price, \
  stock_total, low_stock_threshold, category_id, tags, images, created_at, updated_at";
const VARIANT_COLUMNS: &str = "id, product_id, label, price, stock, position";
const ORDER_COLUMNS: &str = "id, order_number, customer_id, manager_id, currency, total_amount, payment_status, \
  delivery_status, created_at, updated_at";
const CUSTOMER_COLUMNS: &str = "id, full_name, email, phone, created_at";
const MANAGER_COLUMNS: &str = "id, full_name, email, password_hash, created_at";
const CATEGORY_COLUMNS: &str = "id, slug, name_ru, name_en, created_at";

/// Maps a unique-key violation to a field error; anything else stays a database error.
fn unique_violation_as(err: sqlx::Error, field: &str, message: &str) -> AppError {
  if let sqlx::Error::Database(db_err) = &err {
    if db_err.is_unique_violation() {
      return AppError::invalid(field, message);
    }
  }
  AppError::Sqlx(err)
}

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
    let pool = PgPoolOptions::new()
      .max_connections(max_connections)
      .connect(database_url)
      .await?;
    event!(Level::INFO, max_connections, "Connected to PostgreSQL.");
    Ok(Self { pool })
  }

  /// Applies the embedded migrations under `storefront/migrations`.
  pub async fn migrate(&self) -> Result<()> {
    sqlx::migrate!("./migrations")
      .run(&self.pool)
      .await
      .map_err(|e| AppError::Internal(format!("Database migration failed: {}", e)))?;
    event!(Level::INFO, "Database migrations applied.");
    Ok(())
  }

  async fn attach_variants(&self, products: &mut [Product]) -> Result<()> {
    if products.is_empty() {
      return Ok(());
    }
    let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
    let variants = sqlx::query_as::<_, ProductVariant>(&format!(
      "SELECT {} FROM product_variants WHERE product_id = ANY($1) ORDER BY position",
      VARIANT_COLUMNS
    ))
    .bind(ids)
    .fetch_all(&self.pool)
    .await?;

    let mut by_product: HashMap<Uuid, Vec<ProductVariant>> = HashMap::new();
    for variant in variants {
      by_product.entry(variant.product_id).or_default().push(variant);
    }
    for product in products.iter_mut() {
      product.variants = by_product.remove(&product.id).unwrap_or_default();
    }
    Ok(())
  }

  /// Batch-loads everything the order read-back embeds.
  async fn details(&self, orders: Vec<Order>) -> Result<Vec<OrderDetail>> {
    if orders.is_empty() {
      return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let items = sqlx::query_as::<_, OrderItem>(
      "SELECT id, order_id, product_id, variant_id, quantity, unit_price, position \
       FROM order_items WHERE order_id = ANY($1) ORDER BY position",
    )
    .bind(order_ids)
    .fetch_all(&self.pool)
    .await?;

    let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
    let variant_ids: Vec<Uuid> = items.iter().filter_map(|i| i.variant_id).collect();
    let customer_ids: Vec<Uuid> = orders.iter().map(|o| o.customer_id).collect();
    let manager_ids: Vec<Uuid> = orders.iter().filter_map(|o| o.manager_id).collect();

    let products = sqlx::query_as::<_, ProductSummary>(
      "SELECT id, sku, name_ru, name_en, price, images FROM products WHERE id = ANY($1)",
    )
    .bind(product_ids)
    .fetch_all(&self.pool)
    .await?;
    let variants = sqlx::query_as::<_, ProductVariant>(&format!(
      "SELECT {} FROM product_variants WHERE id = ANY($1)",
      VARIANT_COLUMNS
    ))
    .bind(variant_ids)
    .fetch_all(&self.pool)
    .await?;
    let customers = sqlx::query_as::<_, Customer>(&format!(
      "SELECT {} FROM customers WHERE id = ANY($1)",
      CUSTOMER_COLUMNS
    ))
    .bind(customer_ids)
    .fetch_all(&self.pool)
    .await?;
    let managers = sqlx::query_as::<_, Manager>(&format!("SELECT {} FROM managers WHERE id = ANY($1)", MANAGER_COLUMNS))
      .bind(manager_ids)
      .fetch_all(&self.pool)
      .await?;

    let rows = DetailRows {
      items,
      products: products.into_iter().map(|p| (p.id, p)).collect(),
      variants: variants.into_iter().map(|v| (v.id, v)).collect(),
      customers: customers.into_iter().map(|c| (c.id, c)).collect(),
      managers: managers.into_iter().map(|m| (m.id, m)).collect(),
    };
    Ok(rows.assemble(orders))
  }
}

#[async_trait]
impl CatalogStore for PgStore {
  #[instrument(name = "store::fetch_products_with_variants", skip(self), fields(requested = ids.len()))]
  async fn fetch_products_with_variants(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let mut products = sqlx::query_as::<_, Product>(&format!(
      "SELECT {} FROM products WHERE id = ANY($1)",
      PRODUCT_COLUMNS
    ))
    .bind(ids.to_vec())
    .fetch_all(&self.pool)
    .await?;
    self.attach_variants(&mut products).await?;
    Ok(products)
  }

  async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
    let mut products = sqlx::query_as::<_, Product>(&format!(
      "SELECT {} FROM products \
       WHERE ($1::uuid IS NULL OR category_id = $1) AND ($2::text IS NULL OR $2 = ANY(tags)) \
       ORDER BY name_en",
      PRODUCT_COLUMNS
    ))
    .bind(filter.category_id)
    .bind(filter.tag.clone())
    .fetch_all(&self.pool)
    .await?;
    self.attach_variants(&mut products).await?;
    Ok(products)
  }

  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    let mut products = self.fetch_products_with_variants(&[id]).await?;
    Ok(products.pop())
  }

  #[instrument(name = "store::create_product", skip(self, new_product), fields(sku = %new_product.sku))]
  async fn create_product(&self, new_product: NewProduct) -> Result<Uuid> {
    let mut tx = self.pool.begin().await?;

    let category_id = match &new_product.category {
      None => None,
      Some(CategoryRef::Existing(id)) => Some(*id),
      Some(CategoryRef::Provision { slug, name_ru, name_en }) => {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let id: Uuid = sqlx::query_scalar(
          "INSERT INTO categories (id, slug, name_ru, name_en) VALUES ($1, $2, $3, $4) \
           ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(name_ru)
        .bind(name_en)
        .fetch_one(&mut *tx)
        .await?;
        Some(id)
      }
    };

    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
      "INSERT INTO products (id, sku, name_ru, name_en, description_ru, description_en, price, old_price, \
       stock_total, low_stock_threshold, category_id, tags, images, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)",
    )
    .bind(id)
    .bind(&new_product.sku)
    .bind(&new_product.name_ru)
    .bind(&new_product.name_en)
    .bind(&new_product.description_ru)
    .bind(&new_product.description_en)
    .bind(new_product.price)
    .bind(new_product.old_price)
    .bind(new_product.stock_total)
    .bind(new_product.low_stock_threshold)
    .bind(category_id)
    .bind(&new_product.tags)
    .bind(&new_product.images)
    .bind(now)
    .execute(&mut *tx)
    .await
    .map_err(|e| unique_violation_as(e, "sku", "is already taken"))?;

    for (position, variant) in new_product.variants.iter().enumerate() {
      sqlx::query(
        "INSERT INTO product_variants (id, product_id, label, price, stock, position) VALUES ($1, $2, $3, $4, $5, $6)",
      )
      .bind(Uuid::new_v4())
      .bind(id)
      .bind(&variant.label)
      .bind(variant.price)
      .bind(variant.stock)
      .bind(position as i32)
      .execute(&mut *tx)
      .await?;
    }

    tx.commit().await?;
    Ok(id)
  }

  #[instrument(name = "store::update_product", skip(self, patch))]
  async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<bool> {
    let (set_old_price, old_price) = match patch.old_price {
      Some(old_price) => (true, old_price),
      None => (false, None),
    };
    let result = sqlx::query(
      "UPDATE products SET \
         price = COALESCE($2, price), \
         old_price = CASE WHEN $3 THEN $4::numeric ELSE old_price END, \
         stock_total = COALESCE($5, stock_total), \
         low_stock_threshold = COALESCE($6, low_stock_threshold), \
         updated_at = now() \
       WHERE id = $1",
    )
    .bind(id)
    .bind(patch.price)
    .bind(set_old_price)
    .bind(old_price)
    .bind(patch.stock_total)
    .bind(patch.low_stock_threshold)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn get_category(&self, id: Uuid) -> Result<Option<Category>> {
    let category = sqlx::query_as::<_, Category>(&format!("SELECT {} FROM categories WHERE id = $1", CATEGORY_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(category)
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    let categories = sqlx::query_as::<_, Category>(&format!("SELECT {} FROM categories ORDER BY slug", CATEGORY_COLUMNS))
      .fetch_all(&self.pool)
      .await?;
    Ok(categories)
  }
}

#[async_trait]
impl DirectoryStore for PgStore {
  async fn create_customer(&self, new_customer: NewCustomer) -> Result<Customer> {
    let customer = sqlx::query_as::<_, Customer>(&format!(
      "INSERT INTO customers (id, full_name, email, phone) VALUES ($1, $2, $3, $4) RETURNING {}",
      CUSTOMER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&new_customer.full_name)
    .bind(&new_customer.email)
    .bind(&new_customer.phone)
    .fetch_one(&self.pool)
    .await?;
    Ok(customer)
  }

  async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>> {
    let customer = sqlx::query_as::<_, Customer>(&format!("SELECT {} FROM customers WHERE id = $1", CUSTOMER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(customer)
  }

  async fn list_customers(&self) -> Result<Vec<Customer>> {
    let customers =
      sqlx::query_as::<_, Customer>(&format!("SELECT {} FROM customers ORDER BY created_at DESC", CUSTOMER_COLUMNS))
        .fetch_all(&self.pool)
        .await?;
    Ok(customers)
  }

  async fn create_manager(&self, new_manager: NewManager) -> Result<Manager> {
    sqlx::query_as::<_, Manager>(&format!(
      "INSERT INTO managers (id, full_name, email, password_hash) VALUES ($1, $2, $3, $4) RETURNING {}",
      MANAGER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&new_manager.full_name)
    .bind(&new_manager.email)
    .bind(&new_manager.password_hash)
    .fetch_one(&self.pool)
    .await
    .map_err(|e| unique_violation_as(e, "email", "is already registered"))
  }

  async fn list_managers(&self) -> Result<Vec<Manager>> {
    let managers = sqlx::query_as::<_, Manager>(&format!("SELECT {} FROM managers ORDER BY created_at", MANAGER_COLUMNS))
      .fetch_all(&self.pool)
      .await?;
    Ok(managers)
  }

  async fn find_manager_by_email(&self, email: &str) -> Result<Option<Manager>> {
    let manager = sqlx::query_as::<_, Manager>(&format!(
      "SELECT {} FROM managers WHERE lower(email) = lower($1)",
      MANAGER_COLUMNS
    ))
    .bind(email)
    .fetch_optional(&self.pool)
    .await?;
    Ok(manager)
  }
}

#[async_trait]
impl OrderStore for PgStore {
  #[instrument(
    name = "store::insert_order",
    skip(self, new_order),
    fields(order_number = %new_order.order_number, items = new_order.items.len())
  )]
  async fn insert_order(&self, new_order: NewOrder) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let mut tx = self.pool.begin().await?;

    sqlx::query(
      "INSERT INTO orders (id, order_number, customer_id, manager_id, currency, total_amount, payment_status, \
       delivery_status, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)",
    )
    .bind(id)
    .bind(&new_order.order_number)
    .bind(new_order.customer_id)
    .bind(new_order.manager_id)
    .bind(&new_order.currency)
    .bind(new_order.total_amount)
    .bind(new_order.payment_status)
    .bind(new_order.delivery_status)
    .bind(new_order.created_at)
    .execute(&mut *tx)
    .await?;

    for (position, draft) in new_order.items.iter().enumerate() {
      sqlx::query(
        "INSERT INTO order_items (id, order_id, product_id, variant_id, quantity, unit_price, position) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
      )
      .bind(Uuid::new_v4())
      .bind(id)
      .bind(draft.product_id)
      .bind(draft.variant_id)
      .bind(draft.quantity)
      .bind(draft.unit_price)
      .bind(position as i32)
      .execute(&mut *tx)
      .await?;
    }

    // Dropping `tx` on any error above rolls the whole order back.
    tx.commit().await?;
    Ok(id)
  }

  async fn get_order_detail(&self, id: Uuid) -> Result<Option<OrderDetail>> {
    let order = sqlx::query_as::<_, Order>(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    match order {
      Some(order) => Ok(self.details(vec![order]).await?.pop()),
      None => Ok(None),
    }
  }

  #[instrument(name = "store::list_orders", skip(self))]
  async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderDetail>> {
    let orders = sqlx::query_as::<_, Order>(&format!(
      "SELECT {} FROM orders \
       WHERE ($1::payment_status IS NULL OR payment_status = $1) \
         AND ($2::delivery_status IS NULL OR delivery_status = $2) \
         AND ($3::uuid IS NULL OR customer_id = $3) \
         AND ($4::uuid IS NULL OR manager_id = $4) \
       ORDER BY created_at DESC, id DESC",
      ORDER_COLUMNS
    ))
    .bind(filter.payment_status)
    .bind(filter.delivery_status)
    .bind(filter.customer_id)
    .bind(filter.manager_id)
    .fetch_all(&self.pool)
    .await?;
    self.details(orders).await
  }

  async fn update_order(&self, id: Uuid, patch: OrderPatch) -> Result<bool> {
    let (set_manager, manager_id) = match patch.manager_id {
      Some(manager_id) => (true, manager_id),
      None => (false, None),
    };
    let result = sqlx::query(
      "UPDATE orders SET \
         payment_status = COALESCE($2, payment_status), \
         delivery_status = COALESCE($3, delivery_status), \
         manager_id = CASE WHEN $4 THEN $5::uuid ELSE manager_id END, \
         updated_at = now() \
       WHERE id = $1",
    )
    .bind(id)
    .bind(patch.payment_status)
    .bind(patch.delivery_status)
    .bind(set_manager)
    .bind(manager_id)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected() > 0)
  }

  async fn delete_order(&self, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM orders WHERE id = $1")
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected() > 0)
  }
}

#[async_trait]
impl Store for PgStore {
  fn backend_name(&self) -> &'static str {
    "postgres"
  }

  async fn close(&self) {
    self.pool.close().await;
    event!(Level::INFO, "PostgreSQL pool closed.");
  }
}
