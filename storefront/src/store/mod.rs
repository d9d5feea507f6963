// storefront/src/store/mod.rs

//! Persistence seams. Handlers and pipelines only see these traits; the
//! concrete backend is picked once at startup and shared as `Arc<dyn Store>`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::Result;
use crate::models::{
  Category, Customer, Manager, NewCustomer, NewManager, NewOrder, NewProduct, OrderDetail, OrderFilter, OrderPatch,
  Product, ProductFilter, ProductPatch,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait CatalogStore: Send + Sync {
  /// Loads the products with these ids together with their variants in one batch.
  /// Ids that match nothing are simply absent from the result.
  async fn fetch_products_with_variants(&self, ids: &[Uuid]) -> Result<Vec<Product>>;

  async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>>;

  async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;

  /// Writes the product, its variants and, for `CategoryRef::Provision`, the
  /// category in one transaction.
  async fn create_product(&self, new_product: NewProduct) -> Result<Uuid>;

  /// Applies `patch` to one product. `false` when no product has that id.
  async fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<bool>;

  async fn get_category(&self, id: Uuid) -> Result<Option<Category>>;

  async fn list_categories(&self) -> Result<Vec<Category>>;
}

#[async_trait]
pub trait DirectoryStore: Send + Sync {
  async fn create_customer(&self, new_customer: NewCustomer) -> Result<Customer>;

  async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>>;

  async fn list_customers(&self) -> Result<Vec<Customer>>;

  async fn create_manager(&self, new_manager: NewManager) -> Result<Manager>;

  async fn list_managers(&self) -> Result<Vec<Manager>>;

  /// `email` is matched case-insensitively.
  async fn find_manager_by_email(&self, email: &str) -> Result<Option<Manager>>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Writes the header and all items atomically and returns the new order id.
  async fn insert_order(&self, new_order: NewOrder) -> Result<Uuid>;

  async fn get_order_detail(&self, id: Uuid) -> Result<Option<OrderDetail>>;

  /// Newest first.
  async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderDetail>>;

  /// `false` when no order has this id.
  async fn update_order(&self, id: Uuid, patch: OrderPatch) -> Result<bool>;

  /// Deletes the order and its items; `false` when no order has this id.
  async fn delete_order(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait Store: CatalogStore + DirectoryStore + OrderStore {
  fn backend_name(&self) -> &'static str;

  async fn close(&self);
}

/// Rows an order read-back is assembled from, keyed by id.
#[derive(Default)]
pub(crate) struct DetailRows {
  pub items: Vec<crate::models::OrderItem>,
  pub products: std::collections::HashMap<Uuid, crate::models::ProductSummary>,
  pub variants: std::collections::HashMap<Uuid, crate::models::ProductVariant>,
  pub customers: std::collections::HashMap<Uuid, Customer>,
  pub managers: std::collections::HashMap<Uuid, Manager>,
}

impl DetailRows {
  /// Joins `orders` with the loaded rows, keeping the order of `orders` and of
  /// each order's items by position.
  pub(crate) fn assemble(mut self, orders: Vec<crate::models::Order>) -> Vec<OrderDetail> {
    self.items.sort_by_key(|item| item.position);
    orders
      .into_iter()
      .map(|order| {
        let items = self
          .items
          .iter()
          .filter(|item| item.order_id == order.id)
          .map(|item| crate::models::OrderItemDetail {
            item: item.clone(),
            product: self.products.get(&item.product_id).cloned(),
            variant: item.variant_id.and_then(|vid| self.variants.get(&vid).cloned()),
          })
          .collect();
        OrderDetail {
          customer: self.customers.get(&order.customer_id).cloned(),
          manager: order.manager_id.and_then(|mid| self.managers.get(&mid).cloned()),
          items,
          order,
        }
      })
      .collect()
  }
}
