// tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

use storefront::config::AppConfig;
use storefront::models::payloads::{CreateOrderItemRequest, CreateOrderRequest};
use storefront::models::{CategoryRef, NewCustomer, NewManager, NewProduct, NewVariant};
use storefront::services::pricing::VariantPolicy;
use storefront::state::AppState;
use storefront::store::{CatalogStore, DirectoryStore, MemoryStore};

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn rub(amount: i64) -> Decimal {
  Decimal::new(amount, 0)
}

/// Ids of the catalog and directory rows every scenario starts from.
#[derive(Debug, Clone)]
pub struct Fixture {
  /// Priced 100, no variants, 5 in stock.
  pub plain_product: Uuid,
  /// Priced 100 with size "42" at 120 and size "40" inheriting the product price.
  pub sized_product: Uuid,
  pub size_42: Uuid,
  pub size_40: Uuid,
  /// Exactly one unit in stock.
  pub last_unit_product: Uuid,
  pub customer: Uuid,
  pub manager: Uuid,
}

pub fn config_with_policy(policy: VariantPolicy) -> AppConfig {
  AppConfig {
    variant_policy: policy,
    ..AppConfig::default()
  }
}

pub fn memory_state(config: AppConfig) -> (AppState, Arc<MemoryStore>) {
  setup_tracing();
  let store = Arc::new(MemoryStore::new());
  let state = AppState::new(store.clone(), Arc::new(config)).expect("pipelines register");
  (state, store)
}

fn product(sku: &str, price: i64, stock_total: i32, variants: Vec<NewVariant>) -> NewProduct {
  NewProduct {
    sku: sku.to_string(),
    name_ru: format!("Товар {}", sku),
    name_en: format!("Item {}", sku),
    description_ru: None,
    description_en: None,
    price: rub(price),
    old_price: None,
    stock_total,
    low_stock_threshold: 1,
    category: Some(CategoryRef::Provision {
      slug: "boots".to_string(),
      name_ru: "Ботинки".to_string(),
      name_en: "Boots".to_string(),
    }),
    tags: vec!["test".to_string()],
    images: Vec::new(),
    variants,
  }
}

pub async fn seed_fixture(store: &MemoryStore) -> Fixture {
  let plain_product = store.create_product(product("PLAIN-1", 100, 5, Vec::new())).await.unwrap();
  let sized_product = store
    .create_product(product(
      "SIZED-1",
      100,
      10,
      vec![
        NewVariant {
          label: "42".to_string(),
          price: Some(rub(120)),
          stock: 5,
        },
        NewVariant {
          label: "40".to_string(),
          price: None,
          stock: 5,
        },
      ],
    ))
    .await
    .unwrap();
  let last_unit_product = store.create_product(product("LAST-1", 250, 1, Vec::new())).await.unwrap();

  let sized = store.get_product(sized_product).await.unwrap().unwrap();
  let size_42 = sized.variants.iter().find(|v| v.label == "42").unwrap().id;
  let size_40 = sized.variants.iter().find(|v| v.label == "40").unwrap().id;

  let customer = store
    .create_customer(NewCustomer {
      full_name: "Иван Петров".to_string(),
      email: Some("ivan@example.com".to_string()),
      phone: None,
    })
    .await
    .unwrap()
    .id;
  let manager = store
    .create_manager(NewManager {
      full_name: "Olga Manager".to_string(),
      email: "olga@bootbox.example".to_string(),
      password_hash: storefront::services::auth_service::hash_password("correct-horse").unwrap(),
    })
    .await
    .unwrap()
    .id;

  Fixture {
    plain_product,
    sized_product,
    size_42,
    size_40,
    last_unit_product,
    customer,
    manager,
  }
}

pub fn line(product_id: Uuid, variant_id: Option<Uuid>, quantity: i64) -> CreateOrderItemRequest {
  CreateOrderItemRequest {
    product_id: Some(product_id.to_string()),
    variant_id: variant_id.map(|v| v.to_string()),
    quantity: Some(json!(quantity)),
  }
}

pub fn order_request(customer: Uuid, items: Vec<CreateOrderItemRequest>) -> CreateOrderRequest {
  CreateOrderRequest {
    customer_id: Some(customer.to_string()),
    items: Some(items),
    ..CreateOrderRequest::default()
  }
}

/// Reads a decimal that serde rendered as a JSON string.
pub fn json_decimal(value: &Value) -> Decimal {
  value.as_str().and_then(|s| s.parse().ok()).expect("decimal string")
}
