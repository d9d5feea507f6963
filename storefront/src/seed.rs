// storefront/src/seed.rs

//! Demo catalog for local runs. Loaded through the store traits so it works on
//! either backend; a store that already lists products is left untouched.

use rust_decimal::Decimal;
use tracing::{info, instrument};

use crate::errors::Result;
use crate::models::{CategoryRef, NewCustomer, NewManager, NewProduct, NewVariant, ProductFilter};
use crate::services::auth_service::hash_password;
use crate::store::Store;

pub const DEMO_MANAGER_EMAIL: &str = "manager@bootbox.example";
pub const DEMO_MANAGER_PASSWORD: &str = "bootbox-demo";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
  pub products: usize,
  pub customers: usize,
  pub managers: usize,
}

fn rub(amount: i64) -> Decimal {
  Decimal::new(amount * 100, 2)
}

fn category(slug: &str, name_ru: &str, name_en: &str) -> Option<CategoryRef> {
  Some(CategoryRef::Provision {
    slug: slug.to_string(),
    name_ru: name_ru.to_string(),
    name_en: name_en.to_string(),
  })
}

fn sizes(labels: &[(&str, Option<i64>, i32)]) -> Vec<NewVariant> {
  labels
    .iter()
    .map(|(label, price, stock)| NewVariant {
      label: (*label).to_string(),
      price: price.map(rub),
      stock: *stock,
    })
    .collect()
}

fn demo_products() -> Vec<NewProduct> {
  vec![
    NewProduct {
      sku: "BB-CHELSEA-01".to_string(),
      name_ru: "Челси кожаные".to_string(),
      name_en: "Leather Chelsea boots".to_string(),
      description_ru: Some("Классические челси из натуральной кожи.".to_string()),
      description_en: Some("Classic full-grain leather Chelsea boots.".to_string()),
      price: rub(8990),
      old_price: Some(rub(10990)),
      stock_total: 12,
      low_stock_threshold: 3,
      category: category("boots", "Ботинки", "Boots"),
      tags: vec!["leather".to_string(), "autumn".to_string()],
      images: vec!["/img/chelsea-01.jpg".to_string()],
      variants: sizes(&[("40", None, 4), ("42", None, 5), ("44", Some(9490), 3)]),
    },
    NewProduct {
      sku: "BB-RUNNER-02".to_string(),
      name_ru: "Кроссовки беговые".to_string(),
      name_en: "Running sneakers".to_string(),
      description_ru: None,
      description_en: None,
      price: rub(5490),
      old_price: None,
      stock_total: 30,
      low_stock_threshold: 5,
      category: category("sneakers", "Кроссовки", "Sneakers"),
      tags: vec!["sport".to_string()],
      images: Vec::new(),
      variants: sizes(&[("41", None, 10), ("43", None, 20)]),
    },
    NewProduct {
      sku: "BB-LOAFER-03".to_string(),
      name_ru: "Лоферы замшевые".to_string(),
      name_en: "Suede loafers".to_string(),
      description_ru: None,
      description_en: Some("Soft suede, leather sole.".to_string()),
      price: rub(6990),
      old_price: None,
      stock_total: 2,
      low_stock_threshold: 3,
      category: category("shoes", "Туфли", "Shoes"),
      tags: vec!["suede".to_string(), "summer".to_string()],
      images: Vec::new(),
      variants: Vec::new(),
    },
  ]
}

/// Loads the demo catalog, one customer and one manager.
#[instrument(name = "seed_demo_data", skip_all, fields(backend = store.backend_name()))]
pub async fn seed_demo_data(store: &dyn Store) -> Result<SeedSummary> {
  if !store.list_products(&ProductFilter::default()).await?.is_empty() {
    info!("Store already holds products; skipping demo seed.");
    return Ok(SeedSummary::default());
  }

  let mut summary = SeedSummary::default();
  for new_product in demo_products() {
    store.create_product(new_product).await?;
    summary.products += 1;
  }

  store
    .create_customer(NewCustomer {
      full_name: "Анна Смирнова".to_string(),
      email: Some("anna@example.com".to_string()),
      phone: Some("+7 900 000-00-00".to_string()),
    })
    .await?;
  summary.customers += 1;

  store
    .create_manager(NewManager {
      full_name: "Demo Manager".to_string(),
      email: DEMO_MANAGER_EMAIL.to_string(),
      password_hash: hash_password(DEMO_MANAGER_PASSWORD)?,
    })
    .await?;
  summary.managers += 1;

  info!(?summary, "Demo data seeded.");
  Ok(summary)
}
