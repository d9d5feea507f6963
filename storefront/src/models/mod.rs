// storefront/src/models/mod.rs

//! Contains data structures representing database entities.

pub mod category;
pub mod customer;
pub mod manager;
pub mod order;
pub mod order_item;
pub mod payloads;
pub mod product;

pub use category::Category;
pub use customer::{Customer, NewCustomer};
pub use manager::{Manager, NewManager};
pub use order::{DeliveryStatus, NewOrder, Order, OrderDetail, OrderFilter, OrderPatch, PaymentStatus};
pub use order_item::{OrderItem, OrderItemDetail, OrderItemDraft};
pub use product::{
  CategoryRef, NewProduct, NewVariant, Product, ProductFilter, ProductPatch, ProductSummary, ProductVariant,
};
