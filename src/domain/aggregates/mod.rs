//! Aggregates module
pub mod cart;
pub mod order;

pub use cart::{Cart, CartError, CartItem, CartLine, CatalogRef, CatalogVariant, InMemoryCart};
pub use order::{Address, DeliveryGroup, Order, OrderField, OrderStatus, OrderedItem};
