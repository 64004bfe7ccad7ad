//! Storefront checkout core
//!
//! Converts shopping carts into priced orders and coordinates pluggable
//! payment providers.
//!
//! ## Features
//! - Cart-to-order construction with delivery-group partitioning
//! - Frozen pricing snapshots, independent of later catalog changes
//! - Permissive status lifecycle with synchronous observer notification
//! - Payment provider contract with a confirmation protocol
//! - In-memory cart and order store for embedding and tests

pub mod checkout;
pub mod domain;
pub mod payment;

use thiserror::Error;
use uuid::Uuid;

pub use checkout::partition::{Partition, Partitioner, SingleGroupPartitioner};
pub use checkout::repository::{InMemoryOrderRepository, OrderRepository};
pub use checkout::CheckoutService;
pub use domain::aggregates::cart::{
    Cart, CartError, CartItem, CartLine, CatalogRef, CatalogVariant, InMemoryCart,
};
pub use domain::aggregates::order::{
    Address, DeliveryGroup, Order, OrderField, OrderStatus, OrderedItem,
};
pub use domain::events::OrderObserver;
pub use domain::value_objects::{OrderToken, Price, PriceError, TokenError};
pub use payment::mock::MockPaymentProvider;
pub use payment::{
    ConfigField, ConfigurationForm, PaymentError, PaymentProvider, PaymentRegistry, PaymentType,
    PaymentVariant,
};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("cannot create an order from an empty cart")]
    EmptyCart,

    #[error("no unused order token after {0} attempts")]
    TokenSpaceExhausted(u32),

    #[error("order not found: {0}")]
    OrderNotFound(Uuid),

    #[error("invalid billing address: {0}")]
    InvalidBilling(#[from] validator::ValidationErrors),

    #[error(transparent)]
    Price(#[from] PriceError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
