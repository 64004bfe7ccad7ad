//! Persistence boundary for orders

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::aggregates::order::{Order, OrderField, OrderStatus};
use crate::{CheckoutError, Result};

/// Store gateway owned by the persistence boundary and injected into the
/// checkout service. The store enforces token uniqueness across all orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Insert or fully replace an order together with everything it owns.
    async fn save(&self, order: &Order) -> Result<()>;

    /// Write only the listed fields of an already-saved order.
    async fn update_fields(&self, order: &Order, fields: &[OrderField]) -> Result<()>;

    /// Remove an order; owned groups, items and variants go with it.
    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn find(&self, id: Uuid) -> Result<Option<Order>>;

    /// Ids of orders still in checkout status that were built from the cart.
    async fn checkout_orders_for_cart(&self, cart_id: Uuid) -> Result<Vec<Uuid>>;

    async fn token_exists(&self, token: &str) -> Result<bool>;

    /// All orders, most recent status change first.
    async fn list(&self) -> Result<Vec<Order>>;
}

/// Map-backed repository for tests and single-process embedding.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<HashMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, Order>>> {
        self.orders
            .lock()
            .map_err(|_| CheckoutError::Storage("order store mutex poisoned".into()))
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: &Order) -> Result<()> {
        self.lock()?.insert(order.id(), order.clone());
        Ok(())
    }

    async fn update_fields(&self, order: &Order, fields: &[OrderField]) -> Result<()> {
        let mut orders = self.lock()?;
        let stored = orders
            .get_mut(&order.id())
            .ok_or(CheckoutError::OrderNotFound(order.id()))?;
        stored.copy_fields_from(order, fields);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.lock()?.remove(&id);
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Option<Order>> {
        Ok(self.lock()?.get(&id).cloned())
    }

    async fn checkout_orders_for_cart(&self, cart_id: Uuid) -> Result<Vec<Uuid>> {
        Ok(self
            .lock()?
            .values()
            .filter(|o| o.cart_id() == cart_id && o.status() == OrderStatus::Checkout)
            .map(|o| o.id())
            .collect())
    }

    async fn token_exists(&self, token: &str) -> Result<bool> {
        Ok(self
            .lock()?
            .values()
            .any(|o| o.token().map(|t| t.as_str()) == Some(token)))
    }

    async fn list(&self) -> Result<Vec<Order>> {
        let mut orders: Vec<Order> = self.lock()?.values().cloned().collect();
        orders.sort_by(|a, b| b.last_status_change().cmp(&a.last_status_change()));
        Ok(orders)
    }
}
