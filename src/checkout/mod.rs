//! Order construction and lifecycle service

pub mod partition;
pub mod repository;

use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::aggregates::cart::Cart;
use crate::domain::aggregates::order::{DeliveryGroup, Order, OrderField, OrderStatus};
use crate::domain::events::OrderObserver;
use crate::domain::value_objects::OrderToken;
use crate::{CheckoutError, Result};
use partition::Partitioner;
use repository::OrderRepository;

/// Attempts at drawing an unused token before giving up.
const TOKEN_ATTEMPTS: u32 = 100;

/// Builds orders out of carts and drives their status lifecycle.
///
/// Collaborators are injected: the repository owns persistence, the
/// partitioner owns delivery grouping, observers react to status changes.
pub struct CheckoutService {
    repository: Arc<dyn OrderRepository>,
    partitioner: Arc<dyn Partitioner>,
    observers: Vec<Arc<dyn OrderObserver>>,
}

impl CheckoutService {
    pub fn new(repository: Arc<dyn OrderRepository>, partitioner: Arc<dyn Partitioner>) -> Self {
        Self { repository, partitioner, observers: vec![] }
    }

    /// Observers are notified synchronously, in registration order.
    pub fn register_observer(&mut self, observer: Arc<dyn OrderObserver>) {
        self.observers.push(observer);
    }

    /// Create an order from the cart, or rebuild `instance` from it.
    ///
    /// Rebuilding purges the instance's delivery groups and payment variants
    /// first and is idempotent: the same cart state yields an equivalent
    /// order. The purge and rebuild happen on the owned aggregate, so the
    /// store sees a single atomic replace. Other orders still undergoing
    /// checkout for the same cart are discarded afterwards. The cart itself
    /// is never touched.
    pub async fn order_from_cart(&self, cart: &dyn Cart, instance: Option<Order>) -> Result<Order> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        let mut order = match instance {
            Some(mut order) => {
                order.purge_for_rebuild();
                order
            }
            None => Order::new(cart.id(), cart.owner(), cart.currency()),
        };

        let partitions = self.partitioner.partition(cart);
        debug!(order_id = %order.id(), partitions = partitions.len(), "partitioned cart");
        for partition in &partitions {
            let mut group = DeliveryGroup::new(partition.delivery_type.clone());
            for line in &partition.lines {
                group.snapshot_line(*line);
            }
            order.add_delivery_group(group);
        }

        self.persist(&mut order).await?;
        self.discard_stale_checkouts(cart.id(), order.id()).await?;
        info!(order_id = %order.id(), groups = order.groups().len(), "order built from cart");
        Ok(order)
    }

    /// Move the order to `new_status`, stamping the change time.
    ///
    /// Persists only the status, the change time and any `extra_fields`,
    /// then notifies every observer with the old status. Notification
    /// happens strictly after the write; a same-status transition still
    /// counts and still notifies.
    pub async fn set_status(
        &self,
        order: &mut Order,
        new_status: OrderStatus,
        extra_fields: &[OrderField],
    ) -> Result<()> {
        let old_status = order.apply_status(new_status);
        let mut fields = vec![OrderField::Status, OrderField::LastStatusChange];
        fields.extend_from_slice(extra_fields);
        self.repository.update_fields(order, &fields).await?;
        info!(order_id = %order.id(), old = %old_status, new = %new_status, "order status changed");
        for observer in &self.observers {
            observer.order_status_changed(order, old_status);
        }
        Ok(())
    }

    async fn persist(&self, order: &mut Order) -> Result<()> {
        if order.token().is_none() {
            order.assign_token(self.free_token().await?);
        }
        self.repository.save(order).await
    }

    async fn free_token(&self) -> Result<OrderToken> {
        for attempt in 1..=TOKEN_ATTEMPTS {
            let token = OrderToken::generate();
            if !self.repository.token_exists(token.as_str()).await? {
                return Ok(token);
            }
            warn!(attempt, "order token collision");
        }
        Err(CheckoutError::TokenSpaceExhausted(TOKEN_ATTEMPTS))
    }

    async fn discard_stale_checkouts(&self, cart_id: Uuid, keep: Uuid) -> Result<()> {
        for stale in self.repository.checkout_orders_for_cart(cart_id).await? {
            if stale != keep {
                debug!(order_id = %stale, "discarding abandoned checkout order");
                self.repository.delete(stale).await?;
            }
        }
        Ok(())
    }
}
