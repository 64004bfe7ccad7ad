//! Order lifecycle notifications

use crate::domain::aggregates::order::{Order, OrderStatus};

/// Synchronous, in-process subscriber to order status changes.
///
/// Called once per status write, strictly after the write is persisted.
/// `old_status` may equal the order's current status; a transition to the
/// same status still notifies.
pub trait OrderObserver: Send + Sync {
    fn order_status_changed(&self, order: &Order, old_status: OrderStatus);
}
