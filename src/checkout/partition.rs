//! Cart partitioning strategies

use crate::domain::aggregates::cart::{Cart, CartLine};

/// One planned delivery group: a delivery method and the lines it carries.
pub struct Partition<'a> {
    pub delivery_type: String,
    pub lines: Vec<&'a dyn CartLine>,
}

/// Splits cart contents into an ordered sequence of delivery groups.
///
/// External collaborator seam; order construction consumes whatever grouping
/// the strategy decides on (by delivery method, vendor, weight class...).
pub trait Partitioner: Send + Sync {
    fn partition<'a>(&self, cart: &'a dyn Cart) -> Vec<Partition<'a>>;
}

/// Puts every line into a single group with a fixed delivery method.
pub struct SingleGroupPartitioner {
    delivery_type: String,
}

impl SingleGroupPartitioner {
    pub fn new(delivery_type: impl Into<String>) -> Self {
        Self { delivery_type: delivery_type.into() }
    }
}

impl Partitioner for SingleGroupPartitioner {
    fn partition<'a>(&self, cart: &'a dyn Cart) -> Vec<Partition<'a>> {
        let lines = cart.lines();
        if lines.is_empty() {
            return vec![];
        }
        vec![Partition { delivery_type: self.delivery_type.clone(), lines }]
    }
}
