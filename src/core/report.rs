//! Order dashboard figures.
//!
//! The admin panel header shows how many orders exist and how many are waiting,
//! in the kitchen, or ready for pickup.

use crate::entities::{OrderModel, order::OrderStatus};
use serde::Serialize;

/// Counts shown above the order list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OrderStats {
    pub total: usize,
    pub pending: usize,
    pub preparing: usize,
    pub ready: usize,
}

/// Tallies a list of orders.
#[must_use]
pub fn summarize_orders(orders: &[OrderModel]) -> OrderStats {
    let count = |status: OrderStatus| orders.iter().filter(|o| o.status == status).count();
    OrderStats {
        total: orders.len(),
        pending: count(OrderStatus::Pending),
        preparing: count(OrderStatus::Preparing),
        ready: count(OrderStatus::Ready),
    }
}
