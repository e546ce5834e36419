//! Operation identifiers.
//!
//! An operation is one piece of one order. Orders with quantity `q`
//! expand into pieces `1..=q`, so the total operation count of a
//! problem is the sum of all order quantities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one piece of one order.
///
/// Pieces are 1-based: the last piece of an order has `piece == quantity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperationId {
    /// Owning order ID.
    pub order_id: u32,
    /// Piece index within the order (1-based).
    pub piece: u32,
}

impl OperationId {
    /// Creates an operation identifier.
    pub fn new(order_id: u32, piece: u32) -> Self {
        Self { order_id, piece }
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "O{}_{}", self.order_id, self.piece)
    }
}
