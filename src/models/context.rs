//! Scheduling context: the immutable facts a decode reads.

use chrono::NaiveDateTime;
use std::collections::HashMap;

use super::{OperationId, Order, Product};
use crate::error::{Result, ScheduleError};
use crate::validation::validate_input;

/// Number of parallel production lines. Line IDs are `1..=NUM_LINES`.
pub const NUM_LINES: usize = 3;
/// Length of one wage block (hours).
pub const BLOCK_HOURS: i64 = 4;
/// Fraction of an order's value charged when it completes late.
pub const PENALTY_RATE: f64 = 0.1;
/// Base wage of one block before the shift coefficient is applied.
pub const BASE_PAY_PER_BLOCK: f64 = 200.0;

/// Products, admitted orders and the plan start, with O(1) lookups.
///
/// Construction validates the input, so every order's product is
/// guaranteed to resolve afterwards.
#[derive(Debug, Clone)]
pub struct ScheduleContext {
    products: Vec<Product>,
    orders: Vec<Order>,
    plan_start: NaiveDateTime,
    product_index: HashMap<u32, usize>,
    order_index: HashMap<u32, usize>,
    /// First flat operation slot of each order, parallel to `orders`.
    operation_offsets: Vec<usize>,
    total_operations: usize,
}

impl ScheduleContext {
    /// Builds a context from already-admitted orders.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidInput`] listing every validation issue.
    pub fn new(
        products: Vec<Product>,
        orders: Vec<Order>,
        plan_start: NaiveDateTime,
    ) -> Result<Self> {
        validate_input(&products, &orders).map_err(ScheduleError::InvalidInput)?;

        let product_index = products
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id, idx))
            .collect();
        let order_index = orders
            .iter()
            .enumerate()
            .map(|(idx, o)| (o.id, idx))
            .collect();

        let mut operation_offsets = Vec::with_capacity(orders.len());
        let mut total_operations = 0usize;
        for order in &orders {
            operation_offsets.push(total_operations);
            total_operations += order.quantity as usize;
        }

        Ok(Self {
            products,
            orders,
            plan_start,
            product_index,
            order_index,
            operation_offsets,
            total_operations,
        })
    }

    /// All known products.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Orders to schedule, in input order.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Plan start; the 4-hour block grid is anchored here.
    pub fn plan_start(&self) -> NaiveDateTime {
        self.plan_start
    }

    /// Whether there is nothing to schedule.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Position of an order in [`orders`](Self::orders).
    pub fn order_position(&self, order_id: u32) -> Result<usize> {
        self.order_index
            .get(&order_id)
            .copied()
            .ok_or(ScheduleError::UnknownOrder(order_id))
    }

    /// Looks up an order by ID.
    pub fn order(&self, order_id: u32) -> Result<&Order> {
        self.order_position(order_id).map(|idx| &self.orders[idx])
    }

    /// Looks up a product by ID.
    pub fn product(&self, product_id: u32) -> Option<&Product> {
        self.product_index
            .get(&product_id)
            .map(|&idx| &self.products[idx])
    }

    /// Product ordered by `order`.
    pub fn product_for(&self, order: &Order) -> Result<&Product> {
        self.product(order.product_id)
            .ok_or(ScheduleError::UnknownProduct {
                order_id: order.id,
                product_id: order.product_id,
            })
    }

    /// Flat slot of an operation in `0..total_operations()`.
    ///
    /// Slots follow order input order, then piece index.
    pub fn operation_slot(&self, op: OperationId) -> Result<usize> {
        let pos = self.order_position(op.order_id)?;
        let order = &self.orders[pos];
        if op.piece == 0 || op.piece > order.quantity {
            return Err(ScheduleError::UnknownOperation(op));
        }
        Ok(self.operation_offsets[pos] + (op.piece - 1) as usize)
    }

    /// Identity operation sequence: orders in input order, pieces ascending.
    pub fn operations(&self) -> Vec<OperationId> {
        let mut ops = Vec::with_capacity(self.total_operations);
        for order in &self.orders {
            ops.extend(order.operations());
        }
        ops
    }

    /// Sum of all order quantities.
    pub fn total_operations(&self) -> usize {
        self.total_operations
    }

    /// Sum of all order values.
    pub fn revenue(&self) -> f64 {
        self.orders.iter().map(|o| o.total_value).sum()
    }
}
