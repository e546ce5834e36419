//! Customer order model.

use chrono::{NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use super::OperationId;

/// A customer order for `quantity` units of one product.
///
/// # Deadlines
/// Contract deadlines refer to 08:00 on the deadline's calendar date,
/// whatever time of day was recorded. See [`Order::aligned_deadline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: u32,
    /// Ordered product.
    pub product_id: u32,
    /// Number of units (one operation per unit).
    pub quantity: u32,
    /// Revenue earned by the order.
    pub total_value: f64,
    /// Recorded deadline.
    pub deadline: NaiveDateTime,
    /// Time the order arrived. `None` = known from the start.
    pub arrival: Option<NaiveDateTime>,
}

impl Order {
    /// Creates an order.
    pub fn new(
        id: u32,
        product_id: u32,
        quantity: u32,
        total_value: f64,
        deadline: NaiveDateTime,
    ) -> Self {
        Self {
            id,
            product_id,
            quantity,
            total_value,
            deadline,
            arrival: None,
        }
    }

    /// Sets the arrival time.
    pub fn with_arrival(mut self, arrival: NaiveDateTime) -> Self {
        self.arrival = Some(arrival);
        self
    }

    /// Deadline normalized to 08:00:00 on the deadline's calendar date.
    pub fn aligned_deadline(&self) -> NaiveDateTime {
        self.deadline.date().and_time(NaiveTime::MIN) + TimeDelta::hours(8)
    }

    /// Whether the order had arrived by `cutoff` (inclusive).
    ///
    /// Admission is the caller's job; the optimizer schedules every order
    /// it is given.
    pub fn arrived_by(&self, cutoff: NaiveDateTime) -> bool {
        self.arrival.map_or(true, |arrival| arrival <= cutoff)
    }

    /// Operations of this order, pieces `1..=quantity`.
    pub fn operations(&self) -> impl Iterator<Item = OperationId> + '_ {
        (1..=self.quantity).map(move |piece| OperationId::new(self.id, piece))
    }

    /// Whether `piece` is this order's last piece.
    #[inline]
    pub fn is_last_piece(&self, piece: u32) -> bool {
        self.quantity > 0 && piece == self.quantity
    }
}
