//! Decoded schedule (solution) model.
//!
//! A decoded schedule is the timed, costed view of one chromosome:
//! one record per operation, the total wage cost, lateness penalties
//! and the completion time of every order.

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{OperationId, Order, ShiftPeriod};

/// One operation placed on a line and a time interval.
///
/// Records merged into a shared block carry the block's interval and a
/// zero `charged_cost`; only the operation that opened the block is
/// charged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledOperation {
    /// Scheduled operation.
    pub operation: OperationId,
    /// Product being made.
    pub product_id: u32,
    /// Production line (1-based).
    pub line: usize,
    /// Start time.
    pub start: NaiveDateTime,
    /// End time.
    pub end: NaiveDateTime,
    /// Shift coefficient at `start`.
    pub cost_coefficient: f64,
    /// Wage charged for this record (zero when batched or merged).
    pub charged_cost: f64,
}

impl ScheduledOperation {
    /// Occupied duration (end - start).
    #[inline]
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Whether this record opened a new paid block.
    #[inline]
    pub fn opened_block(&self) -> bool {
        self.charged_cost > 0.0
    }

    /// Shift period the record starts in.
    pub fn shift(&self) -> ShiftPeriod {
        ShiftPeriod::of(self.start)
    }
}

/// Result of decoding a chromosome.
///
/// `fitness = -(revenue - production_cost - penalty)`, so lower fitness
/// means higher profit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecodedSchedule {
    /// Sum of wages of every opened block.
    pub production_cost: f64,
    /// Sum of lateness penalties.
    pub penalty: f64,
    /// Sum of order values.
    pub revenue: f64,
    /// Negated profit.
    pub fitness: f64,
    /// Per-operation records, in placement order.
    pub records: Vec<ScheduledOperation>,
    /// Order ID → time its last piece finished.
    pub completion_times: BTreeMap<u32, NaiveDateTime>,
}

impl DecodedSchedule {
    /// Schedule of an empty order set: no records, all totals zero.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Profit: revenue minus wages minus penalties.
    #[inline]
    pub fn profit(&self) -> f64 {
        -self.fitness
    }

    /// Latest end time over all records.
    pub fn makespan(&self) -> Option<NaiveDateTime> {
        self.records.iter().map(|r| r.end).max()
    }

    /// Records on one line, in placement order.
    pub fn records_for_line(&self, line: usize) -> Vec<&ScheduledOperation> {
        self.records.iter().filter(|r| r.line == line).collect()
    }

    /// Records belonging to one order.
    pub fn records_for_order(&self, order_id: u32) -> Vec<&ScheduledOperation> {
        self.records
            .iter()
            .filter(|r| r.operation.order_id == order_id)
            .collect()
    }

    /// Number of paid blocks opened.
    pub fn blocks_opened(&self) -> usize {
        self.records.iter().filter(|r| r.opened_block()).count()
    }

    /// Whether `order` finished strictly after its aligned deadline.
    pub fn is_late(&self, order: &Order) -> bool {
        self.completion_times
            .get(&order.id)
            .is_some_and(|&done| done > order.aligned_deadline())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn record(
        order_id: u32,
        line: usize,
        start: NaiveDateTime,
        hours: i64,
        cost: f64,
    ) -> ScheduledOperation {
        ScheduledOperation {
            operation: OperationId::new(order_id, 1),
            product_id: 1,
            line,
            start,
            end: start + TimeDelta::hours(hours),
            cost_coefficient: 1.0,
            charged_cost: cost,
        }
    }

    fn sample() -> DecodedSchedule {
        let mut completion_times = BTreeMap::new();
        completion_times.insert(1, at(26, 10));
        completion_times.insert(2, at(27, 12));
        DecodedSchedule {
            production_cost: 400.0,
            penalty: 50.0,
            revenue: 1500.0,
            fitness: -1050.0,
            records: vec![
                record(1, 1, at(26, 8), 2, 200.0),
                record(2, 1, at(27, 8), 4, 200.0),
                record(3, 2, at(26, 8), 2, 0.0),
            ],
            completion_times,
        }
    }

    #[test]
    fn test_profit_and_makespan() {
        let s = sample();
        assert!((s.profit() - 1050.0).abs() < 1e-9);
        assert_eq!(s.makespan(), Some(at(27, 12)));
        assert_eq!(s.blocks_opened(), 2);
    }

    #[test]
    fn test_filters() {
        let s = sample();
        assert_eq!(s.records_for_line(1).len(), 2);
        assert_eq!(s.records_for_line(3).len(), 0);
        assert_eq!(s.records_for_order(2).len(), 1);
    }

    #[test]
    fn test_is_late() {
        let s = sample();
        // finished 10:00, deadline aligned to 08:00 the same day
        let same_day = Order::new(1, 1, 1, 500.0, at(26, 20));
        // finished 12:00 on the 27th, aligned deadline 08:00 on the 28th
        let next_day = Order::new(2, 1, 1, 500.0, at(28, 1));
        let unfinished = Order::new(9, 1, 1, 500.0, at(20, 8));
        assert!(s.is_late(&same_day));
        assert!(!s.is_late(&next_day));
        assert!(!s.is_late(&unfinished));
    }

    #[test]
    fn test_empty() {
        let s = DecodedSchedule::empty();
        assert!(s.records.is_empty());
        assert_eq!(s.makespan(), None);
        assert_eq!(s.profit(), 0.0);
        assert!(s.completion_times.is_empty());
    }

    #[test]
    fn test_serde_roundtrip() {
        let s = sample();
        let json = serde_json::to_string(&s).unwrap();
        let back: DecodedSchedule = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
