//! Schedule quality metrics (KPIs).
//!
//! Summarizes a decoded schedule against its input orders.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Profit | revenue - production cost - penalty |
//! | Late orders | completion strictly after the aligned deadline |
//! | On-time rate | fraction of completed orders that are not late |
//! | Blocks opened | records that paid a block wage |
//! | Batched records | records placed at zero marginal wage |
//! | Line utilization | busy hours / paid hours per line |
//! | Total / max lateness | completion - aligned deadline over late orders |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::models::{BLOCK_HOURS, DecodedSchedule, NUM_LINES, ScheduleContext};

/// Schedule performance indicators.
///
/// Lateness values are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Sum of order values.
    pub revenue: f64,
    /// Total block wages.
    pub production_cost: f64,
    /// Total late penalty.
    pub penalty: f64,
    /// revenue - production cost - penalty.
    pub profit: f64,
    /// Orders completing after their aligned deadline.
    pub late_orders: usize,
    /// Fraction of completed orders on time (0.0..=1.0).
    pub on_time_rate: f64,
    /// Number of wage blocks paid.
    pub blocks_opened: usize,
    /// Records placed without a wage charge.
    pub batched_records: usize,
    /// Processing hours per line (merged groups counted once).
    pub busy_hours_by_line: BTreeMap<usize, f64>,
    /// Busy hours over paid hours per line; 0 for lines that paid nothing.
    pub utilization_by_line: BTreeMap<usize, f64>,
    /// Mean utilization over lines that opened a block.
    pub avg_utilization: f64,
    /// Sum of lateness over late orders (s).
    pub total_lateness_secs: i64,
    /// Largest single lateness (s).
    pub max_lateness_secs: i64,
}

impl ScheduleKpi {
    /// Computes KPIs from a decoded schedule and its context.
    pub fn calculate(schedule: &DecodedSchedule, context: &ScheduleContext) -> Self {
        let mut late_orders = 0;
        let mut completed = 0;
        let mut total_lateness = 0;
        let mut max_lateness = 0;

        for order in context.orders() {
            let Some(&done) = schedule.completion_times.get(&order.id) else {
                continue;
            };
            completed += 1;
            let lateness = (done - order.aligned_deadline()).num_seconds();
            if lateness > 0 {
                late_orders += 1;
                total_lateness += lateness;
                max_lateness = max_lateness.max(lateness);
            }
        }

        let on_time_rate = if completed == 0 {
            1.0
        } else {
            (completed - late_orders) as f64 / completed as f64
        };

        let mut busy_hours_by_line = BTreeMap::new();
        let mut utilization_by_line = BTreeMap::new();
        let mut paid_lines = 0;
        let mut utilization_sum = 0.0;
        for line in 1..=NUM_LINES {
            let records = schedule.records_for_line(line);
            // Merged tail pieces share one interval.
            let intervals: BTreeSet<_> = records.iter().map(|r| (r.start, r.end)).collect();
            let busy_secs: i64 = intervals
                .iter()
                .map(|(start, end)| (*end - *start).num_seconds())
                .sum();
            let busy_hours = busy_secs as f64 / 3600.0;
            let paid_hours = (records.iter().filter(|r| r.opened_block()).count() as i64
                * BLOCK_HOURS) as f64;

            let utilization = if paid_hours > 0.0 {
                paid_lines += 1;
                busy_hours / paid_hours
            } else {
                0.0
            };
            utilization_sum += utilization;
            busy_hours_by_line.insert(line, busy_hours);
            utilization_by_line.insert(line, utilization);
        }
        let avg_utilization = if paid_lines == 0 {
            0.0
        } else {
            utilization_sum / paid_lines as f64
        };

        let blocks_opened = schedule.blocks_opened();

        Self {
            revenue: schedule.revenue,
            production_cost: schedule.production_cost,
            penalty: schedule.penalty,
            profit: schedule.profit(),
            late_orders,
            on_time_rate,
            blocks_opened,
            batched_records: schedule.records.len() - blocks_opened,
            busy_hours_by_line,
            utilization_by_line,
            avg_utilization,
            total_lateness_secs: total_lateness,
            max_lateness_secs: max_lateness,
        }
    }

    /// Whether the schedule meets the given quality thresholds.
    pub fn meets_thresholds(&self, max_lateness_secs: i64, min_utilization: f64) -> bool {
        self.max_lateness_secs <= max_lateness_secs && self.avg_utilization >= min_utilization
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::{Chromosome, decode};
    use crate::models::{Order, Product};
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 24)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_kpi_merged_tail_pieces() {
        let ctx = ScheduleContext::new(
            vec![Product::new(1, 2.0)],
            vec![
                Order::new(1, 1, 1, 500.0, start() + TimeDelta::days(1)),
                Order::new(2, 1, 1, 700.0, start() + TimeDelta::days(1)),
            ],
            start(),
        )
        .unwrap();
        let ch = Chromosome::new(ctx.operations(), vec![1, 1]);
        let schedule = decode(&ch, &ctx).unwrap();

        let kpi = ScheduleKpi::calculate(&schedule, &ctx);
        assert_eq!(kpi.blocks_opened, 1);
        assert_eq!(kpi.batched_records, 1);
        assert_eq!(kpi.late_orders, 0);
        assert!((kpi.on_time_rate - 1.0).abs() < 1e-10);
        assert!((kpi.production_cost - 200.0).abs() < 1e-10);
        assert!((kpi.profit - 1000.0).abs() < 1e-10);
        // one shared 4h interval on line 1
        assert!((kpi.busy_hours_by_line[&1] - 4.0).abs() < 1e-10);
        assert!((kpi.utilization_by_line[&1] - 1.0).abs() < 1e-10);
        assert!(kpi.utilization_by_line[&2].abs() < 1e-10);
        assert!((kpi.avg_utilization - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_kpi_lateness() {
        let ctx = ScheduleContext::new(
            vec![Product::new(1, 4.0)],
            vec![
                Order::new(1, 1, 1, 1000.0, start()),
                Order::new(2, 1, 1, 400.0, start() + TimeDelta::days(1)),
            ],
            start(),
        )
        .unwrap();
        let ch = Chromosome::new(ctx.operations(), vec![1, 2]);
        let schedule = decode(&ch, &ctx).unwrap();

        let kpi = ScheduleKpi::calculate(&schedule, &ctx);
        // order 1 finishes 12:00, aligned deadline 08:00
        assert_eq!(kpi.late_orders, 1);
        assert_eq!(kpi.total_lateness_secs, 4 * 3600);
        assert_eq!(kpi.max_lateness_secs, 4 * 3600);
        assert!((kpi.on_time_rate - 0.5).abs() < 1e-10);
        assert!((kpi.penalty - 100.0).abs() < 1e-10);
        assert!((kpi.profit - (1400.0 - 400.0 - 100.0)).abs() < 1e-10);
        assert!(!kpi.meets_thresholds(0, 0.0));
        assert!(kpi.meets_thresholds(4 * 3600, 0.5));
    }

    #[test]
    fn test_kpi_empty_schedule() {
        let ctx = ScheduleContext::new(vec![], vec![], start()).unwrap();
        let kpi = ScheduleKpi::calculate(&DecodedSchedule::empty(), &ctx);
        assert_eq!(kpi.blocks_opened, 0);
        assert_eq!(kpi.batched_records, 0);
        assert!((kpi.on_time_rate - 1.0).abs() < 1e-10);
        assert!(kpi.avg_utilization.abs() < 1e-10);
        assert_eq!(kpi.utilization_by_line.len(), NUM_LINES);
    }
}
