//! Chromosome decoder.
//!
//! Turns a chromosome into a timed, costed schedule under 4-hour wage
//! blocks. Decoding is pure: it reads the context, allocates call-local
//! state and returns identical output for identical input.
//!
//! # Algorithm
//!
//! 1. **Pre-pass**: flag every order's last piece as a *tail piece* when
//!    its product's unit time is below one block, and pool tail pieces by
//!    product (pool order = chromosome position).
//! 2. **Main pass**, in chromosome order, per operation on its line:
//!    - A flagged tail piece first pulls not-yet-scheduled tail pieces of
//!      the same product on the same line into its group while the summed
//!      duration stays within one block.
//!    - **Batch**: same product as the line's open block and enough paid
//!      time left → placed at the line's free time, no wage charged.
//!    - **New block**: otherwise a block opens on the next grid instant
//!      (grid anchored at plan start, 4 h pitch) and one block wage
//!      `BASE_PAY_PER_BLOCK × coefficient(start)` is charged.
//!    - Every member of a group gets its own record with the group's
//!      interval; only the triggering operation carries the charge.
//! 3. **Post-pass**: penalty for orders finishing after their aligned
//!    deadline, fitness = -(revenue - production cost - penalty).

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDateTime, TimeDelta};

use super::Chromosome;
use crate::error::{Result, ScheduleError};
use crate::models::{
    BASE_PAY_PER_BLOCK, BLOCK_HOURS, DecodedSchedule, NUM_LINES, PENALTY_RATE, ScheduleContext,
    ScheduledOperation, cost_coefficient, hours_to_secs,
};

const BLOCK_SECS: i64 = BLOCK_HOURS * 3600;

/// Decode-local state of one production line.
#[derive(Debug, Clone, Copy)]
struct LineState {
    /// Next instant the line is free.
    free: NaiveDateTime,
    /// End of the currently paid block.
    paid_until: NaiveDateTime,
    /// Product of the open block; `None` until the first block opens.
    product: Option<u32>,
}

impl LineState {
    fn idle(at: NaiveDateTime) -> Self {
        Self {
            free: at,
            paid_until: at,
            product: None,
        }
    }

    /// Whether a job of `product` lasting `duration` fits the open block.
    fn can_batch(&self, product: u32, duration: TimeDelta) -> bool {
        self.product == Some(product) && self.paid_until - self.free >= duration
    }

    /// Start of the next block this line may open.
    ///
    /// A line that has never opened a block may start on the grid instant
    /// at or after its free time. Afterwards the block always starts on a
    /// grid line strictly after the free time's cell, so a free time
    /// sitting exactly on a grid line moves on to the next one.
    ///
    /// `None` when the instant falls outside the representable range.
    fn next_block_start(&self, plan_start: NaiveDateTime) -> Option<NaiveDateTime> {
        let elapsed = (self.free - plan_start).num_seconds();
        let cell = elapsed.div_euclid(BLOCK_SECS);
        let on_grid = elapsed.rem_euclid(BLOCK_SECS) == 0;
        let index = if on_grid && self.product.is_none() {
            cell
        } else {
            cell + 1
        };
        let offset = index.checked_mul(BLOCK_SECS).and_then(TimeDelta::try_seconds)?;
        plan_start.checked_add_signed(offset)
    }
}

/// Per-position facts resolved once per decode.
#[derive(Debug, Clone, Copy)]
struct Placement {
    order_pos: usize,
    product_id: u32,
    hours: f64,
    line: usize,
    is_tail: bool,
}

/// Decodes a chromosome into a schedule.
///
/// An empty order set yields [`DecodedSchedule::empty`].
///
/// # Errors
/// Any [`Chromosome::check`] failure, a product lookup failure, or
/// [`ScheduleError::TimeOverflow`] when a placement would run past the
/// representable time range.
pub fn decode(chromosome: &Chromosome, context: &ScheduleContext) -> Result<DecodedSchedule> {
    if context.is_empty() {
        return Ok(DecodedSchedule::empty());
    }
    chromosome.check(context)?;

    let orders = context.orders();
    let plan_start = context.plan_start();

    let mut placements = Vec::with_capacity(chromosome.len());
    for (op, &line) in chromosome.sequence.iter().zip(&chromosome.lines) {
        let order_pos = context.order_position(op.order_id)?;
        let order = &orders[order_pos];
        let product = context.product_for(order)?;
        placements.push(Placement {
            order_pos,
            product_id: product.id,
            hours: product.unit_hours,
            line,
            is_tail: order.is_last_piece(op.piece) && product.fits_in_block(),
        });
    }

    // Tail pools keyed by product, positions ascending.
    let mut tail_pools: HashMap<u32, Vec<usize>> = HashMap::new();
    for (pos, p) in placements.iter().enumerate() {
        if p.is_tail {
            tail_pools.entry(p.product_id).or_default().push(pos);
        }
    }

    let mut lines = [LineState::idle(plan_start); NUM_LINES];
    let mut scheduled = vec![false; placements.len()];
    let mut progress = vec![0u32; orders.len()];
    let mut completion_times = BTreeMap::new();
    let mut records = Vec::with_capacity(placements.len());
    let mut production_cost = 0.0;
    let mut group = Vec::new();

    for pos in 0..placements.len() {
        // Already placed as part of an earlier tail group.
        if scheduled[pos] {
            continue;
        }
        scheduled[pos] = true;
        let current = placements[pos];

        group.clear();
        group.push(pos);
        let mut group_hours = current.hours;
        if current.is_tail {
            if let Some(pool) = tail_pools.get(&current.product_id) {
                for &other in pool {
                    if scheduled[other] || placements[other].line != current.line {
                        continue;
                    }
                    let hours = placements[other].hours;
                    if group_hours + hours <= BLOCK_HOURS as f64 {
                        group_hours += hours;
                        group.push(other);
                        scheduled[other] = true;
                    }
                }
            }
        }

        let overflow = || ScheduleError::TimeOverflow(chromosome.sequence[pos]);
        let duration = TimeDelta::try_seconds(hours_to_secs(group_hours)).ok_or_else(overflow)?;
        let state = &mut lines[current.line - 1];
        let (start, charged) = if state.can_batch(current.product_id, duration) {
            (state.free, 0.0)
        } else {
            let start = state.next_block_start(plan_start).ok_or_else(overflow)?;
            state.paid_until = start
                .checked_add_signed(TimeDelta::hours(BLOCK_HOURS))
                .ok_or_else(overflow)?;
            state.product = Some(current.product_id);
            (start, BASE_PAY_PER_BLOCK * cost_coefficient(start))
        };
        let end = start.checked_add_signed(duration).ok_or_else(overflow)?;
        state.free = end;
        production_cost += charged;

        let coefficient = cost_coefficient(start);
        for (k, &member) in group.iter().enumerate() {
            let placement = placements[member];
            records.push(ScheduledOperation {
                operation: chromosome.sequence[member],
                product_id: placement.product_id,
                line: placement.line,
                start,
                end,
                cost_coefficient: coefficient,
                charged_cost: if k == 0 { charged } else { 0.0 },
            });

            let order = &orders[placement.order_pos];
            progress[placement.order_pos] += 1;
            if progress[placement.order_pos] == order.quantity {
                completion_times.insert(order.id, end);
            }
        }
    }

    let penalty: f64 = orders
        .iter()
        .filter(|o| {
            completion_times
                .get(&o.id)
                .is_some_and(|&done| done > o.aligned_deadline())
        })
        .map(|o| o.total_value * PENALTY_RATE)
        .sum();
    let revenue = context.revenue();

    Ok(DecodedSchedule {
        production_cost,
        penalty,
        revenue,
        fitness: -(revenue - production_cost - penalty),
        records,
        completion_times,
    })
}

/// Decodes and returns only the fitness.
pub fn evaluate(chromosome: &Chromosome, context: &ScheduleContext) -> Result<f64> {
    decode(chromosome, context).map(|s| s.fitness)
}

/// Evaluates every individual in place.
pub fn evaluate_population(population: &mut [Chromosome], context: &ScheduleContext) -> Result<()> {
    for individual in population.iter_mut() {
        individual.fitness = evaluate(individual, context)?;
    }
    Ok(())
}
