//! Initial population seeding.
//!
//! Individuals are split into three cohorts by index:
//!
//! | Cohort | Share | Sequence |
//! |--------|-------|----------|
//! | Product-clustered | first 40% | sorted by product ID |
//! | Deadline-first | next 30% | sorted by aligned deadline |
//! | Random | remaining 30% | shuffled identity |
//!
//! Both sorts are stable over the identity sequence. Lines are drawn
//! uniformly at random for every individual regardless of cohort.

use rand::Rng;
use rand::seq::SliceRandom;

use super::Chromosome;
use crate::error::Result;
use crate::models::{OperationId, ScheduleContext};

/// Seeding strategy of one initial individual.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedStrategy {
    /// Operations grouped by product, promoting batching.
    ProductClustered,
    /// Operations ordered by aligned deadline, urgent work first.
    DeadlineFirst,
    /// Uniformly shuffled operations.
    Random,
}

impl SeedStrategy {
    /// Strategy of individual `index` in a population of `size`.
    pub fn for_index(index: usize, size: usize) -> Self {
        let i = index as f64;
        let n = size as f64;
        if i < n * 0.4 {
            SeedStrategy::ProductClustered
        } else if i < n * 0.7 {
            SeedStrategy::DeadlineFirst
        } else {
            SeedStrategy::Random
        }
    }
}

/// Creates `size` unevaluated chromosomes.
///
/// # Errors
/// A product lookup failure; impossible for a validated context.
pub fn initialize_population<R: Rng>(
    context: &ScheduleContext,
    size: usize,
    rng: &mut R,
) -> Result<Vec<Chromosome>> {
    let identity = context.operations();

    let mut by_product = Vec::with_capacity(identity.len());
    let mut by_deadline = Vec::with_capacity(identity.len());
    for &op in &identity {
        let order = context.order(op.order_id)?;
        let product = context.product_for(order)?;
        by_product.push((product.id, op));
        by_deadline.push((order.aligned_deadline(), op));
    }
    by_product.sort_by_key(|&(product_id, _)| product_id);
    by_deadline.sort_by_key(|&(deadline, _)| deadline);
    let by_product: Vec<OperationId> = by_product.into_iter().map(|(_, op)| op).collect();
    let by_deadline: Vec<OperationId> = by_deadline.into_iter().map(|(_, op)| op).collect();

    let population = (0..size)
        .map(|i| {
            let sequence = match SeedStrategy::for_index(i, size) {
                SeedStrategy::ProductClustered => by_product.clone(),
                SeedStrategy::DeadlineFirst => by_deadline.clone(),
                SeedStrategy::Random => {
                    let mut shuffled = identity.clone();
                    shuffled.shuffle(rng);
                    shuffled
                }
            };
            Chromosome::with_random_lines(sequence, rng)
        })
        .collect();
    Ok(population)
}
