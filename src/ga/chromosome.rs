//! Operation-sequence / line-assignment chromosome.
//!
//! # Encoding
//!
//! The chromosome consists of two index-aligned vectors:
//! - **Sequence**: a permutation of every operation of the problem. The
//!   decoder places operations strictly in this order.
//! - **Lines**: the production line (`1..=NUM_LINES`) of the operation at
//!   the same position.
//!
//! Moves that relocate an operation carry its line with it; swaps only
//! exchange sequence entries.
//!
//! # Reference
//! Bierwirth (1995), "A generalized permutation approach to JSSP"

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use crate::models::{NUM_LINES, OperationId, ScheduleContext};

/// Line-assignment chromosome for the scheduling GA.
///
/// Lower fitness = better schedule (fitness is negated profit).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chromosome {
    /// Operations in placement order.
    pub sequence: Vec<OperationId>,
    /// Line per position (1-based), parallel to `sequence`.
    pub lines: Vec<usize>,
    /// Fitness value (lower = better). `INFINITY` until evaluated.
    pub fitness: f64,
}

impl Chromosome {
    /// Creates an unevaluated chromosome.
    pub fn new(sequence: Vec<OperationId>, lines: Vec<usize>) -> Self {
        Self {
            sequence,
            lines,
            fitness: f64::INFINITY,
        }
    }

    /// Chromosome with no operations.
    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Creates a chromosome with independently drawn random lines.
    pub fn with_random_lines<R: Rng>(sequence: Vec<OperationId>, rng: &mut R) -> Self {
        let lines = (0..sequence.len()).map(|_| random_line(rng)).collect();
        Self::new(sequence, lines)
    }

    /// Number of operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Whether the chromosome has no operations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Whether the fitness has been computed.
    #[inline]
    pub fn is_evaluated(&self) -> bool {
        self.fitness.is_finite()
    }

    /// Checks the encoding invariants against a context.
    ///
    /// # Errors
    /// - [`ScheduleError::MalformedChromosome`] on a length mismatch
    /// - [`ScheduleError::LineOutOfRange`] for a line outside `1..=NUM_LINES`
    /// - [`ScheduleError::UnknownOrder`] / [`ScheduleError::UnknownOperation`]
    ///   for operations the context does not know
    /// - [`ScheduleError::DuplicateOperation`] when the sequence is not a
    ///   permutation
    pub fn check(&self, context: &ScheduleContext) -> Result<()> {
        let expected = context.total_operations();
        if self.sequence.len() != expected || self.lines.len() != expected {
            return Err(ScheduleError::MalformedChromosome {
                sequence_len: self.sequence.len(),
                assignment_len: self.lines.len(),
                expected,
            });
        }

        let mut seen = vec![false; expected];
        for (position, (&op, &line)) in self.sequence.iter().zip(&self.lines).enumerate() {
            if !(1..=NUM_LINES).contains(&line) {
                return Err(ScheduleError::LineOutOfRange { position, line });
            }
            let slot = context.operation_slot(op)?;
            if std::mem::replace(&mut seen[slot], true) {
                return Err(ScheduleError::DuplicateOperation(op));
            }
        }
        Ok(())
    }

    /// Whether [`check`](Self::check) passes.
    pub fn is_valid(&self, context: &ScheduleContext) -> bool {
        self.check(context).is_ok()
    }
}

/// Uniformly random line in `1..=NUM_LINES`.
#[inline]
pub fn random_line<R: Rng>(rng: &mut R) -> usize {
    rng.random_range(1..=NUM_LINES)
}

/// Uniformly random line different from `current`.
#[inline]
pub fn random_other_line<R: Rng>(current: usize, rng: &mut R) -> usize {
    let line = rng.random_range(1..NUM_LINES);
    if line >= current { line + 1 } else { line }
}

// ======================== Crossover operators ========================

/// Performs OX (Order Crossover) on operation sequences.
///
/// Copies `donor[start..=end]` into the child at the same indices, then
/// fills the remaining positions circularly from `end + 1`, taking
/// operations from `other` in its sequence order (also starting at
/// `end + 1` and wrapping), skipping operations already placed.
///
/// # Reference
/// Davis (1985), "Applying adaptive algorithms to epistatic domains"
pub fn order_crossover(
    donor: &[OperationId],
    other: &[OperationId],
    start: usize,
    end: usize,
) -> Vec<OperationId> {
    let len = donor.len();
    if len == 0 {
        return Vec::new();
    }

    let mut child: Vec<Option<OperationId>> = vec![None; len];
    let mut placed = HashSet::with_capacity(len);
    for i in start..=end {
        child[i] = Some(donor[i]);
        placed.insert(donor[i]);
    }

    let mut write = (end + 1) % len;
    for k in 0..len {
        let gene = other[(end + 1 + k) % len];
        if placed.insert(gene) {
            child[write] = Some(gene);
            write = (write + 1) % len;
        }
    }

    child.into_iter().flatten().collect()
}

/// Uniform crossover of line assignments: each position inherits from
/// `a` or `b` with equal probability.
pub fn uniform_line_crossover<R: Rng>(a: &[usize], b: &[usize], rng: &mut R) -> Vec<usize> {
    a.iter()
        .zip(b)
        .map(|(&la, &lb)| if rng.random_bool(0.5) { la } else { lb })
        .collect()
}

// ======================== Mutation operators ========================

/// Swap mutation: exchanges the operations at two distinct random positions.
///
/// Line assignments stay in place.
pub fn swap_mutation<R: Rng>(chromosome: &mut Chromosome, rng: &mut R) {
    let len = chromosome.sequence.len();
    if len < 2 {
        return;
    }
    let i = rng.random_range(0..len);
    let mut j = rng.random_range(0..len - 1);
    if j >= i {
        j += 1;
    }
    chromosome.sequence.swap(i, j);
}

/// Line mutation: moves one random position to a different line.
pub fn line_mutation<R: Rng>(chromosome: &mut Chromosome, rng: &mut R) {
    if chromosome.lines.is_empty() {
        return;
    }
    let idx = rng.random_range(0..chromosome.lines.len());
    chromosome.lines[idx] = random_other_line(chromosome.lines[idx], rng);
}

/// Removes the operation at `from` and reinserts it at `to`, moving its
/// line assignment along with it.
pub fn relocate(chromosome: &mut Chromosome, from: usize, to: usize) {
    if from == to {
        return;
    }
    let op = chromosome.sequence.remove(from);
    chromosome.sequence.insert(to, op);
    let line = chromosome.lines.remove(from);
    chromosome.lines.insert(to, line);
}
