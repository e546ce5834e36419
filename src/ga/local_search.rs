//! Hybrid local search: VNS neighborhoods, SA acceptance, tabu memory.
//!
//! Refines one chromosome in place. Three neighborhoods are tried in
//! order (reassign → swap → relocate); an accepted move restarts at the
//! first neighborhood, a rejected one moves to the next, and a full
//! sweep of rejections cools the temperature geometrically. Moves whose
//! signature is in the tabu queue are rejected unless they beat the best
//! fitness seen in this run (aspiration). Non-improving moves pass the
//! Metropolis test `exp(-delta / T)`.
//!
//! When the temperature reaches the floor the best snapshot seen during
//! the run replaces the chromosome, so refinement never worsens fitness.

use std::collections::VecDeque;

use rand::Rng;
use tracing::{debug, trace};

use super::chromosome::{Chromosome, random_other_line, relocate};
use super::config::LocalSearchConfig;
use super::decoder::evaluate;
use crate::error::Result;
use crate::models::ScheduleContext;

/// Neighborhood structure, in VNS order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Neighborhood {
    /// Move one position to a different line.
    Reassign,
    /// Exchange the operations at two positions.
    Swap,
    /// Move one operation (with its line) to another position.
    Relocate,
}

impl Neighborhood {
    /// The following neighborhood, or `None` after the last one.
    pub fn next(self) -> Option<Self> {
        match self {
            Neighborhood::Reassign => Some(Neighborhood::Swap),
            Neighborhood::Swap => Some(Neighborhood::Relocate),
            Neighborhood::Relocate => None,
        }
    }
}

/// Identity of a move, as remembered by the tabu queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveSignature {
    /// Position reassigned and the line it left.
    Reassign { position: usize, old_line: usize },
    /// Swapped positions, ordered.
    Swap { low: usize, high: usize },
    /// Source position of a relocation.
    Relocate { source: usize },
}

/// Bounded FIFO of recent move signatures.
#[derive(Debug, Clone)]
pub struct TabuList {
    entries: VecDeque<MoveSignature>,
    tenure: usize,
}

impl TabuList {
    /// Creates an empty list holding at most `tenure` signatures.
    pub fn new(tenure: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(tenure),
            tenure,
        }
    }

    /// Whether `signature` is currently tabu.
    pub fn contains(&self, signature: &MoveSignature) -> bool {
        self.entries.contains(signature)
    }

    /// Records a signature, evicting the oldest beyond the tenure.
    pub fn push(&mut self, signature: MoveSignature) {
        if self.tenure == 0 {
            return;
        }
        self.entries.push_back(signature);
        while self.entries.len() > self.tenure {
            self.entries.pop_front();
        }
    }

    /// Number of remembered signatures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is remembered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Counters from one refinement run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocalSearchStats {
    /// Fitness on entry.
    pub initial_fitness: f64,
    /// Fitness of the returned chromosome.
    pub final_fitness: f64,
    /// Moves decoded.
    pub moves_tried: usize,
    /// Moves committed.
    pub moves_accepted: usize,
    /// Moves rejected by the tabu queue.
    pub tabu_rejections: usize,
    /// Temperature reductions.
    pub coolings: usize,
}

impl LocalSearchStats {
    /// Fitness gained (positive = better).
    pub fn improvement(&self) -> f64 {
        self.initial_fitness - self.final_fitness
    }
}

/// VNS + SA + TS intensifier.
#[derive(Debug, Clone, Default)]
pub struct HybridLocalSearch {
    config: LocalSearchConfig,
}

impl HybridLocalSearch {
    /// Creates a local search with the given parameters.
    pub fn new(config: LocalSearchConfig) -> Self {
        Self { config }
    }

    /// Parameters in use.
    pub fn config(&self) -> &LocalSearchConfig {
        &self.config
    }

    /// Refines `chromosome` in place.
    ///
    /// An unevaluated chromosome is evaluated first. The result is the
    /// best chromosome seen, so its fitness never exceeds the entry value.
    ///
    /// # Errors
    /// Decoding errors for a chromosome that does not match `context`.
    pub fn refine<R: Rng>(
        &self,
        chromosome: &mut Chromosome,
        context: &ScheduleContext,
        rng: &mut R,
    ) -> Result<LocalSearchStats> {
        if !chromosome.is_evaluated() {
            chromosome.fitness = evaluate(chromosome, context)?;
        }
        let mut stats = LocalSearchStats {
            initial_fitness: chromosome.fitness,
            final_fitness: chromosome.fitness,
            ..LocalSearchStats::default()
        };
        if chromosome.is_empty() {
            return Ok(stats);
        }

        let cfg = &self.config;
        let mut current = chromosome.clone();
        let mut best = chromosome.clone();
        let mut tabu = TabuList::new(cfg.tabu_tenure);
        let mut temperature = cfg.initial_temperature;
        let mut neighborhood = Neighborhood::Reassign;
        let mut moves_at_temperature = 0;

        while temperature > cfg.min_temperature {
            let mut candidate = current.clone();
            let signature = apply_move(&mut candidate, neighborhood, rng);
            candidate.fitness = evaluate(&candidate, context)?;
            stats.moves_tried += 1;
            moves_at_temperature += 1;

            let verdict = judge(
                tabu.contains(&signature),
                candidate.fitness,
                current.fitness,
                best.fitness,
                temperature,
                rng,
            );
            if verdict == Verdict::Tabu {
                stats.tabu_rejections += 1;
            }

            let mut cool = false;
            if verdict == Verdict::Accept {
                let delta = candidate.fitness - current.fitness;
                trace!(?signature, delta, temperature, "accepted move");
                current = candidate;
                if current.fitness < best.fitness {
                    best = current.clone();
                }
                tabu.push(signature);
                stats.moves_accepted += 1;
                neighborhood = Neighborhood::Reassign;
            } else {
                match neighborhood.next() {
                    Some(next) => neighborhood = next,
                    None => cool = true,
                }
            }

            if cool || moves_at_temperature >= cfg.max_moves_per_temperature {
                temperature *= cfg.cooling_rate;
                stats.coolings += 1;
                neighborhood = Neighborhood::Reassign;
                moves_at_temperature = 0;
            }
        }

        stats.final_fitness = best.fitness;
        *chromosome = best;
        debug!(
            initial = stats.initial_fitness,
            best = stats.final_fitness,
            tried = stats.moves_tried,
            accepted = stats.moves_accepted,
            "local search finished"
        );
        Ok(stats)
    }
}

/// Outcome of one attempted move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verdict {
    Accept,
    Reject,
    /// Rejected because the move is tabu and does not beat the best.
    Tabu,
}

/// Acceptance rule: tabu moves need aspiration (strictly better than
/// `best`); improving moves are taken; others pass the Metropolis test.
fn judge<R: Rng>(
    tabu_hit: bool,
    candidate: f64,
    current: f64,
    best: f64,
    temperature: f64,
    rng: &mut R,
) -> Verdict {
    if tabu_hit && candidate >= best {
        return Verdict::Tabu;
    }
    let delta = candidate - current;
    if delta < 0.0 || rng.random::<f64>() < (-delta / temperature).exp() {
        Verdict::Accept
    } else {
        Verdict::Reject
    }
}

/// Applies one random move from `neighborhood` and returns its signature.
///
/// The chromosome must be non-empty. Swap and relocate draw their two
/// positions independently, so they can be no-ops.
fn apply_move<R: Rng>(
    chromosome: &mut Chromosome,
    neighborhood: Neighborhood,
    rng: &mut R,
) -> MoveSignature {
    let len = chromosome.len();
    chromosome.fitness = f64::INFINITY;
    match neighborhood {
        Neighborhood::Reassign => {
            let position = rng.random_range(0..len);
            let old_line = chromosome.lines[position];
            chromosome.lines[position] = random_other_line(old_line, rng);
            MoveSignature::Reassign { position, old_line }
        }
        Neighborhood::Swap => {
            let i = rng.random_range(0..len);
            let j = rng.random_range(0..len);
            chromosome.sequence.swap(i, j);
            MoveSignature::Swap {
                low: i.min(j),
                high: i.max(j),
            }
        }
        Neighborhood::Relocate => {
            let source = rng.random_range(0..len);
            let target = rng.random_range(0..len);
            relocate(chromosome, source, target);
            MoveSignature::Relocate { source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::init::initialize_population;
    use crate::models::{Order, Product};
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 24)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn sample_context() -> ScheduleContext {
        ScheduleContext::new(
            vec![
                Product::new(1, 4.0),
                Product::new(2, 2.0),
                Product::new(3, 1.5),
            ],
            vec![
                Order::new(1, 1, 2, 1500.0, start() + TimeDelta::days(1)),
                Order::new(2, 2, 3, 900.0, start()),
                Order::new(3, 3, 2, 600.0, start() + TimeDelta::days(2)),
                Order::new(4, 2, 1, 400.0, start() + TimeDelta::days(1)),
            ],
            start(),
        )
        .unwrap()
    }

    fn quick_search() -> HybridLocalSearch {
        HybridLocalSearch::new(LocalSearchConfig {
            initial_temperature: 100.0,
            cooling_rate: 0.8,
            min_temperature: 1.0,
            tabu_tenure: 10,
            max_moves_per_temperature: 200,
        })
    }

    #[test]
    fn test_neighborhood_cycle() {
        assert_eq!(Neighborhood::Reassign.next(), Some(Neighborhood::Swap));
        assert_eq!(Neighborhood::Swap.next(), Some(Neighborhood::Relocate));
        assert_eq!(Neighborhood::Relocate.next(), None);
    }

    #[test]
    fn test_tabu_list_evicts_oldest() {
        let mut tabu = TabuList::new(2);
        let a = MoveSignature::Relocate { source: 0 };
        let b = MoveSignature::Swap { low: 1, high: 3 };
        let c = MoveSignature::Reassign {
            position: 2,
            old_line: 1,
        };

        tabu.push(a);
        tabu.push(b);
        assert!(tabu.contains(&a));
        tabu.push(c);
        assert_eq!(tabu.len(), 2);
        assert!(!tabu.contains(&a));
        assert!(tabu.contains(&b));
        assert!(tabu.contains(&c));
    }

    #[test]
    fn test_tabu_list_zero_tenure() {
        let mut tabu = TabuList::new(0);
        tabu.push(MoveSignature::Relocate { source: 0 });
        assert!(tabu.is_empty());
    }

    #[test]
    fn test_judge_tabu_without_aspiration_rejected() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            // equal to best, and even improving on current
            assert_eq!(judge(true, -100.0, -90.0, -100.0, 1e9, &mut rng), Verdict::Tabu);
            assert_eq!(judge(true, -80.0, -90.0, -100.0, 1e9, &mut rng), Verdict::Tabu);
        }
    }

    #[test]
    fn test_judge_tabu_with_aspiration_accepted() {
        let mut rng = SmallRng::seed_from_u64(2);
        for _ in 0..50 {
            assert_eq!(judge(true, -101.0, -90.0, -100.0, 1e-9, &mut rng), Verdict::Accept);
        }
    }

    #[test]
    fn test_judge_improving_move_always_accepted() {
        let mut rng = SmallRng::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(judge(false, -91.0, -90.0, -200.0, 1e-9, &mut rng), Verdict::Accept);
        }
    }

    #[test]
    fn test_judge_metropolis() {
        let mut rng = SmallRng::seed_from_u64(4);
        // exp(-1e6) underflows to 0: never accepted
        for _ in 0..50 {
            assert_eq!(judge(false, 0.0, -1e6, -1e6, 1.0, &mut rng), Verdict::Reject);
        }
        // neutral move: exp(0) = 1, always accepted
        for _ in 0..50 {
            assert_eq!(judge(false, -5.0, -5.0, -10.0, 1.0, &mut rng), Verdict::Accept);
        }
        let accepted = (0..1000)
            .filter(|_| judge(false, 10.0, 0.0, 0.0, 10.0, &mut rng) == Verdict::Accept)
            .count();
        // exp(-1) ≈ 0.37
        assert!((250..500).contains(&accepted), "accepted {accepted}");
    }

    #[test]
    fn test_refine_never_worsens() {
        let ctx = sample_context();
        let mut rng = SmallRng::seed_from_u64(42);
        let search = quick_search();
        let mut pop = initialize_population(&ctx, 6, &mut rng).unwrap();

        for ch in &mut pop {
            let before = evaluate(ch, &ctx).unwrap();
            let stats = search.refine(ch, &ctx, &mut rng).unwrap();
            assert!(ch.fitness <= before);
            assert!((stats.initial_fitness - before).abs() < 1e-9);
            assert!((stats.final_fitness - ch.fitness).abs() < 1e-9);
            assert!(stats.improvement() >= 0.0);
            assert!(stats.moves_tried > 0);
            assert!(ch.is_valid(&ctx));
            // fitness matches the returned encoding
            assert!((evaluate(ch, &ctx).unwrap() - ch.fitness).abs() < 1e-9);
        }
    }

    #[test]
    fn test_refine_evaluates_fresh_chromosome() {
        let ctx = sample_context();
        let mut rng = SmallRng::seed_from_u64(3);
        let mut ch = Chromosome::with_random_lines(ctx.operations(), &mut rng);
        assert!(!ch.is_evaluated());

        quick_search().refine(&mut ch, &ctx, &mut rng).unwrap();
        assert!(ch.is_evaluated());
    }

    #[test]
    fn test_refine_is_reproducible() {
        let ctx = sample_context();
        let search = quick_search();
        let seed_ch = {
            let mut rng = SmallRng::seed_from_u64(11);
            Chromosome::with_random_lines(ctx.operations(), &mut rng)
        };

        let mut a = seed_ch.clone();
        let mut b = seed_ch;
        search
            .refine(&mut a, &ctx, &mut SmallRng::seed_from_u64(5))
            .unwrap();
        search
            .refine(&mut b, &ctx, &mut SmallRng::seed_from_u64(5))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_refine_single_operation_terminates() {
        let ctx = ScheduleContext::new(
            vec![Product::new(1, 4.0)],
            vec![Order::new(1, 1, 1, 1000.0, start() + TimeDelta::days(1))],
            start(),
        )
        .unwrap();
        let mut rng = SmallRng::seed_from_u64(8);
        let mut ch = Chromosome::with_random_lines(ctx.operations(), &mut rng);

        let stats = quick_search().refine(&mut ch, &ctx, &mut rng).unwrap();
        // every line opens its first block at 08:00 for 200
        assert!((ch.fitness + 800.0).abs() < 1e-9);
        assert!(stats.coolings > 0);
        // flat landscape: every neighborhood exhausts its few signatures
        assert!(stats.tabu_rejections > 0);
        assert!(stats.moves_accepted < stats.moves_tried);
    }

    #[test]
    fn test_refine_empty_chromosome() {
        let ctx = ScheduleContext::new(vec![], vec![], start()).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut ch = Chromosome::empty();

        let stats = quick_search().refine(&mut ch, &ctx, &mut rng).unwrap();
        assert_eq!(stats.moves_tried, 0);
        assert!(ch.fitness.abs() < 1e-9);
    }
}
