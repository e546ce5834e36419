//! Genetic scheduler: the generation loop tying the search together.
//!
//! # Algorithm
//!
//! 1. Seed and evaluate the initial population.
//! 2. Per generation:
//!    - adapt the mutation rate to the stagnation counter,
//!    - tournament-select parents and build the next generation
//!      (elitism + crossover + mutation),
//!    - evaluate it and refine its best individuals with local search,
//!    - keep the global best; a strict improvement resets stagnation.
//! 3. Return the global best chromosome.
//!
//! All randomness comes from one `SmallRng` owned by the scheduler, so a
//! fixed seed reproduces a run exactly.

use std::time::Instant;

use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Result, ScheduleError};
use crate::ga::{
    Chromosome, GaConfig, GeneticOperators, HybridLocalSearch, decode, evaluate,
    evaluate_population, initialize_population,
};
use crate::models::{DecodedSchedule, ScheduleContext};

/// Snapshot of one completed generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// Zero-based generation index.
    pub generation: usize,
    /// Global best fitness after this generation.
    pub best_fitness: f64,
    /// Best fitness within this generation.
    pub generation_best: f64,
    /// Mutation rate used for this generation.
    pub mutation_rate: f64,
    /// Generations since the last strict improvement.
    pub stagnation: usize,
}

/// GA driver with elite local search.
///
/// # Example
///
/// ```
/// use chrono::{NaiveDate, TimeDelta};
/// use line_schedule::ga::GaConfig;
/// use line_schedule::models::{Order, Product, ScheduleContext};
/// use line_schedule::scheduler::GaScheduler;
///
/// let start = NaiveDate::from_ymd_opt(2025, 11, 24)
///     .unwrap()
///     .and_hms_opt(8, 0, 0)
///     .unwrap();
/// let context = ScheduleContext::new(
///     vec![Product::new(1, 4.0)],
///     vec![Order::new(1, 1, 1, 1000.0, start + TimeDelta::days(1))],
///     start,
/// )
/// .unwrap();
///
/// let config = GaConfig::default()
///     .with_population_size(8)
///     .with_max_generations(3)
///     .with_seed(42);
/// let mut scheduler = GaScheduler::new(&context, config).unwrap();
/// let best = scheduler.run().unwrap();
/// assert!((best.fitness + 800.0).abs() < 1e-9);
///
/// let schedule = scheduler.best_schedule().unwrap();
/// assert_eq!(schedule.records.len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct GaScheduler<'a> {
    context: &'a ScheduleContext,
    config: GaConfig,
    rng: SmallRng,
    best: Option<Chromosome>,
    history: Vec<GenerationStats>,
}

impl<'a> GaScheduler<'a> {
    /// Creates a scheduler over `context`.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidConfig`] when `config` fails validation.
    pub fn new(context: &'a ScheduleContext, config: GaConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Ok(Self {
            context,
            config,
            rng,
            best: None,
            history: Vec::new(),
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }

    /// Best chromosome of the last run.
    pub fn best(&self) -> Option<&Chromosome> {
        self.best.as_ref()
    }

    /// Per-generation statistics of the last run.
    pub fn history(&self) -> &[GenerationStats] {
        &self.history
    }

    /// Generations completed by the last run.
    pub fn generations_run(&self) -> usize {
        self.history.len()
    }

    /// Runs the search and returns the best chromosome found.
    ///
    /// An empty order list returns an empty chromosome without searching.
    ///
    /// # Errors
    /// Decoding errors; impossible for chromosomes built from `context`.
    pub fn run(&mut self) -> Result<Chromosome> {
        self.history.clear();
        let context = self.context;

        if context.is_empty() {
            let mut empty = Chromosome::empty();
            empty.fitness = evaluate(&empty, context)?;
            self.best = Some(empty.clone());
            return Ok(empty);
        }

        let cfg = self.config.clone();
        let started = Instant::now();
        let search = HybridLocalSearch::new(cfg.local_search.clone());

        info!(
            orders = context.orders().len(),
            operations = context.total_operations(),
            population = cfg.population_size,
            generations = cfg.max_generations,
            "starting genetic search"
        );

        let mut population = initialize_population(context, cfg.population_size, &mut self.rng)?;
        evaluate_population(&mut population, context)?;
        let mut best = fittest(&population)?.clone();
        let mut mutation_rate = cfg.mutation_rate;
        let mut stagnation = 0;

        for generation in 0..cfg.max_generations {
            if let Some(limit) = cfg.time_limit {
                if started.elapsed() >= limit {
                    warn!(
                        generation,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "time limit reached, stopping early"
                    );
                    break;
                }
            }

            mutation_rate = cfg
                .adaptive_mutation
                .next_rate(mutation_rate, cfg.mutation_rate, stagnation);
            let operators = GeneticOperators::new(cfg.crossover_rate, mutation_rate)
                .with_tournament_size(cfg.tournament_size);

            let mut next = {
                let parents = operators.select(&population, population.len(), &mut self.rng);
                operators.next_generation(&parents, cfg.population_size, &mut self.rng)
            };
            evaluate_population(&mut next, context)?;

            next.sort_by(|a, b| a.fitness.total_cmp(&b.fitness));
            let elites = cfg.elite_search_count.min(next.len());
            for individual in next.iter_mut().take(elites) {
                search.refine(individual, context, &mut self.rng)?;
            }

            let generation_best = fittest(&next)?;
            if generation_best.fitness < best.fitness {
                best = generation_best.clone();
                stagnation = 0;
                info!(generation, fitness = best.fitness, "new best schedule");
            } else {
                stagnation += 1;
            }

            self.history.push(GenerationStats {
                generation,
                best_fitness: best.fitness,
                generation_best: generation_best.fitness,
                mutation_rate,
                stagnation,
            });
            if generation % 10 == 0 {
                debug!(
                    generation,
                    best = best.fitness,
                    current = generation_best.fitness,
                    mutation_rate,
                    stagnation,
                    "generation complete"
                );
            }

            population = next;
        }

        info!(
            fitness = best.fitness,
            generations = self.history.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "genetic search finished"
        );
        self.best = Some(best.clone());
        Ok(best)
    }

    /// Decodes the stored best chromosome.
    ///
    /// The schedule is rebuilt on every call so it always reflects the
    /// stored chromosome exactly.
    ///
    /// # Errors
    /// [`ScheduleError::NoSolution`] before [`run`](Self::run).
    pub fn best_schedule(&self) -> Result<DecodedSchedule> {
        match &self.best {
            Some(best) => decode(best, self.context),
            None => Err(ScheduleError::NoSolution),
        }
    }
}

/// Lowest-fitness individual; the first one wins ties.
fn fittest(population: &[Chromosome]) -> Result<&Chromosome> {
    population
        .iter()
        .reduce(|best, c| if c.fitness < best.fitness { c } else { best })
        .ok_or(ScheduleError::NoSolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::LocalSearchConfig;
    use crate::models::{Order, Product};
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
    use std::time::Duration;

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
                Product::new(3, 1.0),
            ],
            vec![
                Order::new(1, 1, 2, 2000.0, start() + TimeDelta::days(1)),
                Order::new(2, 2, 3, 1200.0, start() + TimeDelta::days(1)),
                Order::new(3, 3, 2, 500.0, start()),
                Order::new(4, 2, 1, 600.0, start() + TimeDelta::days(2)),
            ],
            start(),
        )
        .unwrap()
    }

    fn quick_config(seed: u64) -> GaConfig {
        GaConfig::default()
            .with_population_size(10)
            .with_max_generations(5)
            .with_elite_search_count(2)
            .with_seed(seed)
            .with_local_search(LocalSearchConfig {
                initial_temperature: 50.0,
                cooling_rate: 0.7,
                min_temperature: 1.0,
                tabu_tenure: 10,
                max_moves_per_temperature: 100,
            })
    }

    #[test]
    fn test_invalid_config_rejected() {
        let ctx = sample_context();
        let result = GaScheduler::new(&ctx, GaConfig::default().with_population_size(0));
        assert!(matches!(result, Err(ScheduleError::InvalidConfig(_))));
    }

    #[test]
    fn test_best_schedule_before_run() {
        let ctx = sample_context();
        let scheduler = GaScheduler::new(&ctx, quick_config(1)).unwrap();
        assert!(scheduler.best().is_none());
        assert_eq!(scheduler.best_schedule(), Err(ScheduleError::NoSolution));
    }

    #[test]
    fn test_run_produces_valid_best() {
        let ctx = sample_context();
        let mut scheduler = GaScheduler::new(&ctx, quick_config(42)).unwrap();
        let best = scheduler.run().unwrap();

        assert!(best.is_valid(&ctx));
        assert!(best.fitness.is_finite());
        assert_eq!(scheduler.generations_run(), 5);

        let schedule = scheduler.best_schedule().unwrap();
        assert!((schedule.fitness - best.fitness).abs() < 1e-9);
        assert_eq!(schedule.records.len(), ctx.total_operations());
    }

    #[test]
    fn test_history_is_monotone() {
        let ctx = sample_context();
        let mut scheduler = GaScheduler::new(&ctx, quick_config(7)).unwrap();
        let best = scheduler.run().unwrap();

        let history = scheduler.history();
        assert!(
            history
                .windows(2)
                .all(|w| w[1].best_fitness <= w[0].best_fitness)
        );
        for stats in history {
            assert!(stats.best_fitness <= stats.generation_best);
        }
        let last = history.last().unwrap();
        assert!((last.best_fitness - best.fitness).abs() < 1e-9);
    }

    #[test]
    fn test_seeded_runs_match() {
        let ctx = sample_context();
        let a = GaScheduler::new(&ctx, quick_config(9)).unwrap().run().unwrap();
        let b = GaScheduler::new(&ctx, quick_config(9)).unwrap().run().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_orders() {
        let ctx = ScheduleContext::new(vec![Product::new(1, 2.0)], vec![], start()).unwrap();
        let mut scheduler = GaScheduler::new(&ctx, quick_config(1)).unwrap();
        let best = scheduler.run().unwrap();

        assert!(best.is_empty());
        assert!(best.fitness.abs() < 1e-9);
        assert_eq!(scheduler.generations_run(), 0);
        let schedule = scheduler.best_schedule().unwrap();
        assert!(schedule.records.is_empty());
        assert!(schedule.completion_times.is_empty());
    }

    #[test]
    fn test_zero_time_limit_stops_before_first_generation() {
        let ctx = sample_context();
        let config = quick_config(3).with_time_limit(Duration::ZERO);
        let mut scheduler = GaScheduler::new(&ctx, config).unwrap();
        let best = scheduler.run().unwrap();

        assert_eq!(scheduler.generations_run(), 0);
        assert!(best.is_valid(&ctx));
    }

    #[test]
    fn test_stagnation_raises_mutation_rate() {
        // one 4h piece: every chromosome scores -800, nothing ever improves
        let ctx = ScheduleContext::new(
            vec![Product::new(1, 4.0)],
            vec![Order::new(1, 1, 1, 1000.0, start() + TimeDelta::days(1))],
            start(),
        )
        .unwrap();
        let config = quick_config(5).with_max_generations(20);
        let base = config.mutation_rate;
        let mut scheduler = GaScheduler::new(&ctx, config).unwrap();
        scheduler.run().unwrap();

        let history = scheduler.history();
        assert_eq!(history.len(), 20);
        for (g, stats) in history.iter().enumerate() {
            assert_eq!(stats.generation, g);
            assert_eq!(stats.stagnation, g + 1);
            assert!((stats.best_fitness + 800.0).abs() < 1e-9);
            // the rate for generation g sees the stagnation left by g - 1
            let expected = if g <= 10 {
                base
            } else {
                (base + 0.05 * (g - 10) as f64).min(0.5)
            };
            assert!(
                (stats.mutation_rate - expected).abs() < 1e-9,
                "generation {g}: rate {} != {expected}",
                stats.mutation_rate
            );
        }
        assert!((history[19].mutation_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_fittest_prefers_first_on_ties() {
        let mut a = Chromosome::empty();
        a.fitness = -5.0;
        let mut b = Chromosome::empty();
        b.fitness = -5.0;
        b.lines.push(1);
        let population = vec![a.clone(), b];
        assert_eq!(fittest(&population).unwrap(), &a);
        assert_eq!(fittest(&[]), Err(ScheduleError::NoSolution));
    }
}
