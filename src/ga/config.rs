//! Search configuration.
//!
//! # Usage
//!
//! ```
//! use line_schedule::ga::GaConfig;
//!
//! let config = GaConfig::default()
//!     .with_population_size(30)
//!     .with_max_generations(20)
//!     .with_seed(7);
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};

/// Parameters of the hybrid VNS + SA + TS intensifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalSearchConfig {
    /// Starting temperature of the annealing schedule.
    pub initial_temperature: f64,
    /// Geometric cooling factor applied after each neighborhood sweep.
    pub cooling_rate: f64,
    /// The search stops once the temperature drops to this floor.
    pub min_temperature: f64,
    /// Maximum number of move signatures kept in the tabu queue.
    pub tabu_tenure: usize,
    /// Moves tried at one temperature before cooling is forced.
    ///
    /// Neutral moves (delta = 0) are always accepted and reset the sweep,
    /// so flat landscapes could otherwise hold a temperature forever.
    pub max_moves_per_temperature: usize,
}

impl Default for LocalSearchConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 200.0,
            cooling_rate: 0.95,
            min_temperature: 1.0,
            tabu_tenure: 10,
            max_moves_per_temperature: 100,
        }
    }
}

/// Adaptive mutation schedule.
///
/// While the best fitness has not strictly improved for more than
/// `stagnation_threshold` generations, the mutation rate climbs by `step`
/// per generation up to `max_rate`; otherwise it falls back to the base
/// rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveMutation {
    /// Generations without improvement tolerated before boosting.
    pub stagnation_threshold: usize,
    /// Increase per stagnant generation.
    pub step: f64,
    /// Upper bound of the boosted rate.
    pub max_rate: f64,
}

impl Default for AdaptiveMutation {
    fn default() -> Self {
        Self {
            stagnation_threshold: 10,
            step: 0.05,
            max_rate: 0.5,
        }
    }
}

impl AdaptiveMutation {
    /// Mutation rate for the next generation.
    pub fn next_rate(&self, current: f64, base: f64, stagnation: usize) -> f64 {
        if stagnation > self.stagnation_threshold {
            (current + self.step).min(self.max_rate)
        } else {
            base
        }
    }
}

/// GA driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Probability that a parent pair is recombined.
    pub crossover_rate: f64,
    /// Base per-child probability of each mutation kind.
    pub mutation_rate: f64,
    /// Number of generations.
    pub max_generations: usize,
    /// Tournament size for parent selection.
    pub tournament_size: usize,
    /// Best individuals refined by local search each generation.
    pub elite_search_count: usize,
    /// RNG seed. `None` = seeded from OS entropy.
    pub seed: Option<u64>,
    /// Wall-clock budget checked between generations.
    pub time_limit: Option<Duration>,
    /// Adaptive mutation schedule.
    pub adaptive_mutation: AdaptiveMutation,
    /// Local search parameters.
    pub local_search: LocalSearchConfig,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            crossover_rate: 0.8,
            mutation_rate: 0.1,
            max_generations: 100,
            tournament_size: 5,
            elite_search_count: 5,
            seed: None,
            time_limit: None,
            adaptive_mutation: AdaptiveMutation::default(),
            local_search: LocalSearchConfig::default(),
        }
    }
}

impl GaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate;
        self
    }

    /// Sets the base mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, generations: usize) -> Self {
        self.max_generations = generations;
        self
    }

    /// Sets how many elites are refined per generation.
    pub fn with_elite_search_count(mut self, count: usize) -> Self {
        self.elite_search_count = count;
        self
    }

    /// Sets the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the wall-clock budget.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Sets the local search parameters.
    pub fn with_local_search(mut self, local_search: LocalSearchConfig) -> Self {
        self.local_search = local_search;
        self
    }

    /// Checks parameter ranges.
    ///
    /// # Errors
    /// [`ScheduleError::InvalidConfig`] naming the first bad parameter.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(ScheduleError::InvalidConfig(msg));

        if self.population_size == 0 {
            return fail("population_size must be positive".into());
        }
        if self.tournament_size == 0 {
            return fail("tournament_size must be positive".into());
        }
        for (name, rate) in [
            ("crossover_rate", self.crossover_rate),
            ("mutation_rate", self.mutation_rate),
            ("adaptive_mutation.max_rate", self.adaptive_mutation.max_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return fail(format!("{name} must be in [0, 1], got {rate}"));
            }
        }
        if !self.adaptive_mutation.step.is_finite() || self.adaptive_mutation.step < 0.0 {
            return fail("adaptive_mutation.step must be non-negative".into());
        }

        let ls = &self.local_search;
        if !(ls.cooling_rate > 0.0 && ls.cooling_rate < 1.0) {
            return fail(format!(
                "local_search.cooling_rate must be in (0, 1), got {}",
                ls.cooling_rate
            ));
        }
        if !(ls.min_temperature > 0.0 && ls.min_temperature.is_finite()) {
            return fail("local_search.min_temperature must be positive".into());
        }
        if !(ls.initial_temperature.is_finite() && ls.initial_temperature >= ls.min_temperature) {
            return fail(
                "local_search.initial_temperature must be finite and not below min_temperature"
                    .into(),
            );
        }
        if ls.max_moves_per_temperature == 0 {
            return fail("local_search.max_moves_per_temperature must be positive".into());
        }
        Ok(())
    }
}
