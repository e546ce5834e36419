//! Genetic operators: selection, recombination, mutation and elitism.
//!
//! # Usage
//!
//! ```
//! use line_schedule::ga::operators::GeneticOperators;
//!
//! let ops = GeneticOperators::new(0.8, 0.1);
//! assert_eq!(ops.tournament_size, 5);
//! ```

use rand::Rng;

use super::chromosome::{
    Chromosome, line_mutation, order_crossover, swap_mutation, uniform_line_crossover,
};

/// Generation-building operators with their current rates.
///
/// The driver rebuilds this each generation so that the adaptive
/// mutation rate takes effect.
#[derive(Debug, Clone)]
pub struct GeneticOperators {
    /// Probability that a drawn parent pair is recombined.
    pub crossover_rate: f64,
    /// Per-child probability of each mutation kind.
    pub mutation_rate: f64,
    /// Contenders per tournament.
    pub tournament_size: usize,
}

impl Default for GeneticOperators {
    fn default() -> Self {
        Self::new(0.8, 0.1)
    }
}

impl GeneticOperators {
    /// Creates operators with tournament size 5.
    pub fn new(crossover_rate: f64, mutation_rate: f64) -> Self {
        Self {
            crossover_rate,
            mutation_rate,
            tournament_size: 5,
        }
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size.max(1);
        self
    }

    /// Tournament selection with replacement.
    ///
    /// Runs `count` independent tournaments; each draws `tournament_size`
    /// contenders uniformly and keeps the lowest fitness (first wins ties).
    pub fn select<'p, R: Rng>(
        &self,
        population: &'p [Chromosome],
        count: usize,
        rng: &mut R,
    ) -> Vec<&'p Chromosome> {
        if population.is_empty() {
            return Vec::new();
        }
        (0..count)
            .map(|_| {
                let mut winner = &population[rng.random_range(0..population.len())];
                for _ in 1..self.tournament_size {
                    let contender = &population[rng.random_range(0..population.len())];
                    if contender.fitness < winner.fitness {
                        winner = contender;
                    }
                }
                winner
            })
            .collect()
    }

    /// Recombines two parents.
    ///
    /// Sequences use OX around two random cut points (child 1 keeps
    /// `p1`'s segment, child 2 keeps `p2`'s); lines use uniform
    /// crossover. Children are unevaluated.
    pub fn crossover<R: Rng>(
        &self,
        p1: &Chromosome,
        p2: &Chromosome,
        rng: &mut R,
    ) -> (Chromosome, Chromosome) {
        let len = p1.len();
        if len == 0 || p2.len() != len {
            return (p1.clone(), p2.clone());
        }

        let a = rng.random_range(0..len);
        let b = rng.random_range(0..len);
        let (start, end) = (a.min(b), a.max(b));

        let seq1 = order_crossover(&p1.sequence, &p2.sequence, start, end);
        let seq2 = order_crossover(&p2.sequence, &p1.sequence, start, end);
        let lines1 = uniform_line_crossover(&p1.lines, &p2.lines, rng);
        let lines2 = uniform_line_crossover(&p2.lines, &p1.lines, rng);

        (Chromosome::new(seq1, lines1), Chromosome::new(seq2, lines2))
    }

    /// Mutates in place: a sequence swap and a line reassignment, each
    /// applied independently with probability `mutation_rate`.
    pub fn mutate<R: Rng>(&self, chromosome: &mut Chromosome, rng: &mut R) {
        if rng.random::<f64>() < self.mutation_rate {
            swap_mutation(chromosome, rng);
        }
        if rng.random::<f64>() < self.mutation_rate {
            line_mutation(chromosome, rng);
        }
    }

    /// Builds the next generation of `size` individuals.
    ///
    /// The best parent is carried over unchanged. The rest is filled by
    /// drawing random parent pairs, recombining them with probability
    /// `crossover_rate` (else copying them), and mutating the children;
    /// a second child that does not fit is dropped.
    pub fn next_generation<R: Rng>(
        &self,
        parents: &[&Chromosome],
        size: usize,
        rng: &mut R,
    ) -> Vec<Chromosome> {
        let mut next = Vec::with_capacity(size);
        let Some(elite) = parents
            .iter()
            .min_by(|a, b| a.fitness.total_cmp(&b.fitness))
        else {
            return next;
        };
        if size == 0 {
            return next;
        }
        next.push((*elite).clone());

        while next.len() < size {
            let p1 = parents[rng.random_range(0..parents.len())];
            let p2 = parents[rng.random_range(0..parents.len())];

            let (mut c1, mut c2) = if rng.random::<f64>() < self.crossover_rate {
                self.crossover(p1, p2, rng)
            } else {
                (p1.clone(), p2.clone())
            };

            self.mutate(&mut c1, rng);
            next.push(c1);
            if next.len() < size {
                self.mutate(&mut c2, rng);
                next.push(c2);
            }
        }
        next
    }
}
