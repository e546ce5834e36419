//! Genetic search over operation sequences and line assignments.
//!
//! # Encoding
//!
//! - **Sequence**: permutation of every operation of every order; the
//!   decoder places operations strictly in this order.
//! - **Lines**: production line (`1..=NUM_LINES`) per sequence position.
//!
//! # Submodules
//!
//! - [`decoder`]: chromosome → timed, costed schedule under 4-hour wage blocks
//! - [`init`]: product-clustered / deadline-first / random seeding
//! - [`operators`]: tournament selection, OX + uniform crossover, mutation, elitism
//! - [`local_search`]: VNS + simulated annealing + tabu refinement of elites
//!
//! The generation loop lives in [`crate::scheduler::GaScheduler`].
//!
//! # Reference
//! - Cheng et al. (1996), "A Tutorial Survey of JSSP using GA"
//! - Bierwirth (1995), "A generalized permutation approach to JSSP"

mod chromosome;
mod config;
pub mod decoder;
pub mod init;
pub mod local_search;
pub mod operators;

pub use chromosome::{
    Chromosome, line_mutation, order_crossover, random_line, random_other_line, relocate,
    swap_mutation, uniform_line_crossover,
};
pub use config::{AdaptiveMutation, GaConfig, LocalSearchConfig};
pub use decoder::{decode, evaluate, evaluate_population};
pub use init::{SeedStrategy, initialize_population};
pub use local_search::{HybridLocalSearch, LocalSearchStats};
pub use operators::GeneticOperators;
