//! Genetic scheduler and KPI evaluation.
//!
//! # Algorithm
//!
//! `GaScheduler` runs a generational GA over operation sequences and line
//! assignments, refining the best individuals of every generation with a
//! hybrid VNS + SA + TS local search. Fitness is the negated profit of the
//! decoded schedule, so lower is better.
//!
//! # KPI
//!
//! `ScheduleKpi` summarizes a decoded schedule: profit breakdown, late
//! orders, blocks paid, batching and per-line utilization.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 3-4
//! - Talbi (2009), "Metaheuristics: From Design to Implementation"

mod genetic;
mod kpi;

pub use genetic::{GaScheduler, GenerationStats};
pub use kpi::ScheduleKpi;
