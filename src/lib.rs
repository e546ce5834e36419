//! Wage-block aware production line scheduling.
//!
//! Assigns every unit of every customer order to one of three identical
//! production lines and sequences it, paying wages in 4-hour blocks whose
//! price depends on the shift they start in. The search maximizes
//! `revenue - wages - late penalties`.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Product`, `Order`, `OperationId`,
//!   `ScheduleContext`, shift pricing, `DecodedSchedule`
//! - **`ga`**: Chromosome, decoder, population seeding, genetic operators,
//!   hybrid local search
//! - **`scheduler`**: `GaScheduler` (generation loop) and `ScheduleKpi`
//! - **`validation`**: Input integrity checks (duplicate IDs, product refs,
//!   processing times, order values)
//! - **`error`**: `ScheduleError` and the crate `Result`
//!
//! # Example
//!
//! ```
//! use chrono::{NaiveDate, TimeDelta};
//! use line_schedule::ga::{Chromosome, decode};
//! use line_schedule::models::{Order, Product, ScheduleContext};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 11, 24)
//!     .unwrap()
//!     .and_hms_opt(8, 0, 0)
//!     .unwrap();
//! let context = ScheduleContext::new(
//!     vec![Product::new(1, 4.0)],
//!     vec![Order::new(1, 1, 1, 1000.0, start + TimeDelta::days(1))],
//!     start,
//! )
//! .unwrap();
//!
//! let chromosome = Chromosome::new(context.operations(), vec![1]);
//! let schedule = decode(&chromosome, &context).unwrap();
//! assert!((schedule.production_cost - 200.0).abs() < 1e-9);
//! assert!((schedule.fitness + 800.0).abs() < 1e-9);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Cheng et al. (1996), "A Tutorial Survey of JSSP using GA"

pub mod error;
pub mod ga;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{Result, ScheduleError};
