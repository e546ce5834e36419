//! Production scheduling domain models.
//!
//! Immutable facts (products, orders, shift costs) plus the decoded
//! schedule produced for a candidate solution.
//!
//! # Domain
//!
//! | Type | Meaning |
//! |------|---------|
//! | `Product` | Something a line makes, with a unit processing time |
//! | `Order` | Quantity of one product, a value and a deadline |
//! | `OperationId` | One piece of one order |
//! | `ScheduleContext` | Products, admitted orders, plan start |
//! | `DecodedSchedule` | Timed, costed placement of every operation |

mod context;
mod operation;
mod order;
mod product;
mod schedule;
mod shift;

pub use context::{BASE_PAY_PER_BLOCK, BLOCK_HOURS, NUM_LINES, PENALTY_RATE, ScheduleContext};
pub use operation::OperationId;
pub use order::Order;
pub use product::{Product, hours_to_secs};
pub use schedule::{DecodedSchedule, ScheduledOperation};
pub use shift::{ShiftPeriod, cost_coefficient};
