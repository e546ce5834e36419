//! Crate error type.

use thiserror::Error;

use crate::models::OperationId;
use crate::validation::ValidationError;

/// Errors raised by the scheduling core.
///
/// Well-formed input never produces one of these during a search; they
/// signal a contract violation between the caller, the context and a
/// chromosome.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    /// Input data failed validation.
    #[error("invalid input: {} issue(s)", .0.len())]
    InvalidInput(Vec<ValidationError>),
    /// An operation references an order that is not in the context.
    #[error("unknown order {0}")]
    UnknownOrder(u32),
    /// An order references a product that is not in the context.
    #[error("order {order_id} references unknown product {product_id}")]
    UnknownProduct {
        /// Referencing order.
        order_id: u32,
        /// Missing product.
        product_id: u32,
    },
    /// An operation's piece index is outside `1..=quantity`.
    #[error("unknown operation {0}")]
    UnknownOperation(OperationId),
    /// An operation appears more than once in a sequence.
    #[error("operation {0} appears more than once")]
    DuplicateOperation(OperationId),
    /// Sequence and assignment vectors do not match the context.
    #[error(
        "malformed chromosome: {sequence_len} operations, {assignment_len} line assignments, {expected} expected"
    )]
    MalformedChromosome {
        /// Length of the operation sequence.
        sequence_len: usize,
        /// Length of the line assignment vector.
        assignment_len: usize,
        /// Number of operations in the context.
        expected: usize,
    },
    /// A line assignment is outside `1..=NUM_LINES`.
    #[error("line {line} at position {position} is out of range")]
    LineOutOfRange {
        /// Position in the chromosome.
        position: usize,
        /// Offending line ID.
        line: usize,
    },
    /// Search parameters are out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Placing an operation would run past the representable time range.
    #[error("schedule of operation {0} runs past the representable time range")]
    TimeOverflow(OperationId),
    /// A result was requested before any solution exists.
    #[error("no solution available; run the scheduler first")]
    NoSolution,
}

/// Crate result alias.
pub type Result<T> = std::result::Result<T, ScheduleError>;
