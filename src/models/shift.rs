//! Shift periods and wage cost coefficients.
//!
//! The wage multiplier of a block depends only on the time of day at
//! which the block starts:
//!
//! | Start time | Period | Coefficient |
//! |------------|--------|-------------|
//! | exactly 00:00:00 | Night | 1.5 |
//! | (00:00, 08:00) | Late night | 2.0 |
//! | [08:00, 16:00) | Day | 1.0 |
//! | [16:00, 20:00) | Evening | 1.2 |
//! | [20:00, 24:00) | Night | 1.5 |

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Shift period a timestamp falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftPeriod {
    /// 08:00 to 16:00.
    Day,
    /// 16:00 to 20:00.
    Evening,
    /// 20:00 to midnight, midnight included.
    Night,
    /// After midnight until 08:00.
    LateNight,
}

impl ShiftPeriod {
    /// Classifies a timestamp by its time of day.
    pub fn of(timestamp: NaiveDateTime) -> Self {
        let time = timestamp.time();
        if time == NaiveTime::MIN {
            return ShiftPeriod::Night;
        }
        match time.hour() {
            0..=7 => ShiftPeriod::LateNight,
            8..=15 => ShiftPeriod::Day,
            16..=19 => ShiftPeriod::Evening,
            _ => ShiftPeriod::Night,
        }
    }

    /// Wage multiplier applied to a block starting in this period.
    pub fn coefficient(self) -> f64 {
        match self {
            ShiftPeriod::Day => 1.0,
            ShiftPeriod::Evening => 1.2,
            ShiftPeriod::Night => 1.5,
            ShiftPeriod::LateNight => 2.0,
        }
    }
}

/// Wage multiplier for a block starting at `timestamp`.
#[inline]
pub fn cost_coefficient(timestamp: NaiveDateTime) -> f64 {
    ShiftPeriod::of(timestamp).coefficient()
}
