//! Product model.

use serde::{Deserialize, Serialize};

use super::BLOCK_HOURS;

/// A product type that a production line can make.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier.
    pub id: u32,
    /// Processing time of one unit (hours, may be fractional).
    pub unit_hours: f64,
}

impl Product {
    /// Creates a product.
    pub fn new(id: u32, unit_hours: f64) -> Self {
        Self { id, unit_hours }
    }

    /// Processing time of one unit in whole seconds (truncated).
    #[inline]
    pub fn unit_secs(&self) -> i64 {
        hours_to_secs(self.unit_hours)
    }

    /// Whether a unit is shorter than one wage block, which makes an
    /// order's last piece eligible for cross-order consolidation.
    #[inline]
    pub fn fits_in_block(&self) -> bool {
        self.unit_hours < BLOCK_HOURS as f64
    }
}

/// Converts fractional hours to whole seconds, truncating toward zero.
#[inline]
pub fn hours_to_secs(hours: f64) -> i64 {
    (hours * 3600.0) as i64
}
