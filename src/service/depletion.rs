//! Pure depletion projection for monitored resources.
//!
//! No I/O: given a cached quantity and a fixed hourly consumption rate, this
//! module computes the remaining time until empty and an absolute exhaustion
//! timestamp. Consumption rates are domain constants carried in
//! configuration, not computed.

use chrono::{DateTime, Duration, Utc};

use crate::model::structure::ResourceKind;

/// Fixed hourly consumption rates per resource kind.
///
/// Defaults match current Metenox mechanics; see [`crate::config::Config`]
/// for the environment overrides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsumptionRates {
    pub magmatic_gas_per_hour: f64,
    pub fuel_blocks_per_hour: f64,
}

impl Default for ConsumptionRates {
    fn default() -> Self {
        Self {
            magmatic_gas_per_hour: 150.0,
            fuel_blocks_per_hour: 5.0,
        }
    }
}

impl ConsumptionRates {
    pub fn rate_for(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::MagmaticGas => self.magmatic_gas_per_hour,
            ResourceKind::FuelBlocks => self.fuel_blocks_per_hour,
        }
    }
}

/// Projected time-to-empty for one resource in one structure.
///
/// Derived on every evaluation, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum DepletionEstimate {
    /// Quantity or rate was non-positive; remaining time cannot be projected.
    Unknown,
    Depletes {
        hours_remaining: f64,
        /// Whole days component of the remaining time.
        days: i64,
        /// Whole hours component after subtracting `days`.
        hours: i64,
        empty_at: DateTime<Utc>,
    },
}

impl DepletionEstimate {
    pub fn hours_remaining(&self) -> Option<f64> {
        match self {
            DepletionEstimate::Unknown => None,
            DepletionEstimate::Depletes {
                hours_remaining, ..
            } => Some(*hours_remaining),
        }
    }
}

/// Projects when a resource runs out under linear consumption.
///
/// # Arguments
/// - `quantity` - Cached fuel-bay quantity
/// - `rate_per_hour` - Fixed hourly consumption rate for the resource kind
/// - `now` - Evaluation timestamp, used for the absolute exhaustion time
///
/// # Returns
/// [`DepletionEstimate::Unknown`] when `quantity <= 0` or
/// `rate_per_hour <= 0`; never a negative or divide-by-zero result.
pub fn estimate(quantity: i64, rate_per_hour: f64, now: DateTime<Utc>) -> DepletionEstimate {
    if quantity <= 0 || rate_per_hour <= 0.0 {
        return DepletionEstimate::Unknown;
    }

    let hours_remaining = quantity as f64 / rate_per_hour;
    let days = (hours_remaining / 24.0).floor() as i64;
    let hours = (hours_remaining - (days as f64) * 24.0).floor() as i64;
    // Extreme quantities overflow chrono's range; saturate to the far
    // future instead of panicking inside a scheduler task
    let empty_at = Duration::try_seconds((hours_remaining * 3600.0) as i64)
        .and_then(|remaining| now.checked_add_signed(remaining))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);

    DepletionEstimate::Depletes {
        hours_remaining,
        days,
        hours,
        empty_at,
    }
}
