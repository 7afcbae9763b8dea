//! Differential analysis: re-run the engine on modified step sets and
//! compare against a baseline.

pub mod scenario;
pub mod sensitivity;
pub mod what_if;

use crate::error::LcaError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use scenario::{apply_changes, StepChange, SweepDef};
pub use sensitivity::{SensitivityParameter, SensitivityReport, Variation};
pub use what_if::WhatIfReport;

/// Relative change in percent. Zero when the baseline is zero.
///
/// Divides by the baseline's magnitude, so a decrease is negative even for
/// negative (credit) baselines. Out-of-range results saturate.
pub fn relative_change(baseline: Decimal, scenario: Decimal) -> Decimal {
    if baseline.is_zero() {
        return Decimal::ZERO;
    }
    scenario
        .checked_sub(baseline)
        .and_then(|delta| delta.checked_div(baseline.abs()))
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if scenario < baseline {
            Decimal::MIN
        } else {
            Decimal::MAX
        })
}

/// Baseline versus scenario value of one indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    pub absolute_change: Decimal,
    /// Percent of the baseline.
    pub relative_change: Decimal,
    pub baseline: Decimal,
    pub scenario: Decimal,
}

impl Change {
    /// Fails when the absolute difference is out of range.
    pub fn between(baseline: Decimal, scenario: Decimal) -> Result<Self, LcaError> {
        let absolute_change = scenario.checked_sub(baseline).ok_or_else(|| {
            LcaError::Overflow(format!("change from {} to {}", baseline, scenario))
        })?;
        Ok(Self {
            absolute_change,
            relative_change: relative_change(baseline, scenario),
            baseline,
            scenario,
        })
    }
}
