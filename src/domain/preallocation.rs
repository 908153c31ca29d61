//! Pre-allocation reducer: turns a phase's gross value into the rest value fed into the tree.

use serde::Serialize;
use tracing::instrument;

use crate::domain::model::{PreAllocRule, PreAllocation};

/// Apply deductions in order.
///
/// Percentages are always taken of the gross `phase_value`, not of the
/// running total. A negative result is returned as is.
#[instrument(level = "debug", skip(pre_allocations), fields(count = pre_allocations.len()))]
pub fn compute_rest_value(phase_value: f64, pre_allocations: &[PreAllocation]) -> f64 {
    pre_allocations
        .iter()
        .fold(phase_value, |running, pa| running - deduction(phase_value, &pa.rule))
}

fn deduction(phase_value: f64, rule: &PreAllocRule) -> f64 {
    match *rule {
        PreAllocRule::Fixed { value } => value,
        PreAllocRule::Percentage { value } => value / 100.0 * phase_value,
    }
}

/// One resolved deduction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreAllocationLine {
    pub id: String,
    pub name: String,
    /// Absolute amount deducted
    pub amount: f64,
    /// Fraction of the gross phase value; 0 when the phase value is 0
    pub share: f64,
}

/// Deductions of a phase together with the resulting rest value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreAllocationBreakdown {
    pub phase_value: f64,
    pub lines: Vec<PreAllocationLine>,
    pub rest_value: f64,
}

/// Resolve a single deduction against the gross phase value: `(amount, share)`.
pub fn resolve(pre_allocation: &PreAllocation, phase_value: f64) -> (f64, f64) {
    match pre_allocation.rule {
        PreAllocRule::Fixed { value } => {
            let share = if phase_value == 0.0 { 0.0 } else { value / phase_value };
            (value, share)
        }
        PreAllocRule::Percentage { value } => (phase_value * value / 100.0, value / 100.0),
    }
}

pub fn breakdown(phase_value: f64, pre_allocations: &[PreAllocation]) -> PreAllocationBreakdown {
    let lines = pre_allocations
        .iter()
        .map(|pa| {
            let (amount, share) = resolve(pa, phase_value);
            PreAllocationLine {
                id: pa.id.clone(),
                name: pa.name.clone(),
                amount,
                share,
            }
        })
        .collect();

    PreAllocationBreakdown {
        phase_value,
        lines,
        rest_value: compute_rest_value(phase_value, pre_allocations),
    }
}
