//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Structural problems found in project data.
///
/// The allocation engine never returns these; they are produced by
/// validation and reported alongside the computed results.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("duplicate node id: {0}")]
    DuplicateNodeId(String),

    #[error("duplicate pre-allocation id: {0}")]
    DuplicatePreAllocationId(String),

    #[error("non-finite rule value on node {id}: {value}")]
    NonFiniteRuleValue { id: String, value: f64 },

    #[error("non-finite value on pre-allocation {id}: {value}")]
    NonFinitePreAllocation { id: String, value: f64 },

    #[error("non-finite phase value in phase {phase}: {value}")]
    NonFinitePhaseValue { phase: String, value: f64 },
}
