//! Domain layer: entities and the allocation engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod allocation;
pub mod arena;
pub mod error;
pub mod model;
pub mod preallocation;
pub mod stats;
pub mod validate;

pub use allocation::{calculate_tree, CalculationMap, CalculationResult, NodeStatus, EPSILON};
pub use arena::{AllocArena, ArenaNode, LeafPath};
pub use error::DomainError;
pub use model::*;
pub use preallocation::{
    breakdown, compute_rest_value, PreAllocationBreakdown, PreAllocationLine,
};
pub use stats::{aggregate_stats, PersonStat, SourceData};
pub use validate::{flagged_nodes, validate_phase, validate_tree, FlaggedNode};

/// Expand `~`, `$VAR` and `${VAR}` in a path string.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
