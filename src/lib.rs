//! splittree: hierarchical allocation engine
//!
//! A phase's gross value is reduced by its pre-allocations and the rest is
//! distributed down a tree of recipients, each node claiming a fixed amount,
//! a percentage, or an equal share of the remainder. Leaf amounts are then
//! aggregated by recipient name across projects and phases.
//!
//! The engine lives in [`domain`] and is pure; the other layers load project
//! files and present results.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{
    aggregate_stats, calculate_tree, compute_rest_value, AllocNode, AllocRule, CalculationMap,
    CalculationResult, PersonStat, PhaseData, PreAllocRule, PreAllocation, ProjectData,
};
