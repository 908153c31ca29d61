//! Structural checks over allocation trees and phases.

use std::collections::HashSet;

use tracing::debug;

use crate::domain::allocation::{CalculationMap, CalculationResult, NodeStatus};
use crate::domain::arena::AllocArena;
use crate::domain::error::DomainError;
use crate::domain::model::{AllocNode, PhaseData};

/// Report duplicate ids and non-finite rule values of a tree.
pub fn validate_tree(root: &AllocNode) -> Vec<DomainError> {
    let tree = AllocArena::from_root(root);
    let mut issues: Vec<DomainError> = tree
        .duplicate_ids()
        .iter()
        .map(|id| DomainError::DuplicateNodeId(id.to_string()))
        .collect();

    for (_, node) in tree.iter() {
        if let Some(value) = node.rule().value() {
            if !value.is_finite() {
                issues.push(DomainError::NonFiniteRuleValue {
                    id: node.id().to_string(),
                    value,
                });
            }
        }
    }
    debug!("validate_tree: {} issues", issues.len());
    issues
}

/// Validate a whole phase: gross value, deductions and tree.
pub fn validate_phase(phase: &PhaseData) -> Vec<DomainError> {
    let mut issues = Vec::new();
    if !phase.phase_value.is_finite() {
        issues.push(DomainError::NonFinitePhaseValue {
            phase: phase.id.clone(),
            value: phase.phase_value,
        });
    }

    let mut seen = HashSet::new();
    for pa in &phase.pre_allocations {
        if !seen.insert(pa.id.as_str()) {
            issues.push(DomainError::DuplicatePreAllocationId(pa.id.clone()));
        }
        let value = pa.rule.value();
        if !value.is_finite() {
            issues.push(DomainError::NonFinitePreAllocation {
                id: pa.id.clone(),
                value,
            });
        }
    }

    issues.extend(validate_tree(&phase.root_node));
    issues
}

/// A node whose result is flagged as error or warning.
#[derive(Debug, Clone, PartialEq)]
pub struct FlaggedNode {
    pub id: String,
    pub name: String,
    pub path: Vec<String>,
    pub result: CalculationResult,
}

/// Every error or warning node of `root`, in preorder.
pub fn flagged_nodes(root: &AllocNode, results: &CalculationMap) -> Vec<FlaggedNode> {
    let tree = AllocArena::from_root(root);
    tree.iter()
        .filter_map(|(idx, node)| {
            let result = results.get(node.id())?;
            (result.status() != NodeStatus::Ok).then(|| FlaggedNode {
                id: node.id().to_string(),
                name: node.name().to_string(),
                path: tree.path_of(idx),
                result: *result,
            })
        })
        .collect()
}
