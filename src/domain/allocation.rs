//! Tree allocator: distributes an input amount recursively over an allocation tree.
//!
//! Children are processed by rule: all FIXED children first, then PERCENTAGE,
//! then REMAINDER children split what is left equally. Over- and
//! under-allocation are reported through the `is_error`/`is_warning` flags,
//! never as failures.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{instrument, trace};

use crate::domain::model::{AllocNode, AllocRule};

/// Amounts within this distance of zero are treated as floating point noise.
pub const EPSILON: f64 = 0.01;

/// Computed figures for a single node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResult {
    /// Amount the node received from its parent
    pub amount: f64,
    /// Fraction (0.0-1.0 scale) of the parent's amount; 0 for the root
    pub percent_of_parent: f64,
    pub is_error: bool,
    pub is_warning: bool,
    /// Part of `amount` not claimed by any child
    pub unallocated: f64,
}

/// Coarse classification of a result, for display and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Ok,
    Warning,
    Error,
}

impl CalculationResult {
    pub fn status(&self) -> NodeStatus {
        if self.is_error {
            NodeStatus::Error
        } else if self.is_warning {
            NodeStatus::Warning
        } else {
            NodeStatus::Ok
        }
    }
}

/// Results of one allocation run, keyed by node id.
pub type CalculationMap = BTreeMap<String, CalculationResult>;

/// Allocate `input_amount` to `node` and all of its descendants.
///
/// The returned map is built fresh on every call and holds an entry for
/// every node of the tree.
#[instrument(level = "debug", skip(node), fields(root = %node.id))]
pub fn calculate_tree(node: &AllocNode, input_amount: f64) -> CalculationMap {
    let mut results = CalculationMap::new();
    allocate(node, input_amount, &mut results);
    results
}

fn allocate(node: &AllocNode, input_amount: f64, results: &mut CalculationMap) {
    trace!(id = %node.id, input_amount, "allocate");

    if node.is_leaf() {
        results.insert(
            node.id.clone(),
            CalculationResult {
                amount: input_amount,
                percent_of_parent: 0.0,
                is_error: input_amount < -EPSILON,
                is_warning: false,
                unallocated: input_amount,
            },
        );
        return;
    }

    let mut remaining_amount = input_amount;

    for child in &node.children {
        if let AllocRule::Fixed { value } = child.rule {
            remaining_amount -= value;
            allocate(child, value, results);
            set_percent_of_parent(results, &child.id, ratio(value, input_amount));
        }
    }

    for child in &node.children {
        if let AllocRule::Percentage { value } = child.rule {
            let allocated = input_amount * (value / 100.0);
            remaining_amount -= allocated;
            allocate(child, allocated, results);
            set_percent_of_parent(results, &child.id, value / 100.0);
        }
    }

    let remainder_nodes: Vec<&AllocNode> = node
        .children
        .iter()
        .filter(|c| matches!(c.rule, AllocRule::Remainder))
        .collect();

    let unallocated = if remainder_nodes.is_empty() {
        remaining_amount
    } else {
        let amount_per_node = remaining_amount / remainder_nodes.len() as f64;
        for child in remainder_nodes {
            allocate(child, amount_per_node, results);
            set_percent_of_parent(results, &child.id, ratio(amount_per_node, input_amount));
        }
        0.0
    };

    let is_error = input_amount < -EPSILON || unallocated < -EPSILON;
    results.insert(
        node.id.clone(),
        CalculationResult {
            amount: input_amount,
            percent_of_parent: 0.0,
            is_error,
            is_warning: !is_error && unallocated > EPSILON,
            unallocated,
        },
    );
}

/// `part / whole`, or 0 when `whole` is zero.
fn ratio(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole
    }
}

fn set_percent_of_parent(results: &mut CalculationMap, id: &str, percent: f64) {
    if let Some(result) = results.get_mut(id) {
        result.percent_of_parent = percent;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, rule: AllocRule) -> AllocNode {
        AllocNode::with_id(id, id, rule)
    }

    #[test]
    fn given_zero_input_when_allocating_then_percentages_stay_finite() {
        let root = leaf("root", AllocRule::Remainder).with_children([
            leaf("f", AllocRule::Fixed { value: 10.0 }),
            leaf("r", AllocRule::Remainder),
        ]);

        let results = calculate_tree(&root, 0.0);

        assert_eq!(results["f"].percent_of_parent, 0.0);
        assert_eq!(results["r"].percent_of_parent, 0.0);
        assert_eq!(results["r"].amount, -10.0);
        assert!(results["r"].is_error);
        assert!(!results["root"].is_error);
    }

    #[test]
    fn given_noise_below_epsilon_when_allocating_then_no_flags() {
        let root = leaf("root", AllocRule::Remainder)
            .with_child(leaf("f", AllocRule::Fixed { value: 100.005 }));

        let results = calculate_tree(&root, 100.0);

        assert!(!results["root"].is_error);
        assert!(!results["root"].is_warning);
    }

    #[test]
    fn given_results_when_classifying_then_error_wins_over_warning() {
        let mut r = CalculationResult {
            amount: 1.0,
            percent_of_parent: 0.0,
            is_error: true,
            is_warning: true,
            unallocated: 0.0,
        };
        assert_eq!(r.status(), NodeStatus::Error);
        r.is_error = false;
        assert_eq!(r.status(), NodeStatus::Warning);
        r.is_warning = false;
        assert_eq!(r.status(), NodeStatus::Ok);
    }
}
