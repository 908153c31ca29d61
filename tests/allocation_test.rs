//! Tests for the tree allocator

use rstest::rstest;

use splittree::domain::{calculate_tree, AllocNode, CalculationMap, EPSILON};
use splittree::util::testing::{fixed, init_test_setup, percent, rest};

/// Every inner node: children amounts + unallocated == own amount.
fn assert_conservation(node: &AllocNode, results: &CalculationMap) {
    if node.is_leaf() {
        return;
    }
    let own = &results[&node.id];
    let children: f64 = node.children.iter().map(|c| results[&c.id].amount).sum();
    assert!(
        (children + own.unallocated - own.amount).abs() < EPSILON,
        "conservation violated at {}: {} + {} != {}",
        node.id,
        children,
        own.unallocated,
        own.amount
    );
    for child in &node.children {
        assert_conservation(child, results);
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

fn sample_tree() -> AllocNode {
    rest("root").with_children([
        fixed("ops", 1200.0).with_children([percent("ops-a", 25.0), rest("ops-b"), rest("ops-c")]),
        percent("dev", 40.0).with_children([
            fixed("dev-lead", 900.0),
            percent("dev-tools", 5.0),
            rest("dev-team").with_children([rest("x"), rest("y"), rest("z")]),
        ]),
        rest("bonus").with_children([fixed("b1", 10.0), percent("b2", 50.0)]),
        rest("reserve"),
    ])
}

#[test]
fn given_childless_root_when_allocating_then_keeps_everything_without_warning() {
    init_test_setup();
    let root = rest("root");

    let results = calculate_tree(&root, 1000.0);

    let r = &results["root"];
    assert_eq!(results.len(), 1);
    assert_eq!(r.amount, 1000.0);
    assert_eq!(r.unallocated, 1000.0);
    assert_eq!(r.percent_of_parent, 0.0);
    assert!(!r.is_error);
    assert!(!r.is_warning);
}

#[test]
fn given_fixed_and_remainder_when_allocating_then_remainder_takes_rest() {
    let root = rest("root").with_children([fixed("f", 300.0), rest("r")]);

    let results = calculate_tree(&root, 1000.0);

    assert_eq!(results["f"].amount, 300.0);
    assert_eq!(results["f"].percent_of_parent, 0.3);
    assert_eq!(results["r"].amount, 700.0);
    assert_eq!(results["r"].percent_of_parent, 0.7);
    assert_eq!(results["root"].unallocated, 0.0);
    assert!(!results["root"].is_warning);
}

#[test]
fn given_single_percentage_when_allocating_then_root_warns_about_leftover() {
    let root = rest("root").with_child(percent("p", 50.0));

    let results = calculate_tree(&root, 1000.0);

    assert_eq!(results["p"].amount, 500.0);
    assert_eq!(results["p"].percent_of_parent, 0.5);
    assert_eq!(results["root"].unallocated, 500.0);
    assert!(results["root"].is_warning);
    assert!(!results["root"].is_error);
}

#[test]
fn given_fixed_above_input_when_allocating_then_root_is_error() {
    let root = rest("root").with_child(fixed("f", 150.0));

    let results = calculate_tree(&root, 100.0);

    assert_eq!(results["f"].amount, 150.0);
    assert_eq!(results["root"].unallocated, -50.0);
    assert!(results["root"].is_error);
    assert!(!results["root"].is_warning);
}

#[rstest]
#[case(1000.0)]
#[case(0.0)]
#[case(-250.0)]
fn given_any_input_when_allocating_fixed_then_amount_is_rule_value(#[case] input: f64) {
    let root = rest("root").with_children([fixed("f", 42.5), percent("p", 20.0), rest("r")]);

    let results = calculate_tree(&root, input);

    assert_eq!(results["f"].amount, 42.5);
    assert_eq!(results["p"].percent_of_parent, 0.2);
    assert_eq!(results["root"].unallocated, 0.0);
    assert!(results["f"].percent_of_parent.is_finite());
    assert!(results["r"].percent_of_parent.is_finite());
}

#[test]
fn given_negative_input_when_allocating_then_node_is_error() {
    let root = rest("root").with_child(rest("r"));

    let results = calculate_tree(&root, -5.0);

    assert!(results["root"].is_error);
    assert!(results["r"].is_error);
    assert_eq!(results["r"].amount, -5.0);
}

#[test]
fn given_only_remainder_children_when_allocating_then_split_evenly() {
    let root = rest("root").with_children([rest("a"), rest("b"), rest("c"), rest("d")]);

    let results = calculate_tree(&root, 1000.0);

    for id in ["a", "b", "c", "d"] {
        assert_eq!(results[id].amount, 250.0);
        assert_eq!(results[id].percent_of_parent, 0.25);
    }
    assert_eq!(results["root"].unallocated, 0.0);
}

#[test]
fn given_over_allocation_with_remainder_when_allocating_then_remainder_goes_negative() {
    let root = rest("root").with_children([fixed("f", 1200.0), rest("r1"), rest("r2")]);

    let results = calculate_tree(&root, 1000.0);

    assert_eq!(results["r1"].amount, -100.0);
    assert!(results["r1"].is_error);
    assert_eq!(results["root"].unallocated, 0.0);
    assert!(!results["root"].is_error);
}

#[test]
fn given_mixed_order_children_when_allocating_then_result_is_order_independent() {
    let a = rest("root").with_children([rest("r"), percent("p", 10.0), fixed("f", 100.0)]);
    let b = rest("root").with_children([fixed("f", 100.0), percent("p", 10.0), rest("r")]);

    assert_eq!(calculate_tree(&a, 1000.0), calculate_tree(&b, 1000.0));
}

#[test]
fn given_nested_tree_when_allocating_then_conservation_holds_everywhere() {
    let root = sample_tree();

    let results = calculate_tree(&root, 10_000.0);

    assert_conservation(&root, &results);
    // root: ops 1200 + dev 4000, bonus and reserve share 4800
    assert_close(results["dev"].amount, 4000.0);
    assert_close(results["bonus"].amount, 2400.0);
    assert_close(results["reserve"].amount, 2400.0);
    // dev-team: 4000 - 900 - 200
    assert_close(results["dev-team"].amount, 2900.0);
    assert_close(results["x"].amount, 2900.0 / 3.0);
    // bonus keeps 2400 - 10 - 1200 unallocated
    assert_close(results["bonus"].unallocated, 1190.0);
    assert!(results["bonus"].is_warning);
}

#[rstest]
#[case(10_000.0)]
#[case(1.0)]
#[case(0.0)]
#[case(-3_000.0)]
fn given_any_input_when_allocating_then_flags_match_definition(#[case] input: f64) {
    let root = sample_tree();
    let results = calculate_tree(&root, input);

    assert_conservation(&root, &results);
    let mut stack = vec![&root];
    while let Some(node) = stack.pop() {
        let r = &results[&node.id];
        let expected_error = r.amount < -EPSILON || r.unallocated < -EPSILON;
        let expected_warning = !expected_error && r.unallocated > EPSILON && !node.is_leaf();
        assert_eq!(r.is_error, expected_error, "error flag of {}", node.id);
        assert_eq!(r.is_warning, expected_warning, "warning flag of {}", node.id);
        stack.extend(node.children.iter());
    }
}

#[test]
fn given_same_tree_when_allocating_twice_then_results_are_independent() {
    let root = sample_tree();

    let first = calculate_tree(&root, 500.0);
    let second = calculate_tree(&root, 10_000.0);

    assert_eq!(first["root"].amount, 500.0);
    assert_eq!(second["root"].amount, 10_000.0);
    assert_eq!(first, calculate_tree(&root, 500.0));
}
