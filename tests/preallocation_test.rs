//! Tests for the pre-allocation reducer

use rstest::rstest;

use splittree::domain::{breakdown, compute_rest_value, PreAllocRule, PreAllocation};

fn fixed(id: &str, value: f64) -> PreAllocation {
    PreAllocation::new(id, id, PreAllocRule::Fixed { value })
}

fn percent(id: &str, value: f64) -> PreAllocation {
    PreAllocation::new(id, id, PreAllocRule::Percentage { value })
}

#[test]
fn given_fixed_and_percentage_when_reducing_then_subtracts_both() {
    let rest = compute_rest_value(1000.0, &[fixed("fee", 200.0), percent("tax", 10.0)]);
    assert_eq!(rest, 700.0);
}

#[rstest]
#[case(vec![fixed("a", 200.0), percent("b", 10.0)])]
#[case(vec![percent("b", 10.0), fixed("a", 200.0)])]
fn given_any_order_when_reducing_then_percentage_uses_gross_value(#[case] items: Vec<PreAllocation>) {
    assert_eq!(compute_rest_value(1000.0, &items), 700.0);
}

#[test]
fn given_deductions_above_value_when_reducing_then_result_is_negative() {
    let rest = compute_rest_value(100.0, &[fixed("a", 80.0), percent("b", 50.0)]);
    assert_eq!(rest, -30.0);
}

#[test]
fn given_negative_phase_value_when_reducing_then_percentage_follows_sign() {
    let rest = compute_rest_value(-200.0, &[percent("b", 50.0)]);
    assert_eq!(rest, -100.0);
}

#[test]
fn given_phase_when_breaking_down_then_lists_amounts_and_shares() {
    let items = [fixed("fee", 200.0), percent("tax", 10.0)];

    let result = breakdown(1000.0, &items);

    assert_eq!(result.phase_value, 1000.0);
    assert_eq!(result.lines.len(), 2);
    assert_eq!(result.lines[0].id, "fee");
    assert_eq!(result.lines[0].amount, 200.0);
    assert_eq!(result.lines[0].share, 0.2);
    assert_eq!(result.lines[1].amount, 100.0);
    assert_eq!(result.lines[1].share, 0.1);
    assert_eq!(result.rest_value, compute_rest_value(1000.0, &items));
}
