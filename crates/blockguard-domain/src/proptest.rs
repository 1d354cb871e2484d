//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - Combinator semantics against plain boolean logic
//! - Preconditions and variable bindings
//! - Findings ordering, truncation and verdicts

use crate::check::Check;
use crate::context::EvalContext;
use crate::engine::{evaluate, scan};
use crate::eval::Evaluator;
use crate::matchspec::{Action, MatchSpec};
use crate::model::Block;
use crate::test_support::{check, config, registry, resource, root_modules};
use blockguard_types::{Severity, Verdict};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ============================================================================
// Strategies
// ============================================================================

fn arb_attr_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["name", "description", "acl", "bucket", "tags", "region"])
        .prop_map(str::to_string)
}

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

/// Attribute values that never collide with variable names used below.
fn arb_value() -> impl Strategy<Value = String> {
    "[a-z0-9-]{1,16}"
}

fn block_with(attrs: &BTreeSet<String>) -> Block {
    attrs
        .iter()
        .fold(resource("aws_s3_bucket", "b"), |b, name| {
            b.with_attribute(name.as_str(), "set")
        })
}

fn eval_on(spec: &MatchSpec, block: &Block) -> bool {
    let modules = root_modules(vec![block.clone()]);
    Evaluator::new(&modules).evaluate(spec, block, &mut EvalContext::new())
}

fn presence_leaves(names: &[String]) -> Vec<MatchSpec> {
    names
        .iter()
        .map(|n| MatchSpec::leaf(Action::IsPresent, n.as_str()))
        .collect()
}

// ============================================================================
// Property tests: combinators
// ============================================================================

proptest! {
    #[test]
    fn and_is_conjunction(
        present in prop::collection::btree_set(arb_attr_name(), 0..6),
        tested in prop::collection::vec(arb_attr_name(), 0..6),
    ) {
        let block = block_with(&present);
        let expected = tested.iter().all(|n| present.contains(n));
        prop_assert_eq!(eval_on(&MatchSpec::and(presence_leaves(&tested)), &block), expected);
    }

    #[test]
    fn or_is_disjunction(
        present in prop::collection::btree_set(arb_attr_name(), 0..6),
        tested in prop::collection::vec(arb_attr_name(), 0..6),
    ) {
        let block = block_with(&present);
        let expected = tested.iter().any(|n| present.contains(n));
        prop_assert_eq!(eval_on(&MatchSpec::or(presence_leaves(&tested)), &block), expected);
    }

    #[test]
    fn not_negates(
        present in prop::collection::btree_set(arb_attr_name(), 0..6),
        tested in prop::collection::vec(arb_attr_name(), 1..6),
    ) {
        let block = block_with(&present);
        let inner = MatchSpec::or(presence_leaves(&tested));
        let direct = eval_on(&inner, &block);
        prop_assert_eq!(eval_on(&MatchSpec::not(inner), &block), !direct);
    }

    #[test]
    fn is_present_and_not_present_are_complementary(
        present in prop::collection::btree_set(arb_attr_name(), 0..6),
        name in arb_attr_name(),
    ) {
        let block = block_with(&present);
        let is = eval_on(&MatchSpec::leaf(Action::IsPresent, name.as_str()), &block);
        let not = eval_on(&MatchSpec::leaf(Action::NotPresent, name.as_str()), &block);
        prop_assert_ne!(is, not);
    }
}

// ============================================================================
// Property tests: preconditions and variables
// ============================================================================

proptest! {
    #[test]
    fn failing_precondition_always_passes(
        present in prop::collection::btree_set(arb_attr_name(), 0..6),
        tested in prop::collection::vec(arb_attr_name(), 0..6),
    ) {
        let block = block_with(&present);
        let spec = MatchSpec::and(presence_leaves(&tested))
            .with_pre_conditions(vec![MatchSpec::leaf(Action::IsPresent, "never_set")]);
        prop_assert!(eval_on(&spec, &block));
    }

    #[test]
    fn bound_variable_substitutes_into_comparison(bucket in arb_value(), target in arb_value()) {
        let block = resource("aws_s3_bucket", "b")
            .with_attribute("bucket", bucket.as_str())
            .with_attribute("target", target.as_str());
        let spec = MatchSpec::and(vec![
            MatchSpec::leaf(Action::IsPresent, "bucket").assign_to("VAR_BUCKET"),
            MatchSpec::compare(Action::Equals, "target", "VAR_BUCKET"),
        ]);
        prop_assert_eq!(eval_on(&spec, &block), bucket == target);
    }

    #[test]
    fn unbound_variable_name_is_compared_literally(target in arb_value()) {
        let block = resource("aws_s3_bucket", "b").with_attribute("target", target.as_str());
        let spec = MatchSpec::compare(Action::Equals, "target", "VAR_UNBOUND");
        prop_assert!(!eval_on(&spec, &block));
    }
}

// ============================================================================
// Property tests: findings ordering and truncation
// ============================================================================

fn failing_check(code: &str, severity: Severity) -> Check {
    let mut c = check(code, "aws_vpc", MatchSpec::leaf(Action::IsPresent, "never_set"));
    c.severity = severity;
    c
}

proptest! {
    #[test]
    fn findings_sorted_by_descending_severity(
        severities in prop::collection::vec(arb_severity(), 1..8),
        vpcs in 1usize..5,
    ) {
        let checks = severities
            .iter()
            .enumerate()
            .map(|(i, s)| failing_check(&format!("CUS{i:03}"), *s))
            .collect();
        let blocks = (0..vpcs).map(|i| resource("aws_vpc", &format!("v{i}"))).collect();
        let findings = scan(&root_modules(blocks), &registry(checks));

        prop_assert_eq!(findings.len(), severities.len() * vpcs);
        for pair in findings.windows(2) {
            prop_assert!(pair[0].severity >= pair[1].severity);
            if pair[0].severity == pair[1].severity {
                prop_assert!(pair[0].code <= pair[1].code);
            }
        }
    }

    #[test]
    fn scan_is_deterministic(
        severities in prop::collection::vec(arb_severity(), 1..8),
        vpcs in 1usize..5,
    ) {
        let build = || {
            let checks = severities
                .iter()
                .enumerate()
                .map(|(i, s)| failing_check(&format!("CUS{i:03}"), *s))
                .collect();
            let blocks = (0..vpcs).map(|i| resource("aws_vpc", &format!("v{i}"))).collect();
            scan(&root_modules(blocks), &registry(checks))
        };
        prop_assert_eq!(build(), build());
    }

    #[test]
    fn truncation_respects_max_findings(vpcs in 0usize..12, max in 0usize..8) {
        let blocks = (0..vpcs).map(|i| resource("aws_vpc", &format!("v{i}"))).collect();
        let mut cfg = config();
        cfg.max_findings = max;
        let report = evaluate(
            &root_modules(blocks),
            &registry(vec![failing_check("CUS001", Severity::Medium)]),
            &cfg,
        );

        prop_assert_eq!(report.data.findings_total as usize, vpcs);
        prop_assert_eq!(report.findings.len(), vpcs.min(max));
        prop_assert_eq!(report.data.truncated_reason.is_some(), vpcs > max);
        prop_assert_eq!(report.data.counts.medium as usize, vpcs);

        let expected = match vpcs {
            0 => Verdict::Pass,
            _ if Severity::Medium >= cfg.fail_on => Verdict::Fail,
            _ => Verdict::Warn,
        };
        prop_assert_eq!(report.verdict, expected);
    }

    #[test]
    fn verdict_follows_fail_threshold(severity in arb_severity(), fail_on in arb_severity()) {
        let mut cfg = config();
        cfg.fail_on = fail_on;
        let report = evaluate(
            &root_modules(vec![resource("aws_vpc", "main")]),
            &registry(vec![failing_check("CUS001", severity)]),
            &cfg,
        );
        let expected = if severity >= fail_on { Verdict::Fail } else { Verdict::Warn };
        prop_assert_eq!(report.verdict, expected);
    }
}
