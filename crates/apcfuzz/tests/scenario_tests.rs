//! End-to-end scenarios against an in-process subject
//!
//! Each scenario goes through the same path a real run takes: oracle for
//! the expected value, driver for the subject's reply, comparator for the
//! verdict.

mod common;

use apcfuzz::compare::{self, FailureTag, Verdict};
use apcfuzz::generate::NumeralCase;
use apcfuzz::{Driver, GeneratorConfig, Harness, HarnessConfig, Mode, oracle, parser};
use common::{MissingSubject, StubSubject};

fn driver() -> Driver<StubSubject> {
    Driver::new(StubSubject::new(), 0).unwrap()
}

/// Oracle value of `input` and the verdict on the stub's answer.
fn arithmetic(input: &str) -> (String, Verdict) {
    let expected = oracle::decimal(&oracle::evaluate(&parser::parse_expr(input).unwrap()).unwrap());
    let (_, verdict) = compare::judge_arithmetic(&expected, driver().evaluate(input));
    (expected, verdict)
}

#[test]
fn addition() {
    assert_eq!(arithmetic("3 + 4"), ("7".to_string(), Verdict::Pass));
    assert_eq!(driver().evaluate("3 + 4").unwrap(), "7");
}

#[test]
fn negated_operands() {
    assert_eq!(arithmetic("-(5) - (-2)"), ("-3".to_string(), Verdict::Pass));
}

#[test]
fn suffixed_numeral_to_decimal() {
    let expected = oracle::convert("ff", 16, 10).unwrap();
    assert_eq!(expected, "255");
    let (actual, verdict) = compare::judge_conversion(&expected, driver().evaluate("ff_16 # 10"));
    assert_eq!(actual.as_deref(), Some("255"));
    assert_eq!(verdict, Verdict::Pass);
}

#[test]
fn matrix_cell_binary_to_hex() {
    let case = NumeralCase {
        index: 0,
        digits: "1010".to_string(),
        source_base: 2,
        target_base: 16,
        suffixed: true,
    };
    let harness = Harness::new(StubSubject::new(), &HarnessConfig::default()).unwrap();
    let report = harness.check_numeral(Mode::Matrix, &case, 0).unwrap();
    assert_eq!(report.expected, "a");
    // the stub answers "A_16"
    assert_eq!(report.actual.as_deref(), Some("A"));
    assert_eq!(report.verdict, Verdict::Pass);
    assert_eq!(report.base_pair, Some((2, 16)));
}

#[test]
fn truncating_division() {
    assert_eq!(arithmetic("17 / 5"), ("3".to_string(), Verdict::Pass));
    assert_eq!(arithmetic("17 % 5"), ("2".to_string(), Verdict::Pass));
    assert_eq!(arithmetic("-17 / 5"), ("-3".to_string(), Verdict::Pass));
    assert_eq!(arithmetic("-17 % 5"), ("-2".to_string(), Verdict::Pass));
}

#[test]
fn juxtaposed_product() {
    assert_eq!(arithmetic("(3)(4)"), ("12".to_string(), Verdict::Pass));
    assert_eq!(arithmetic("3 * 4").0, arithmetic("(3)(4)").0);
}

#[test]
fn stub_subject_passes_every_mode() {
    let config = HarnessConfig::default()
        .generator(GeneratorConfig::default().based_literal_probability(0.3));
    let harness = Harness::new(StubSubject::new(), &config).unwrap();

    let arith = harness.run_arithmetic(2024, 300, |_| {}).unwrap();
    assert!(arith.all_passed(), "{:?}", arith.failures.first());
    assert_eq!(arith.statistics.overall.total, 300);

    let numerals = harness.run_numerals(2024, 300, |_| {}).unwrap();
    assert!(numerals.all_passed(), "{:?}", numerals.failures.first());

    let matrix = harness.run_matrix(2024, 2, |_| {}).unwrap();
    assert!(matrix.all_passed(), "{:?}", matrix.failures.first());
    assert_eq!(matrix.statistics.perfect_cell_count(), 35 * 34);
}

#[test]
fn flooring_subject_fails_only_on_division() {
    let harness = Harness::new(StubSubject::flooring(), &HarnessConfig::default()).unwrap();
    let outcome = harness.run_arithmetic(7, 400, |_| {}).unwrap();

    assert!(!outcome.all_passed());
    for failure in &outcome.failures {
        assert_eq!(failure.verdict, Verdict::Mismatch);
        assert!(
            failure.operations.contains(&"div") || failure.operations.contains(&"mod"),
            "{}",
            failure.canonical_input
        );
    }
    let stats = &outcome.statistics;
    assert!(stats.failures[&FailureTag::Mismatch] > 0);
}

#[test]
fn missing_subject_is_not_a_mismatch() {
    let harness = Harness::new(MissingSubject, &HarnessConfig::default()).unwrap();
    let outcome = harness.run_numerals(1, 20, |_| {}).unwrap();
    assert_eq!(outcome.statistics.overall.passed, 0);
    assert_eq!(outcome.statistics.failures.get(&FailureTag::Mismatch), None);
    assert_eq!(outcome.statistics.failures[&FailureTag::InvocationError], 20);
}

#[test]
fn failures_carry_repro_details() {
    let harness = Harness::new(StubSubject::flooring(), &HarnessConfig::default()).unwrap();
    let mut live = Vec::new();
    let outcome = harness
        .run_arithmetic(11, 200, |case| {
            if !case.verdict.is_pass() {
                live.push(apcfuzz::report::render_failure(case));
            }
        })
        .unwrap();
    assert_eq!(live.len(), outcome.failures.len());
    for (block, failure) in live.iter().zip(&outcome.failures) {
        assert!(block.contains(&failure.subject_input));
        assert!(block.contains(&failure.expected));
        assert!(block.contains("(seed 11)"));
    }
}
