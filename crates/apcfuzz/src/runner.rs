//! Run loops
//!
//! One synchronous step per case: generate, evaluate with the oracle,
//! invoke the subject, judge, record. Per-case failures become verdicts and
//! the run moves on; a generator bug ends the run with an error.

use crate::compare::{self, CaseReport, Mode, RunStatistics};
use crate::config::{GeneratorConfig, HarnessConfig};
use crate::driver::{Driver, Subject};
use crate::error::{Error, Result};
use crate::generate::{self, ArithmeticCase, ArithmeticCases, BaseMatrix, NumeralCase, NumeralCases};
use crate::limbs;
use crate::oracle;

/// What a finished run hands back.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub mode: Mode,
    pub seed: u64,
    pub statistics: RunStatistics,
    /// Every non-passing case, in run order.
    pub failures: Vec<CaseReport>,
    /// Cases dropped because checking them raised a non-fatal error.
    pub skipped: usize,
}

impl RunOutcome {
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty() && self.skipped == 0
    }
}

/// Drives one subject through generated cases.
pub struct Harness<S> {
    driver: Driver<S>,
    generator: GeneratorConfig,
}

impl<S: Subject> Harness<S> {
    /// Validate the config and the limb table, then wrap `subject`.
    pub fn new(subject: S, config: &HarnessConfig) -> Result<Self> {
        config.validate()?;
        let table = limbs::verified_table()?;
        tracing::debug!(bases = table.len(), "limb table verified");
        Ok(Self {
            driver: Driver::new(subject, config.result_line_from_end)?,
            generator: config.generator.clone(),
        })
    }

    pub fn driver(&self) -> &Driver<S> {
        &self.driver
    }

    /// Random expression trees.
    pub fn run_arithmetic(
        &self,
        seed: u64,
        iterations: usize,
        on_case: impl FnMut(&CaseReport),
    ) -> Result<RunOutcome> {
        let cases = ArithmeticCases::new(&self.generator, seed, iterations)?;
        self.run(
            Mode::Arithmetic,
            seed,
            cases,
            |case| self.check_arithmetic(case, seed),
            on_case,
        )
    }

    /// Random numerals between random base pairs.
    pub fn run_numerals(
        &self,
        seed: u64,
        iterations: usize,
        on_case: impl FnMut(&CaseReport),
    ) -> Result<RunOutcome> {
        let cases = NumeralCases::new(&self.generator, seed, iterations)?;
        self.run(
            Mode::Numerals,
            seed,
            cases,
            |case| self.check_numeral(Mode::Numerals, case, seed),
            on_case,
        )
    }

    /// Every ordered pair of distinct bases, `per_cell` numerals each.
    pub fn run_matrix(
        &self,
        seed: u64,
        per_cell: usize,
        on_case: impl FnMut(&CaseReport),
    ) -> Result<RunOutcome> {
        let cases = BaseMatrix::new(&self.generator, seed, per_cell)?;
        tracing::info!(cells = cases.cells(), per_cell, "matrix sweep");
        self.run(
            Mode::Matrix,
            seed,
            cases,
            |case| self.check_numeral(Mode::Matrix, case, seed),
            on_case,
        )
    }

    /// Fatal errors from `check` end the run. Anything else costs only the
    /// case it came from.
    fn run<C>(
        &self,
        mode: Mode,
        seed: u64,
        cases: impl Iterator<Item = C>,
        mut check: impl FnMut(&C) -> Result<CaseReport>,
        mut on_case: impl FnMut(&CaseReport),
    ) -> Result<RunOutcome> {
        tracing::info!(%mode, seed, subject = %self.driver.subject().name(), "run started");
        let mut statistics = RunStatistics::new();
        let mut failures = Vec::new();
        let mut skipped = 0;

        for case in cases {
            let report = match check(&case) {
                Ok(report) => report,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(error = %e, "case skipped");
                    skipped += 1;
                    continue;
                }
            };
            statistics.record(&report);
            on_case(&report);
            if !report.verdict.is_pass() {
                failures.push(report);
            }
        }

        tracing::info!(
            %mode,
            passed = statistics.overall.passed,
            total = statistics.overall.total,
            skipped,
            "run finished"
        );
        Ok(RunOutcome {
            mode,
            seed,
            statistics,
            failures,
            skipped,
        })
    }

    /// Judge one arithmetic case.
    pub fn check_arithmetic(&self, case: &ArithmeticCase, seed: u64) -> Result<CaseReport> {
        generate::check_well_formed(&case.expr)?;
        let expected = oracle::evaluate(&case.expr)
            .map(|v| oracle::decimal(&v))
            .map_err(|e| Error::Generation(format!("oracle rejected {}: {e}", case.canonical)))?;

        let reply = self.driver.evaluate(&case.subject);
        let (actual, verdict) = compare::judge_arithmetic(&expected, reply);

        let mut operations: Vec<&'static str> =
            case.expr.binary_ops().into_iter().map(|op| op.name()).collect();
        if case.expr.has_unary() {
            operations.push("unary");
        }

        let report = CaseReport {
            mode: Mode::Arithmetic,
            index: case.index,
            seed,
            subject_input: case.subject.clone(),
            canonical_input: case.canonical.clone(),
            expected,
            actual,
            verdict,
            operations,
            base_pair: None,
        };
        log_case(&report);
        Ok(report)
    }

    /// Judge one base-conversion case.
    pub fn check_numeral(&self, mode: Mode, case: &NumeralCase, seed: u64) -> Result<CaseReport> {
        let expected = oracle::convert(&case.digits, case.source_base, case.target_base)
            .map_err(|e| Error::Generation(format!("bad numeral {}: {e}", case.digits)))?;

        let request = case.request();
        let reply = self.driver.evaluate(&request);
        let (actual, verdict) = compare::judge_conversion(&expected, reply);

        let report = CaseReport {
            mode,
            index: case.index,
            seed,
            subject_input: request,
            canonical_input: format!(
                "{}_{} # {}",
                case.digits, case.source_base, case.target_base
            ),
            expected,
            actual,
            verdict,
            operations: Vec::new(),
            base_pair: Some((case.source_base, case.target_base)),
        };
        log_case(&report);
        Ok(report)
    }
}

fn log_case(report: &CaseReport) {
    match report.verdict.tag() {
        None => tracing::debug!(
            index = report.index,
            input = %report.subject_input,
            expected = %report.expected,
            "pass"
        ),
        Some(tag) => tracing::warn!(
            index = report.index,
            input = %report.subject_input,
            expected = %report.expected,
            actual = ?report.actual,
            %tag,
            "case failed"
        ),
    }
}
