//! Verdicts and run statistics
//!
//! Every case ends in exactly one [`Verdict`]. Only `Pass` counts as
//! passed; the other three are failures with distinct tags so a broken
//! subject binary is not mistaken for a wrong answer.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::driver::conversion_digits;
use crate::error::{Error, Result};
use crate::oracle;

/// Which case source produced a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Arithmetic,
    Numerals,
    Matrix,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Arithmetic => "arithmetic",
            Mode::Numerals => "numerals",
            Mode::Matrix => "matrix",
        };
        f.write_str(name)
    }
}

/// Outcome of one case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    /// The subject answered with a different value.
    Mismatch,
    /// The subject could not be run or printed nothing.
    InvocationFailed { message: String },
    /// The subject's output had no readable answer.
    MalformedReply { message: String, raw: String },
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    pub fn tag(&self) -> Option<FailureTag> {
        match self {
            Verdict::Pass => None,
            Verdict::Mismatch => Some(FailureTag::Mismatch),
            Verdict::InvocationFailed { .. } => Some(FailureTag::InvocationError),
            Verdict::MalformedReply { .. } => Some(FailureTag::MalformedReply),
        }
    }

    /// Map a per-case driver error to its verdict.
    pub fn from_error(error: Error) -> Self {
        match error {
            Error::ResultParse { message, raw } => Verdict::MalformedReply { message, raw },
            Error::Invocation(message) => Verdict::InvocationFailed { message },
            // The subject ran but reported something other than a reply
            other => Verdict::MalformedReply {
                message: format!("unexpected subject error: {other}"),
                raw: String::new(),
            },
        }
    }
}

/// Failure categories counted in the summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureTag {
    Mismatch,
    InvocationError,
    MalformedReply,
}

impl fmt::Display for FailureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureTag::Mismatch => "mismatch",
            FailureTag::InvocationError => "invocation error",
            FailureTag::MalformedReply => "malformed reply",
        };
        f.write_str(name)
    }
}

/// Trim trailing whitespace and newlines.
pub fn normalize(text: &str) -> &str {
    text.trim_end()
}

/// Judge an arithmetic reply against the oracle's decimal answer.
///
/// A reply with a `_<base>` suffix is re-read and compared in decimal; a
/// plain reply is compared as text. Returns the comparable reply (if any)
/// along with the verdict.
pub fn judge_arithmetic(
    expected: &str,
    reply: Result<String>,
) -> (Option<String>, Verdict) {
    let reply = match reply {
        Ok(reply) => normalize(&reply).to_string(),
        Err(e) => return (None, Verdict::from_error(e)),
    };
    let actual = if reply.contains('_') {
        match oracle::parse_suffixed(&reply) {
            Ok(value) => oracle::decimal(&value),
            Err(e) => {
                return (
                    Some(reply.clone()),
                    Verdict::MalformedReply {
                        message: e.to_string(),
                        raw: reply,
                    },
                );
            }
        }
    } else {
        reply
    };
    let verdict = if actual == normalize(expected) {
        Verdict::Pass
    } else {
        Verdict::Mismatch
    };
    (Some(actual), verdict)
}

/// Judge a base-conversion reply. Only the digits before the first `_`
/// count, and letter case is ignored.
pub fn judge_conversion(
    expected: &str,
    reply: Result<String>,
) -> (Option<String>, Verdict) {
    let reply = match reply {
        Ok(reply) => reply,
        Err(e) => return (None, Verdict::from_error(e)),
    };
    let actual = conversion_digits(normalize(&reply)).to_string();
    let verdict = if actual.eq_ignore_ascii_case(normalize(expected)) {
        Verdict::Pass
    } else {
        Verdict::Mismatch
    };
    (Some(actual), verdict)
}

/// Everything needed to reproduce and classify one case.
#[derive(Debug, Clone, Serialize)]
pub struct CaseReport {
    pub mode: Mode,
    pub index: usize,
    pub seed: u64,
    /// Text handed to the subject.
    pub subject_input: String,
    /// Text the oracle evaluated.
    pub canonical_input: String,
    pub expected: String,
    pub actual: Option<String>,
    #[serde(flatten)]
    pub verdict: Verdict,
    /// Operation kinds in the case (arithmetic only).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<&'static str>,
    /// `(source, target)` for conversion cases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_pair: Option<(u32, u32)>,
}

/// Pass/total counter for one axis value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub passed: u64,
    pub total: u64,
}

impl Tally {
    pub fn record(&mut self, passed: bool) {
        self.total += 1;
        if passed {
            self.passed += 1;
        }
    }

    pub fn is_perfect(&self) -> bool {
        self.passed == self.total
    }

    /// Pass rate in [0, 1]; an empty tally counts as perfect.
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }
}

impl fmt::Display for Tally {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "passed {} / total {}", self.passed, self.total)
    }
}

/// Aggregates over a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    pub overall: Tally,
    pub per_base_pair: BTreeMap<(u32, u32), Tally>,
    pub per_operation: BTreeMap<&'static str, Tally>,
    pub failures: BTreeMap<FailureTag, u64>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one case on every axis it belongs to.
    pub fn record(&mut self, case: &CaseReport) {
        let passed = case.verdict.is_pass();
        self.overall.record(passed);
        if let Some(pair) = case.base_pair {
            self.per_base_pair.entry(pair).or_default().record(passed);
        }
        for op in &case.operations {
            self.per_operation.entry(*op).or_default().record(passed);
        }
        if let Some(tag) = case.verdict.tag() {
            *self.failures.entry(tag).or_default() += 1;
        }
    }

    /// Cells with at least one failure, in base order.
    pub fn imperfect_cells(&self) -> impl Iterator<Item = (&(u32, u32), &Tally)> {
        self.per_base_pair.iter().filter(|(_, t)| !t.is_perfect())
    }

    pub fn perfect_cell_count(&self) -> usize {
        self.per_base_pair.values().filter(|t| t.is_perfect()).count()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn case(verdict: Verdict, operations: Vec<&'static str>, pair: Option<(u32, u32)>) -> CaseReport {
        CaseReport {
            mode: Mode::Arithmetic,
            index: 0,
            seed: 1,
            subject_input: "1".to_string(),
            canonical_input: "1".to_string(),
            expected: "1".to_string(),
            actual: None,
            verdict,
            operations,
            base_pair: pair,
        }
    }

    #[test]
    fn arithmetic_exact_match() {
        let (actual, verdict) = judge_arithmetic("7", Ok("7\n".to_string()));
        assert_eq!(actual.as_deref(), Some("7"));
        assert_eq!(verdict, Verdict::Pass);
        let (_, verdict) = judge_arithmetic("-3", Ok("3".to_string()));
        assert_eq!(verdict, Verdict::Mismatch);
    }

    #[test]
    fn arithmetic_suffixed_reply_compares_by_value() {
        let (actual, verdict) = judge_arithmetic("255", Ok("FF_16".to_string()));
        assert_eq!(actual.as_deref(), Some("255"));
        assert_eq!(verdict, Verdict::Pass);
        let (_, verdict) = judge_arithmetic("255", Ok("zz_2".to_string()));
        assert_eq!(verdict.tag(), Some(FailureTag::MalformedReply));
    }

    #[test]
    fn conversion_ignores_case_and_suffix() {
        let (actual, verdict) = judge_conversion("1a2f", Ok("1A2F_16".to_string()));
        assert_eq!(actual.as_deref(), Some("1A2F"));
        assert_eq!(verdict, Verdict::Pass);
        let (_, verdict) = judge_conversion("1a2f", Ok("1A2E_16".to_string()));
        assert_eq!(verdict, Verdict::Mismatch);
    }

    #[test]
    fn driver_errors_keep_their_tag() {
        let (actual, verdict) = judge_arithmetic("1", Err(Error::Invocation("gone".into())));
        assert!(actual.is_none());
        assert_eq!(verdict.tag(), Some(FailureTag::InvocationError));
        let (_, verdict) = judge_conversion("1", Err(Error::result_parse("bad", "x = y")));
        assert_eq!(
            verdict,
            Verdict::MalformedReply {
                message: "bad".to_string(),
                raw: "x = y".to_string()
            }
        );
    }

    #[test]
    fn statistics_cover_every_axis() {
        let mut stats = RunStatistics::new();
        stats.record(&case(Verdict::Pass, vec!["add", "unary"], None));
        stats.record(&case(Verdict::Mismatch, vec!["add"], None));
        stats.record(&case(Verdict::Pass, vec![], Some((2, 3))));
        stats.record(&case(
            Verdict::InvocationFailed { message: "x".into() },
            vec![],
            Some((2, 3)),
        ));
        stats.record(&case(Verdict::Pass, vec![], Some((3, 2))));

        assert_eq!(stats.overall, Tally { passed: 3, total: 5 });
        assert_eq!(stats.per_operation["add"], Tally { passed: 1, total: 2 });
        assert_eq!(stats.per_operation["unary"], Tally { passed: 1, total: 1 });
        assert_eq!(stats.failures[&FailureTag::Mismatch], 1);
        assert_eq!(stats.failures[&FailureTag::InvocationError], 1);
        assert_eq!(stats.perfect_cell_count(), 1);
        let imperfect: Vec<_> = stats.imperfect_cells().map(|(pair, _)| *pair).collect();
        assert_eq!(imperfect, vec![(2, 3)]);
    }

    #[test]
    fn tally_display_and_rate() {
        let t = Tally { passed: 3, total: 4 };
        assert_eq!(t.to_string(), "passed 3 / total 4");
        assert!((t.rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(Tally::default().rate(), 1.0);
    }

    #[test]
    fn only_invocation_errors_are_tagged_as_invocation() {
        let verdict = Verdict::from_error(Error::Invocation("no such file".into()));
        assert_eq!(verdict.tag(), Some(FailureTag::InvocationError));

        let verdict = Verdict::from_error(Error::parse_at("unexpected ')'", 3));
        assert_eq!(verdict.tag(), Some(FailureTag::MalformedReply));
        let Verdict::MalformedReply { message, raw } = verdict else {
            panic!("expected a malformed reply");
        };
        assert!(message.starts_with("unexpected subject error"), "{message}");
        assert!(raw.is_empty());

        let (actual, verdict) = judge_arithmetic("7", Err(Error::DivisionByZero));
        assert!(actual.is_none());
        assert_eq!(verdict.tag(), Some(FailureTag::MalformedReply));
    }

    #[test]
    fn verdict_serializes_with_tag() {
        let json = serde_json::to_value(Verdict::MalformedReply {
            message: "m".into(),
            raw: "r".into(),
        })
        .unwrap();
        assert_eq!(json["verdict"], "malformed_reply");
        assert_eq!(json["raw"], "r");
    }
}
