//! Run reporting
//!
//! Terminal output is a repro block per failing case plus an end-of-run
//! summary. On disk a run is saved as a JSON [`RunReport`].

use std::path::Path;

use serde::Serialize;

use crate::compare::{CaseReport, FailureTag, Mode, RunStatistics, Tally, Verdict};
use crate::error::{Error, Result};

/// Repro block for one failing case.
pub fn render_failure(case: &CaseReport) -> String {
    let tag = case
        .verdict
        .tag()
        .map_or_else(|| "pass".to_string(), |t| t.to_string());
    let mut out = String::new();
    out.push_str(&format!(
        "FAIL [{tag}] {} case {} (seed {})\n",
        case.mode, case.index, case.seed
    ));
    out.push_str(&format!("  subject input:   {}\n", case.subject_input));
    out.push_str(&format!("  canonical input: {}\n", case.canonical_input));
    out.push_str(&format!("  expected:        {}\n", case.expected));
    match &case.verdict {
        Verdict::InvocationFailed { message } => {
            out.push_str(&format!("  actual:          <invocation error: {message}>\n"));
        }
        Verdict::MalformedReply { message, raw } => {
            out.push_str(&format!("  actual:          <malformed reply: {message}>\n"));
            out.push_str(&format!(
                "  raw output:      {}\n",
                raw.trim_end().replace('\n', "\\n")
            ));
        }
        Verdict::Pass | Verdict::Mismatch => {
            out.push_str(&format!(
                "  actual:          {}\n",
                case.actual.as_deref().unwrap_or("")
            ));
        }
    }
    out
}

/// End-of-run summary for `mode`.
pub fn render_summary(mode: Mode, stats: &RunStatistics) -> String {
    let mut out = format!("{}\n", stats.overall);

    match mode {
        Mode::Arithmetic if !stats.per_operation.is_empty() => {
            out.push_str("\nper operation:\n");
            for (op, tally) in &stats.per_operation {
                out.push_str(&format!("  {op:<6} {tally}  ({:.1}%)\n", tally.rate() * 100.0));
            }
        }
        Mode::Matrix | Mode::Numerals if !stats.per_base_pair.is_empty() => {
            let imperfect: Vec<_> = stats.imperfect_cells().collect();
            if !imperfect.is_empty() {
                out.push_str("\nimperfect cells (source -> target):\n");
                for ((source, target), tally) in imperfect {
                    out.push_str(&format!("  {source:>2} -> {target:<2}  {tally}\n"));
                }
            }
            out.push_str(&format!(
                "\nperfect cells: {} / {}\n",
                stats.perfect_cell_count(),
                stats.per_base_pair.len()
            ));
        }
        _ => {}
    }

    if !stats.failures.is_empty() {
        out.push_str("\nfailures:\n");
        for (tag, count) in &stats.failures {
            out.push_str(&format!("  {tag}: {count}\n"));
        }
    }
    out
}

/// Persisted form of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub mode: Mode,
    pub seed: u64,
    pub subject: String,
    pub timestamp: String,
    pub overall: Tally,
    pub per_operation: Vec<OperationRow>,
    pub cells: Vec<CellRow>,
    pub failure_counts: Vec<TagCount>,
    pub failures: Vec<CaseReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OperationRow {
    pub operation: String,
    #[serde(flatten)]
    pub tally: Tally,
}

#[derive(Debug, Clone, Serialize)]
pub struct CellRow {
    pub source_base: u32,
    pub target_base: u32,
    #[serde(flatten)]
    pub tally: Tally,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagCount {
    pub tag: FailureTag,
    pub count: u64,
}

/// Assemble a report from run results.
pub fn build_report(
    mode: Mode,
    seed: u64,
    subject: &str,
    stats: &RunStatistics,
    failures: &[CaseReport],
) -> RunReport {
    RunReport {
        mode,
        seed,
        subject: subject.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        overall: stats.overall,
        per_operation: stats
            .per_operation
            .iter()
            .map(|(op, tally)| OperationRow {
                operation: op.to_string(),
                tally: *tally,
            })
            .collect(),
        cells: stats
            .per_base_pair
            .iter()
            .map(|((source_base, target_base), tally)| CellRow {
                source_base: *source_base,
                target_base: *target_base,
                tally: *tally,
            })
            .collect(),
        failure_counts: stats
            .failures
            .iter()
            .map(|(tag, count)| TagCount {
                tag: *tag,
                count: *count,
            })
            .collect(),
        failures: failures.to_vec(),
    }
}

/// Write a report as pretty JSON, creating parent directories.
pub fn save_report(report: &RunReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report).map_err(|e| Error::Config(e.to_string()))?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "saved report");
    Ok(())
}
