//! Run statistics and the end-of-run summary

use crate::state::Outcome;
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Per-outcome tallies for one batch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    /// URLs that produced an outcome
    pub attempted: usize,

    /// Rows written to the record store
    pub succeeded: usize,

    /// Lines written to the failure store
    pub failed: usize,

    /// Pages skipped (written to neither store)
    pub skipped: usize,

    /// Failures by category
    pub failure_kinds: BTreeMap<&'static str, usize>,
}

impl OutcomeCounts {
    /// Counts one outcome
    pub fn record(&mut self, outcome: &Outcome) {
        self.attempted += 1;
        match outcome {
            Outcome::Success(_) => self.succeeded += 1,
            Outcome::Failure { reason, .. } => {
                self.failed += 1;
                *self.failure_kinds.entry(reason.kind()).or_insert(0) += 1;
            }
            Outcome::Skip { .. } => self.skipped += 1,
        }
    }

    /// Percentage of attempted URLs that produced a record
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            (self.succeeded as f64 / self.attempted as f64) * 100.0
        }
    }
}

/// Summary of a finished batch
#[derive(Debug, Clone)]
pub struct RunReport {
    pub counts: OutcomeCounts,
    pub records_path: PathBuf,
    pub failures_path: PathBuf,
    pub elapsed: Duration,
}

/// Formats a run report for the operator
pub fn format_report(report: &RunReport) -> String {
    let counts = &report.counts;
    let mut out = String::new();

    out.push_str("=== Run Summary ===\n\n");
    out.push_str(&format!("  Attempted: {}\n", counts.attempted));
    out.push_str(&format!(
        "  Succeeded: {} ({:.1}%)\n",
        counts.succeeded,
        counts.success_rate()
    ));
    out.push_str(&format!("  Failed:    {}\n", counts.failed));
    out.push_str(&format!("  Skipped:   {}\n", counts.skipped));

    if !counts.failure_kinds.is_empty() {
        out.push_str("\nFailures by Kind:\n");
        let mut kinds: Vec<_> = counts.failure_kinds.iter().collect();
        kinds.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (kind, count) in kinds {
            out.push_str(&format!("  {}: {}\n", kind, count));
        }
    }

    out.push_str(&format!("\nElapsed: {:.1}s\n", report.elapsed.as_secs_f64()));
    out.push_str("\nStores:\n");
    out.push_str(&format!("  Records:  {}\n", report.records_path.display()));
    out.push_str(&format!("  Failures: {}\n", report.failures_path.display()));
    out
}

/// Prints a run report to stdout
pub fn print_report(report: &RunReport) {
    print!("{}", format_report(report));
}
