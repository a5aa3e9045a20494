use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::bulk::UpdateOutcome;

const RULE_WIDTH: usize = 60;

/// A stack that could not be updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub stack_id: String,
    pub error: String,
}

/// Aggregate of every outcome of one run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub total: usize,
    pub success_count: usize,
    pub failure_count: usize,
    /// In the order outcomes arrived.
    pub failures: Vec<Failure>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub dry_run: bool,
}

impl RunSummary {
    /// Percentage of successful updates, `None` when nothing was attempted.
    pub fn success_rate(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(self.success_count as f64 / self.total as f64 * 100.0)
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count > 0
    }
}

pub fn aggregate(
    outcomes: Vec<UpdateOutcome>,
    started_at: DateTime<Utc>,
    elapsed: Duration,
) -> RunSummary {
    let mut summary = RunSummary {
        total: outcomes.len(),
        success_count: 0,
        failure_count: 0,
        failures: Vec::new(),
        started_at,
        elapsed,
        dry_run: false,
    };

    for outcome in outcomes {
        if outcome.success {
            summary.success_count += 1;
        } else {
            summary.failure_count += 1;
            summary.failures.push(Failure {
                stack_id: outcome.stack_id,
                error: outcome.error.unwrap_or_else(|| "unknown error".to_string()),
            });
        }
    }

    summary
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(RULE_WIDTH);

        writeln!(f, "{rule}")?;
        if self.dry_run {
            writeln!(f, "BULK UPDATE SUMMARY (dry run)")?;
        } else {
            writeln!(f, "BULK UPDATE SUMMARY")?;
        }
        writeln!(f, "{rule}")?;
        writeln!(f, "Started at: {}", self.started_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
        writeln!(f, "Total stacks processed: {}", self.total)?;
        writeln!(f, "Successful updates: {}", self.success_count)?;
        writeln!(f, "Failed updates: {}", self.failure_count)?;
        writeln!(f, "Execution time: {:.2?}", self.elapsed)?;

        match self.success_rate() {
            Some(rate) => writeln!(f, "Success rate: {rate:.2}%")?,
            None => {
                writeln!(f, "Success rate: 0.00%")?;
                writeln!(f, "No stacks were eligible for update.")?;
            }
        }

        if !self.failures.is_empty() {
            writeln!(f)?;
            writeln!(f, "Failed to update stacks:")?;
            for failure in &self.failures {
                writeln!(f, "  - {}: {}", failure.stack_id, failure.error)?;
            }
        }

        write!(f, "{rule}")
    }
}
