use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::SeedError;

/// Metric key for the wall-clock duration of a run.
pub const EXECUTION_TIME: &str = "execution_time";
/// Metric key for the number of tables whose INSERT succeeded.
pub const TABLES_SEEDED: &str = "tables_seeded";
/// Metric key for the number of rows inserted.
pub const ROWS_INSERTED: &str = "rows_inserted";
/// Metric key for the number of statements that executed successfully.
pub const STATEMENTS_EXECUTED: &str = "statements_executed";

/// Outcome of one schema + mock data validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub schema_valid: bool,
    pub data_valid: bool,
    pub errors: Vec<String>,
    pub performance_metrics: BTreeMap<String, String>,
}

impl TestResult {
    /// Append an error message. Errors are never removed.
    pub fn record(&mut self, error: &SeedError) {
        self.errors.push(error.to_string());
    }

    pub fn set_metric(&mut self, name: &str, value: impl ToString) {
        self.performance_metrics
            .insert(name.to_string(), value.to_string());
    }

    pub fn execution_time(&self) -> Option<&str> {
        self.performance_metrics
            .get(EXECUTION_TIME)
            .map(String::as_str)
    }
}

/// Result of a run as seen by callers.
///
/// `Aborted` means the run could not complete (no connection, unparseable
/// mock data, cyclic schema); `Completed` may still carry errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed(TestResult),
    Aborted { result: TestResult, error: SeedError },
}

impl RunOutcome {
    pub fn result(&self) -> &TestResult {
        match self {
            RunOutcome::Completed(result) => result,
            RunOutcome::Aborted { result, .. } => result,
        }
    }

    pub fn into_result(self) -> TestResult {
        match self {
            RunOutcome::Completed(result) => result,
            RunOutcome::Aborted { result, .. } => result,
        }
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, RunOutcome::Aborted { .. })
    }
}

/// Human-readable duration such as `152.3ms` or `1.25s`.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos < 1_000 {
        format!("{nanos}ns")
    } else if nanos < 1_000_000 {
        format!("{:.1}µs", nanos as f64 / 1_000.0)
    } else if nanos < 1_000_000_000 {
        format!("{:.1}ms", nanos as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}
