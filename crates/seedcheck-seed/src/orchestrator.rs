//! Applies a schema, orders its tables, and seeds mock rows.
//!
//! Errors are collected into the [`TestResult`] as the run proceeds. DDL and
//! per-table INSERT failures are recorded and the run continues; connection
//! failures, unparseable mock data and dependency cycles abort the run.

use std::time::Instant;

use sqlx::postgres::PgConnectOptions;

use seedcheck_core::result::{EXECUTION_TIME, ROWS_INSERTED, STATEMENTS_EXECUTED, TABLES_SEEDED};
use seedcheck_core::{
    MockData, Row, RunOutcome, SeedError, TestResult, extract_dependencies, format_duration,
    order_tables, parse_mock_data, serialize_insert, split_statements, strip_comments,
};

use crate::executor::SqlExecutor;
use crate::options::SeedOptions;
use crate::postgres::{PostgresExecutor, connect_when_ready};

/// Accumulates errors and counters for one run.
struct RunLedger {
    started: Instant,
    result: TestResult,
    tables_seeded: usize,
    rows_inserted: u64,
    statements_executed: usize,
}

impl RunLedger {
    fn start() -> Self {
        Self {
            started: Instant::now(),
            result: TestResult::default(),
            tables_seeded: 0,
            rows_inserted: 0,
            statements_executed: 0,
        }
    }

    fn record(&mut self, error: &SeedError) {
        tracing::warn!(event = "run_error", fatal = error.is_fatal(), error = %error);
        self.result.record(error);
    }

    fn stamp_metrics(&mut self) {
        let elapsed = format_duration(self.started.elapsed());
        self.result.set_metric(EXECUTION_TIME, elapsed);
        self.result.set_metric(TABLES_SEEDED, self.tables_seeded);
        self.result.set_metric(ROWS_INSERTED, self.rows_inserted);
        self.result
            .set_metric(STATEMENTS_EXECUTED, self.statements_executed);
    }

    fn abort(mut self, error: SeedError) -> RunOutcome {
        self.record(&error);
        self.result.data_valid = false;
        self.stamp_metrics();
        tracing::info!(
            event = "run_finished",
            status = "aborted",
            execution_time = self.result.execution_time().unwrap_or_default()
        );
        RunOutcome::Aborted {
            result: self.result,
            error,
        }
    }

    fn finish(mut self) -> RunOutcome {
        self.result.data_valid = self.result.errors.is_empty();
        self.stamp_metrics();
        tracing::info!(
            event = "run_finished",
            status = "completed",
            schema_valid = self.result.schema_valid,
            data_valid = self.result.data_valid,
            errors = self.result.errors.len(),
            execution_time = self.result.execution_time().unwrap_or_default()
        );
        RunOutcome::Completed(self.result)
    }
}

/// Validate `ddl` and `mock_data` against a connected executor.
///
/// Never fails: every error ends up in the returned result. The executor is
/// borrowed; opening and closing it is the caller's job.
pub async fn run<E>(executor: &mut E, ddl: &str, mock_data: &str) -> RunOutcome
where
    E: SqlExecutor + ?Sized,
{
    let mut ledger = RunLedger::start();
    tracing::info!(event = "run_started", engine = executor.engine());

    if let Err(err) = executor.ping().await {
        return ledger.abort(SeedError::Connection(format!("ping failed: {err}")));
    }

    let schema_valid = apply_schema(executor, ddl, &mut ledger).await;
    ledger.result.schema_valid = schema_valid;

    let data = match parse_mock_data(mock_data) {
        Ok(data) => data,
        Err(err) => return ledger.abort(err),
    };

    let dependencies = extract_dependencies(ddl);
    let order = match order_tables(&dependencies) {
        Ok(order) => order,
        Err(err) => return ledger.abort(err.into()),
    };
    tracing::info!(event = "table_order_resolved", tables = ?order);

    log_unordered_tables(&data, &order);

    for table in &order {
        if let Some(rows) = data.get(table) {
            seed_table(executor, table, rows, &mut ledger).await;
        }
    }

    ledger.finish()
}

/// Connect to `connect`, run, and close the pool.
pub async fn run_with_options(
    connect: &PgConnectOptions,
    opts: &SeedOptions,
    ddl: &str,
    mock_data: &str,
) -> RunOutcome {
    let pool = match connect_when_ready(connect, opts).await {
        Ok(pool) => pool,
        Err(err) => {
            return RunLedger::start().abort(SeedError::Connection(err.to_string()));
        }
    };

    let mut executor = PostgresExecutor::new(pool);
    let outcome = run(&mut executor, ddl, mock_data).await;
    executor.pool().close().await;
    outcome
}

/// Execute every statement; returns true when all succeeded.
async fn apply_schema<E>(executor: &mut E, ddl: &str, ledger: &mut RunLedger) -> bool
where
    E: SqlExecutor + ?Sized,
{
    let mut valid = true;

    let ddl = strip_comments(ddl);
    for (index, statement) in split_statements(&ddl).enumerate() {
        match executor.execute(statement).await {
            Ok(_) => ledger.statements_executed += 1,
            Err(err) => {
                valid = false;
                tracing::debug!(event = "ddl_statement_failed", index = index + 1);
                ledger.record(&SeedError::DdlStatement {
                    index: index + 1,
                    message: err.to_string(),
                });
            }
        }
    }

    valid
}

async fn seed_table<E>(executor: &mut E, table: &str, rows: &[Row], ledger: &mut RunLedger)
where
    E: SqlExecutor + ?Sized,
{
    let Some(statement) = serialize_insert(table, rows) else {
        tracing::debug!(event = "table_skipped", table, reason = "no rows");
        return;
    };

    match executor.execute(&statement).await {
        Ok(affected) => {
            ledger.statements_executed += 1;
            ledger.tables_seeded += 1;
            ledger.rows_inserted += affected;
            tracing::info!(event = "table_seeded", table, rows = affected);
        }
        Err(err) => ledger.record(&SeedError::InsertExecution {
            table: table.to_string(),
            message: err.to_string(),
        }),
    }
}

fn log_unordered_tables(data: &MockData, order: &[String]) {
    for table in data.keys() {
        if !order.contains(table) {
            tracing::warn!(event = "mock_table_skipped", table = %table, reason = "not declared");
        }
    }
}
