use async_trait::async_trait;

use crate::error::ExecutorError;

/// A live connection target the orchestrator issues statements against.
///
/// Statements run one at a time, in the order they are issued.
#[async_trait]
pub trait SqlExecutor: Send {
    /// Returns the engine identifier (e.g. `postgres`).
    fn engine(&self) -> &'static str;

    /// Check that the target accepts statements.
    async fn ping(&mut self) -> Result<(), ExecutorError>;

    /// Execute one statement, returning the number of affected rows.
    async fn execute(&mut self, sql: &str) -> Result<u64, ExecutorError>;
}
