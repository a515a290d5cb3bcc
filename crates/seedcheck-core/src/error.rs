use thiserror::Error;

/// Raised when the dependency graph has no valid insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("circular dependency detected in schema: {}", .tables.join(", "))]
pub struct CycleError {
    /// Tables whose in-degree never reached zero, in discovery order.
    pub tables: Vec<String>,
}

/// Failure kinds produced while validating a schema and seeding mock data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeedError {
    /// Opening or pinging the database failed.
    #[error("database connection failed: {0}")]
    Connection(String),
    /// One DDL statement was rejected by the database.
    #[error("schema statement {index} failed: {message}")]
    DdlStatement { index: usize, message: String },
    /// The mock data document is not a table -> rows mapping.
    #[error("failed to parse mock data: {0}")]
    MockDataParse(String),
    /// Foreign keys form a cycle.
    #[error("failed to determine table order: {0}")]
    Cycle(#[from] CycleError),
    /// A table's rows could not be turned into an INSERT statement. The
    /// built-in serializer renders every row set, so runs never record this.
    #[error("failed to serialize rows for table {table}: {message}")]
    RowSerialization { table: String, message: String },
    /// A table's INSERT statement was rejected by the database.
    #[error("data test for table {table} failed: {message}")]
    InsertExecution { table: String, message: String },
}

impl SeedError {
    /// Fatal errors stop the run; the others are collected and the run continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SeedError::Connection(_) | SeedError::MockDataParse(_) | SeedError::Cycle(_)
        )
    }
}

/// Convenience alias for results returned by seedcheck crates.
pub type Result<T> = std::result::Result<T, SeedError>;
