//! Database-facing half of seedcheck: executors, provisioning, and the
//! seeding orchestrator.

pub mod error;
pub mod executor;
pub mod options;
pub mod orchestrator;
pub mod postgres;
pub mod provision;

pub use error::{ExecutorError, ProvisionError};
pub use executor::SqlExecutor;
pub use options::SeedOptions;
pub use orchestrator::{run, run_with_options};
pub use postgres::{PostgresExecutor, connect_when_ready};
pub use provision::EphemeralDatabase;
