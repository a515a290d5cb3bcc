//! Core contracts for seedcheck.
//!
//! Turns a DDL script into table dependency facts, orders tables for
//! insertion, and renders mock rows as SQL. Nothing here touches a database.

pub mod ddl;
pub mod error;
pub mod graph;
pub mod insert;
pub mod mock;
pub mod redaction;
pub mod result;
pub mod value;

pub use ddl::{TableDependency, extract_dependencies, split_statements, strip_comments};
pub use error::{CycleError, Result, SeedError};
pub use graph::{DependencyGraph, DependencyGraphSummary, order_tables};
pub use insert::serialize_insert;
pub use mock::{MockData, Row, parse_mock_data};
pub use redaction::redact_dsn;
pub use result::{RunOutcome, TestResult, format_duration};
pub use value::{escape_string, sql_literal};
