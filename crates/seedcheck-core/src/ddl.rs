//! Narrow pattern extraction over DDL scripts.
//!
//! This is not a SQL parser. Comments are removed, then each `;`-separated
//! statement that starts with `CREATE TABLE <name>` yields its
//! `FOREIGN KEY (...) REFERENCES <name>` targets. Everything else is ignored.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static COMMENT_OR_LITERAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)'(?:[^']|'')*'|--[^\n]*|/\*.*?\*/").expect("comment pattern compiles")
});

static CREATE_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)^create\s+(?:(?:global\s+|local\s+)?(?:temporary|temp)\s+|unlogged\s+)?table\s+(?:if\s+not\s+exists\s+)?(?:"?\w+"?\s*\.\s*)?"?(\w+)"?"#,
    )
    .expect("create table pattern compiles")
});

static FOREIGN_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bforeign\s+key\s*\([^)]*\)\s*references\s+(?:"?\w+"?\s*\.\s*)?"?(\w+)"?"#)
        .expect("foreign key pattern compiles")
});

/// Tables referenced by one declared table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDependency {
    /// Lowercased table name.
    pub name: String,
    /// Lowercased referenced table names, duplicates and source order kept.
    pub dependencies: Vec<String>,
}

/// Split a script on `;`, yielding trimmed, non-blank statements.
pub fn split_statements(script: &str) -> impl Iterator<Item = &str> {
    script
        .split(';')
        .map(str::trim)
        .filter(|statement| !statement.is_empty())
}

/// Extract one [`TableDependency`] per `CREATE TABLE` statement in `script`.
///
/// Statements that do not declare a table (views, indexes, inserts) are
/// skipped. Table names are lowercased and schema qualifiers dropped.
pub fn extract_dependencies(script: &str) -> Vec<TableDependency> {
    split_statements(&strip_comments(script))
        .filter_map(extract_statement)
        .collect()
}

/// Replace `--` and `/* */` comments with a space, leaving string literals intact.
pub fn strip_comments(script: &str) -> String {
    COMMENT_OR_LITERAL
        .replace_all(script, |captures: &regex::Captures<'_>| {
            let matched = &captures[0];
            if matched.starts_with('\'') {
                matched.to_string()
            } else {
                " ".to_string()
            }
        })
        .into_owned()
}

fn extract_statement(statement: &str) -> Option<TableDependency> {
    let name = CREATE_TABLE.captures(statement)?.get(1)?.as_str().to_lowercase();

    let dependencies = FOREIGN_KEY
        .captures_iter(statement)
        .filter_map(|captures| captures.get(1))
        .map(|referenced| referenced.as_str().to_lowercase())
        .collect();

    Some(TableDependency { name, dependencies })
}
