use thiserror::Error;

/// Failure reported by a [`crate::SqlExecutor`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct ExecutorError(pub String);

impl From<sqlx::Error> for ExecutorError {
    fn from(value: sqlx::Error) -> Self {
        match value {
            sqlx::Error::Database(db) => match db.code() {
                Some(code) => ExecutorError(format!("{} (SQLSTATE {code})", db.message())),
                None => ExecutorError(db.message().to_string()),
            },
            other => ExecutorError(other.to_string()),
        }
    }
}

/// Errors creating or dropping an ephemeral database.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
