use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{Connection, PgPool};
use tokio::time::{Instant, sleep};

use crate::error::ExecutorError;
use crate::executor::SqlExecutor;
use crate::options::SeedOptions;

const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(250);

/// Executor backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PostgresExecutor {
    pool: PgPool,
}

impl PostgresExecutor {
    /// Create a new executor using a pre-configured pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl SqlExecutor for PostgresExecutor {
    fn engine(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&mut self) -> Result<(), ExecutorError> {
        let mut conn = self.pool.acquire().await?;
        conn.ping().await?;
        Ok(())
    }

    async fn execute(&mut self, sql: &str) -> Result<u64, ExecutorError> {
        // Simple query protocol: statements are not prepared.
        let done = sqlx::raw_sql(sql).execute(&self.pool).await?;
        Ok(done.rows_affected())
    }
}

/// Open a pool, retrying until `opts.ready_timeout` elapses.
pub async fn connect_when_ready(
    connect: &PgConnectOptions,
    opts: &SeedOptions,
) -> Result<PgPool, sqlx::Error> {
    let deadline = Instant::now() + opts.ready_timeout;
    let mut attempt = 1u32;

    loop {
        let result = PgPoolOptions::new()
            .max_connections(opts.max_connections)
            .acquire_timeout(opts.acquire_timeout)
            .connect_with(connect.clone())
            .await;

        match result {
            Ok(pool) => return Ok(pool),
            Err(err) if Instant::now() + CONNECT_RETRY_DELAY < deadline => {
                tracing::debug!(event = "connect_retry", attempt, error = %err);
                attempt += 1;
                sleep(CONNECT_RETRY_DELAY).await;
            }
            Err(err) => return Err(err),
        }
    }
}
