use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use uuid::Uuid;

use crate::error::ProvisionError;
use crate::options::SeedOptions;

/// A throwaway database created for one run.
///
/// The handle is owned by the caller; drop the database with
/// [`EphemeralDatabase::drop_database`] once the run is over.
#[derive(Debug)]
pub struct EphemeralDatabase {
    admin: PgPool,
    name: String,
    connect: PgConnectOptions,
}

impl EphemeralDatabase {
    /// Create `seedcheck_<uuid>` using an admin connection.
    pub async fn create(
        admin: &PgConnectOptions,
        opts: &SeedOptions,
    ) -> Result<Self, ProvisionError> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(opts.acquire_timeout)
            .connect_with(admin.clone())
            .await?;

        let name = format!("seedcheck_{}", Uuid::new_v4().simple());
        let create = format!("CREATE DATABASE \"{name}\"");
        sqlx::raw_sql(&create).execute(&pool).await?;
        tracing::info!(event = "database_created", database = %name);

        let connect = admin.clone().database(&name);
        Ok(Self {
            admin: pool,
            name,
            connect,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Connection options for the new database.
    pub fn connect_options(&self) -> &PgConnectOptions {
        &self.connect
    }

    /// Terminate remaining sessions and drop the database.
    pub async fn drop_database(self) -> Result<(), ProvisionError> {
        let drop = format!("DROP DATABASE IF EXISTS \"{}\" WITH (FORCE)", self.name);
        let result = sqlx::raw_sql(&drop).execute(&self.admin).await;
        self.admin.close().await;
        result?;
        tracing::info!(event = "database_dropped", database = %self.name);
        Ok(())
    }
}
