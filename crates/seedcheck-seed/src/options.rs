use std::time::Duration;

/// Options that control how the orchestrator connects to a database.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    /// How long to keep retrying the initial connection while the server starts.
    pub ready_timeout: Duration,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            max_connections: 5,
            acquire_timeout: Duration::from_secs(10),
            ready_timeout: Duration::from_secs(30),
        }
    }
}
