//! Database drivers.
#[cfg(feature = "pg")]
pub mod pg;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use std::fmt::Debug;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use crate::error::Result;

/// A configured connection to one of the supported backends.
#[async_trait]
pub trait DatabaseDriver: Debug + Sync + Send + 'static {
    /// Return driver name.
    fn name(&self) -> &'static str;
    /// Returns the database connection for the driver.
    fn connection(&self) -> DatabaseConnection;
    /// Apply backend-specific session settings. See the corresponding driver implementation for details.
    async fn configure(&self) -> Result<()>;
    /// Flush whatever the backend keeps pending. Called on orderly shutdown.
    async fn checkpoint(&self) -> Result<()>;
    /// Whether the backend admits a single writer at a time, so write transactions have to queue in-process.
    fn single_writer(&self) -> bool {
        false
    }
}
