use std::time::Duration;

use async_trait::async_trait;
use fieldx::fxstruct;
use sea_orm::ConnectOptions;
use sea_orm::DatabaseConnection;

use crate::error::Result;

use super::DatabaseDriver;

#[derive(Debug)]
#[fxstruct(sync, no_new)]
pub struct Pg {
    connection: DatabaseConnection,
}

impl Pg {
    pub async fn connect(host: &str, port: u16, user: &str, password: &str, database: &str) -> Result<Self> {
        let schema = format!("postgres://{user}:{password}@{host}:{port}/{database}");
        let mut opts = ConnectOptions::new(&schema);
        opts.max_connections(20)
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(20))
            .max_lifetime(Duration::from_secs(60))
            .test_before_acquire(true)
            .sqlx_logging(false);

        let connection = sea_orm::Database::connect(opts)
            .await
            .inspect_err(|e| tracing::error!("Error connecting to PostgreSQL at {host}:{port}/{database}: {e}"))?;

        Ok(Self { connection })
    }
}

#[async_trait]
impl DatabaseDriver for Pg {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    async fn configure(&self) -> Result<()> {
        // Conditional writes rely on READ COMMITTED, which is the server default. Only make sure the server is there.
        self.connection.ping().await?;

        Ok(())
    }

    async fn checkpoint(&self) -> Result<()> {
        Ok(())
    }
}
