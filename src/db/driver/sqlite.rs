use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use fieldx::fxstruct;
use sea_orm::ConnectOptions;
use sea_orm::ConnectionTrait;
use sea_orm::DatabaseConnection;

use crate::error::Result;

use super::DatabaseDriver;

#[derive(Debug)]
#[fxstruct(sync, no_new)]
pub struct Sqlite {
    connection: DatabaseConnection,
}

impl Sqlite {
    /// Open (creating if necessary) the database file at `db_path`.
    pub async fn connect(db_path: &Path) -> Result<Self> {
        let schema = format!("sqlite://{}?mode=rwc", db_path.display());
        let mut opts = ConnectOptions::new(&schema);
        opts.max_connections(8)
            .acquire_timeout(Duration::from_secs(10))
            .sqlx_logging(false);

        let db = sea_orm::Database::connect(opts)
            .await
            .inspect_err(|e| tracing::error!("Error connecting to database {schema}: {e}"))?;

        Ok(Self { connection: db })
    }
}

#[async_trait]
impl DatabaseDriver for Sqlite {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    async fn configure(&self) -> Result<()> {
        let db = &self.connection;

        db.execute_unprepared("PRAGMA journal_mode=WAL;").await?;
        db.execute_unprepared("PRAGMA synchronous=NORMAL;").await?;
        db.execute_unprepared("PRAGMA busy_timeout=5000;").await?;

        Ok(())
    }

    async fn checkpoint(&self) -> Result<()> {
        self.connection.execute_unprepared("PRAGMA wal_checkpoint;").await?;

        Ok(())
    }

    // A deferred transaction that reads before it writes cannot upgrade its lock once another writer has committed
    // in between; SQLite answers that with SQLITE_BUSY right away instead of waiting.
    fn single_writer(&self) -> bool {
        true
    }
}
