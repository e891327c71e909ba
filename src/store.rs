use sea_orm::ColumnTrait;
use sea_orm::DatabaseConnection;
use sea_orm::DatabaseTransaction;
use sea_orm::EntityTrait;
use sea_orm::QueryFilter;
use sea_orm::TransactionTrait;
use std::fmt::Debug;
use std::ops::Deref;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::OwnedMutexGuard;
use tracing::instrument;

use crate::cache::CacheKey;
use crate::cache::RecordCache;
use crate::clock::VersionClock;
use crate::error::Result;
use crate::traits::PersonResolver;
use crate::traits::Referable;
use crate::traits::VersionedEntity;
use crate::traits::VersionedModel;
use crate::types::Audit;
use crate::types::Reference;

/// A write transaction. On single-writer backends it also holds the write gate until it is finished.
pub struct WriteTxn {
    txn:   DatabaseTransaction,
    _gate: Option<OwnedMutexGuard<()>>,
}

impl Deref for WriteTxn {
    type Target = DatabaseTransaction;

    fn deref(&self) -> &Self::Target {
        &self.txn
    }
}

/// Resources shared by all registries: the database, the record cache and the version clock.
pub struct Store {
    db:         DatabaseConnection,
    cache:      RecordCache,
    versions:   VersionClock,
    write_gate: Option<Arc<Mutex<()>>>,
}

impl Store {
    /// With `single_writer` set, write transactions run one at a time. The loser of a race then reaches its
    /// conditional write and sees the winner's version instead of failing to take the database lock.
    pub fn new(db: DatabaseConnection, cache: RecordCache, versions: VersionClock, single_writer: bool) -> Self {
        Self {
            db,
            cache,
            versions,
            write_gate: single_writer.then(|| Arc::new(Mutex::new(()))),
        }
    }

    #[inline]
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    #[inline]
    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    #[inline]
    pub fn versions(&self) -> &VersionClock {
        &self.versions
    }

    pub async fn begin(&self) -> Result<WriteTxn> {
        let gate = match self.write_gate {
            Some(ref gate) => Some(Arc::clone(gate).lock_owned().await),
            None => None,
        };
        Ok(WriteTxn {
            txn:   self.db.begin().await?,
            _gate: gate,
        })
    }

    /// Commit on success, roll back on failure. Every transaction opened by a registry ends here, so none is left
    /// open on any exit path. The write gate is released only after the transaction has ended.
    pub async fn finish<T>(&self, txn: WriteTxn, outcome: Result<T>) -> Result<T> {
        let WriteTxn { txn, _gate } = txn;
        match outcome {
            Ok(value) => {
                txn.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("rollback failed after '{err}': {rollback_err}");
                }
                Err(err)
            }
        }
    }

    /// Read a row through the cache. Only live rows are cached; a soft-deleted row is returned straight from storage
    /// so the caller can tell "deleted" from "missing".
    #[instrument(level = "trace", skip(self), fields(kind = %E::KIND))]
    pub async fn load_row<E>(&self, id: i32) -> Result<Option<E::Model>>
    where
        E: VersionedEntity,
        E::Model: VersionedModel,
    {
        let key = CacheKey::new(E::KIND, id);
        if let Some(row) = self.cache.get::<E::Model>(key).await? {
            return Ok(Some(row));
        }

        let row = E::find().filter(E::id_column().eq(id)).one(&self.db).await?;
        if let Some(ref row) = row {
            if !row.is_deleted() {
                self.cache.set(key, row).await?;
            }
        }
        Ok(row)
    }

    /// Short display form of a live record; `None` for id 0, unknown ids and soft-deleted records.
    pub async fn reference<E>(&self, id: i32) -> Result<Option<Reference>>
    where
        E: VersionedEntity,
        E::Model: VersionedModel + Referable,
    {
        if id == 0 {
            return Ok(None);
        }
        Ok(self
            .load_row::<E>(id)
            .await?
            .filter(|row| !row.is_deleted())
            .map(|row| row.reference()))
    }

    /// Resolve the creator and the last modifier of a record.
    pub async fn audit<M: VersionedModel>(&self, model: &M) -> Result<Audit> {
        Ok(Audit {
            created_by:  self.resolve_person(model.created_by()).await?,
            modified_by: self.resolve_person(model.modified_by()).await?,
        })
    }

    pub async fn invalidate(&self, key: CacheKey) -> Result<()> {
        self.cache.invalidate(key).await
    }
}

impl Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("cache", &self.cache.name())
            .field("versions", &self.versions)
            .field("single_writer", &self.write_gate.is_some())
            .finish()
    }
}
