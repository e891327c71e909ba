//! The operation surface shared by every entity.
//!
//! A [`Registry`] is the generic list/get/add/edit/delete/batch/delta flow; the entity-specific parts come from its
//! [`DataController`]. All writes follow the same shape:
//!
//! 1. open a transaction;
//! 2. run the pre-write checks (duplicate keys, entity validation, usage checks), none of which mutate;
//! 3. issue the conditional (compare-and-swap) write;
//! 4. commit on success or roll back on any failure;
//! 5. invalidate the cache entries of all touched records.
//!
//! Step 5 is not left to the individual operations: [`Registry::invalidating`] wraps each mutation and always
//! invalidates once the mutation has finished, whatever its outcome.
use async_trait::async_trait;
use sea_orm::ActiveModelTrait;
use sea_orm::ColumnTrait;
use sea_orm::DatabaseTransaction;
use sea_orm::EntityTrait;
use sea_orm::Iterable;
use sea_orm::ModelTrait;
use sea_orm::QueryFilter;
use sea_orm::QueryOrder;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::instrument;

use crate::cache::CacheKey;
use crate::concurrency::cas_soft_delete;
use crate::concurrency::cas_update;
use crate::concurrency::Expected;
use crate::delta::classify_model;
use crate::delta::fetch_changes;
use crate::error::Error;
use crate::error::Result;
use crate::store::Store;
use crate::traits::DataController;
use crate::traits::VersionedEntity;
use crate::traits::VersionedModel;
use crate::types::Delta;
use crate::types::DeltaPartition;
use crate::types::EntityKind;
use crate::usage::first_usage;
use crate::usage::UsageCheck;

type ColumnOf<DC> = <<DC as DataController>::Entity as EntityTrait>::Column;

#[derive(Debug)]
pub struct Registry<DC>
where
    DC: DataController,
{
    store:           Arc<Store>,
    controller:      DC,
    disabled_checks: HashSet<String>,
}

impl<DC> Registry<DC>
where
    DC: DataController,
{
    pub fn new(store: Arc<Store>, controller: DC) -> Self {
        Self {
            store,
            controller,
            disabled_checks: HashSet::new(),
        }
    }

    /// Deactivate usage checks by their conflict codes. Unknown codes are ignored.
    pub fn with_disabled_checks<I, S>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.disabled_checks.extend(codes.into_iter().map(Into::into));
        self
    }

    #[inline]
    pub fn kind() -> EntityKind {
        <DC::Entity as VersionedEntity>::KIND
    }

    #[inline]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    #[inline]
    pub fn controller(&self) -> &DC {
        &self.controller
    }

    pub fn active_usage_checks(&self) -> Vec<UsageCheck> {
        self.controller
            .usage_checks()
            .into_iter()
            .filter(|check| !self.disabled_checks.contains(check.code))
            .collect()
    }

    /// All live records, ordered by id.
    #[instrument(level = "debug", skip(self), fields(kind = %Self::kind()))]
    pub async fn list(&self) -> Result<Vec<DC::Detail>> {
        let outcome = self.list_live().await;
        self.report("list", 0, &outcome);
        outcome
    }

    /// Detail of a live record. Soft-deleted records yield [`Error::DataDeleted`].
    #[instrument(level = "debug", skip(self), fields(kind = %Self::kind()))]
    pub async fn get_by_id(&self, id: i32) -> Result<DC::Detail> {
        let outcome = match self.get_row(id).await {
            Ok(row) => self.controller.hydrate(&self.store, row).await,
            Err(err) => Err(err),
        };
        self.report("get", id, &outcome);
        outcome
    }

    /// The bare row of a live record, read through the cache.
    pub async fn get_row(&self, id: i32) -> Result<DC::Model> {
        match self.store.load_row::<DC::Entity>(id).await? {
            None => Err(Error::NotFound { kind: Self::kind(), id }),
            Some(row) if row.is_deleted() => Err(Error::DataDeleted { kind: Self::kind(), id }),
            Some(row) => Ok(row),
        }
    }

    /// Look a live record up by its business code. Always `None` for entities without one.
    #[instrument(level = "debug", skip(self), fields(kind = %Self::kind()))]
    pub async fn get_by_code(&self, code: &str) -> Result<Option<DC::Detail>> {
        let outcome = self.find_by_code(code).await;
        self.report("get_by_code", 0, &outcome);
        outcome
    }

    /// Insert a new record. Identity and versioning fields of the payload are ignored; the stored row is returned.
    #[instrument(level = "debug", skip(self, payload), fields(kind = %Self::kind()))]
    pub async fn add(&self, payload: DC::Model, actor: i32) -> Result<DC::Model> {
        let outcome = async {
            let txn = self.store.begin().await?;
            let result = self.add_in(&txn, payload, actor).await;
            self.store.finish(txn, result).await
        }
        .await;
        self.report("add", outcome.as_ref().map_or(0, |row| row.id()), &outcome);
        outcome
    }

    /// Update a record. The payload's `id` and `version` are the compare-and-swap token. Returns the new version.
    #[instrument(level = "debug", skip(self, payload), fields(kind = %Self::kind(), id = payload.id()))]
    pub async fn edit(&self, payload: DC::Model, actor: i32) -> Result<i64> {
        let id = payload.id();
        let outcome = self
            .invalidating([id], async {
                let txn = self.store.begin().await?;
                let result = self.edit_in(&txn, &payload, actor).await;
                self.store.finish(txn, result).await
            })
            .await;
        self.report("edit", id, &outcome);
        outcome
    }

    /// Soft-delete a record the caller last saw at `version`.
    #[instrument(level = "debug", skip(self), fields(kind = %Self::kind()))]
    pub async fn delete(&self, id: i32, version: i64, actor: i32) -> Result<()> {
        let outcome = self
            .invalidating([id], async {
                let txn = self.store.begin().await?;
                let result = self.delete_in(&txn, Expected::new(id, version), actor).await;
                self.store.finish(txn, result).await.map(|_| ())
            })
            .await;
        self.report("delete", id, &outcome);
        outcome
    }

    /// Soft-delete several records atomically: either all of them are deleted or none is. The error of a failed
    /// batch is [`Error::Batch`] pointing at the first failing record.
    #[instrument(level = "debug", skip(self, items), fields(kind = %Self::kind(), count = items.len()))]
    pub async fn batch_delete(&self, items: &[Expected], actor: i32) -> Result<()> {
        let ids = items.iter().map(|item| item.id).collect::<Vec<_>>();
        let outcome = self
            .invalidating(ids, async {
                let txn = self.store.begin().await?;
                let mut result = Ok(());
                for (index, item) in items.iter().enumerate() {
                    if let Err(err) = self.delete_in(&txn, *item, actor).await {
                        result = Err(err.in_batch(index, item.id));
                        break;
                    }
                }
                self.store.finish(txn, result).await
            })
            .await;
        self.report("batch_delete", 0, &outcome);
        outcome
    }

    /// Update several records atomically. Returns the new versions in payload order.
    #[instrument(level = "debug", skip(self, payloads), fields(kind = %Self::kind(), count = payloads.len()))]
    pub async fn batch_edit(&self, payloads: Vec<DC::Model>, actor: i32) -> Result<Vec<i64>> {
        let ids = payloads.iter().map(|payload| payload.id()).collect::<Vec<_>>();
        let outcome = self
            .invalidating(ids, async {
                let txn = self.store.begin().await?;
                let mut result = Ok(Vec::with_capacity(payloads.len()));
                for (index, payload) in payloads.iter().enumerate() {
                    match self.edit_in(&txn, payload, actor).await {
                        Ok(version) => {
                            if let Ok(ref mut versions) = result {
                                versions.push(version);
                            }
                        }
                        Err(err) => {
                            result = Err(err.in_batch(index, payload.id()));
                            break;
                        }
                    }
                }
                self.store.finish(txn, result).await
            })
            .await;
        self.report("batch_edit", 0, &outcome);
        outcome
    }

    /// Everything that changed after `watermark`, split into new, updated and deleted records.
    #[instrument(level = "debug", skip(self), fields(kind = %Self::kind()))]
    pub async fn get_delta(&self, watermark: i64) -> Result<Delta<DC::Detail>> {
        let outcome = self.collect_delta(watermark).await;
        self.report("delta", 0, &outcome);
        outcome
    }

    async fn list_live(&self) -> Result<Vec<DC::Detail>> {
        let rows = DC::Entity::find()
            .filter(DC::Entity::deleted_column().eq(false))
            .order_by_asc(DC::Entity::id_column())
            .all(self.store.db())
            .await?;

        let mut details = Vec::with_capacity(rows.len());
        for row in rows {
            details.push(self.controller.hydrate(&self.store, row).await?);
        }
        Ok(details)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<DC::Detail>> {
        let Some(column) = self.controller.code_column()
        else {
            return Ok(None);
        };
        let row = DC::Entity::find()
            .filter(column.eq(code))
            .filter(DC::Entity::deleted_column().eq(false))
            .one(self.store.db())
            .await?;
        Ok(match row {
            Some(row) => Some(self.controller.hydrate(&self.store, row).await?),
            None => None,
        })
    }

    async fn collect_delta(&self, watermark: i64) -> Result<Delta<DC::Detail>> {
        let Some((result_ts, rows)) = fetch_changes::<DC::Entity, _>(self.store.db(), watermark).await?
        else {
            return Ok(Delta::empty(watermark));
        };

        let mut delta = Delta::empty(result_ts);
        for row in rows {
            let partition = classify_model(watermark, &row);
            if partition != DeltaPartition::Skip {
                delta.push(partition, self.controller.hydrate(&self.store, row).await?);
            }
        }
        Ok(delta)
    }

    // Caller-supplied values of all non-managed columns.
    fn payload_fields(&self, payload: &DC::Model) -> DC::ActiveModel {
        let mut am = <DC::ActiveModel as ActiveModelTrait>::default();
        for column in ColumnOf::<DC>::iter() {
            if !DC::Entity::is_managed(&column) {
                am.set(column, payload.get(column));
            }
        }
        am
    }

    async fn check_duplicates(&self, txn: &DatabaseTransaction, payload: &DC::Model) -> Result<()> {
        for check in self.controller.duplicate_checks() {
            if check.is_taken(txn, payload).await? {
                return Err(Error::DuplicateKey {
                    kind:        Self::kind(),
                    code:        check.code,
                    description: check.description,
                });
            }
        }
        Ok(())
    }

    async fn check_usage(&self, txn: &DatabaseTransaction, id: i32) -> Result<()> {
        let checks = self.active_usage_checks();
        if let Some(check) = first_usage(&checks, |check| check.count(txn, id)).await? {
            return Err(Error::UsageConflict {
                kind: Self::kind(),
                id,
                code: check.code,
                description: check.description,
            });
        }
        Ok(())
    }

    async fn add_in(&self, txn: &DatabaseTransaction, mut payload: DC::Model, actor: i32) -> Result<DC::Model> {
        payload.clear_identity();
        self.check_duplicates(txn, &payload).await?;
        self.controller.validate(txn, &payload).await?;

        let version = self.store.versions().next();
        let mut am = self.payload_fields(&payload);
        am.set(DC::Entity::deleted_column(), false.into());
        am.set(DC::Entity::version_column(), version.into());
        am.set(DC::Entity::created_at_column(), version.into());
        am.set(DC::Entity::created_by_column(), actor.into());
        am.set(DC::Entity::modified_by_column(), actor.into());
        Ok(am.insert(txn).await?)
    }

    async fn edit_in(&self, txn: &DatabaseTransaction, payload: &DC::Model, actor: i32) -> Result<i64> {
        self.check_duplicates(txn, payload).await?;
        self.controller.validate(txn, payload).await?;

        let expected = Expected::new(payload.id(), payload.version());
        let new_version = self.store.versions().next_after(expected.version);
        cas_update::<DC::Entity, _, _>(txn, expected, self.payload_fields(payload), actor, new_version).await
    }

    async fn delete_in(&self, txn: &DatabaseTransaction, expected: Expected, actor: i32) -> Result<i64> {
        self.check_usage(txn, expected.id).await?;

        let new_version = self.store.versions().next_after(expected.version);
        cas_soft_delete::<DC::Entity, _>(txn, expected, actor, new_version).await
    }

    /// Run a mutation, then drop the cache entries of `ids`. Invalidation happens only after the mutation has
    /// finished, on success and failure alike; dropping an entry of an unchanged record costs one reload at most.
    async fn invalidating<T, I, F>(&self, ids: I, mutation: F) -> Result<T>
    where
        I: IntoIterator<Item = i32>,
        F: Future<Output = Result<T>>,
    {
        let outcome = mutation.await;

        let mut failure = None;
        for id in ids {
            if let Err(err) = self.store.invalidate(CacheKey::new(Self::kind(), id)).await {
                tracing::error!(kind = %Self::kind(), id, "cache invalidation failed: {err}");
                failure.get_or_insert(err);
            }
        }

        match (outcome, failure) {
            (Ok(_), Some(err)) => Err(err),
            (outcome, _) => outcome,
        }
    }

    fn report<T>(&self, op: &'static str, id: i32, outcome: &Result<T>) {
        match outcome {
            Ok(_) => tracing::debug!(kind = %Self::kind(), id, op, "done"),
            Err(err) if err.is_internal() => tracing::error!(kind = %Self::kind(), id, op, "{err}"),
            Err(err) => tracing::info!(kind = %Self::kind(), id, op, code = err.code(), "{err}"),
        }
    }
}

/// Type-erased registry operations with JSON payloads, for transports and tools that pick the entity at runtime.
#[async_trait]
pub trait RegistryOps: Send + Sync {
    fn entity_kind(&self) -> EntityKind;
    async fn list_json(&self) -> Result<serde_json::Value>;
    async fn get_json(&self, id: i32) -> Result<serde_json::Value>;
    async fn add_json(&self, payload: serde_json::Value, actor: i32) -> Result<serde_json::Value>;
    async fn edit_json(&self, payload: serde_json::Value, actor: i32) -> Result<i64>;
    async fn delete_record(&self, id: i32, version: i64, actor: i32) -> Result<()>;
    async fn batch_delete_records(&self, items: Vec<Expected>, actor: i32) -> Result<()>;
    async fn delta_json(&self, watermark: i64) -> Result<serde_json::Value>;
}

#[async_trait]
impl<DC> RegistryOps for Registry<DC>
where
    DC: DataController,
{
    fn entity_kind(&self) -> EntityKind {
        Self::kind()
    }

    async fn list_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.list().await?)?)
    }

    async fn get_json(&self, id: i32) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.get_by_id(id).await?)?)
    }

    async fn add_json(&self, payload: serde_json::Value, actor: i32) -> Result<serde_json::Value> {
        let payload: DC::Model = serde_json::from_value(payload)?;
        Ok(serde_json::to_value(self.add(payload, actor).await?)?)
    }

    async fn edit_json(&self, payload: serde_json::Value, actor: i32) -> Result<i64> {
        let payload: DC::Model = serde_json::from_value(payload)?;
        self.edit(payload, actor).await
    }

    async fn delete_record(&self, id: i32, version: i64, actor: i32) -> Result<()> {
        self.delete(id, version, actor).await
    }

    async fn batch_delete_records(&self, items: Vec<Expected>, actor: i32) -> Result<()> {
        self.batch_delete(&items, actor).await
    }

    async fn delta_json(&self, watermark: i64) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.get_delta(watermark).await?)?)
    }
}
