use async_trait::async_trait;
use sea_orm::ActiveModelBehavior;
use sea_orm::ActiveModelTrait;
use sea_orm::DatabaseTransaction;
use sea_orm::EntityTrait;
use sea_orm::FromQueryResult;
use sea_orm::IntoActiveModel;
use sea_orm::ModelTrait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

use crate::error::Result;
use crate::store::Store;
use crate::types::EntityKind;
use crate::types::Reference;
use crate::usage::DuplicateCheck;
use crate::usage::UsageCheck;

/// Row-level accessors of the columns every persisted record carries.
pub trait VersionedModel: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// 0 means "not yet persisted".
    fn id(&self) -> i32;
    fn is_deleted(&self) -> bool;
    fn version(&self) -> i64;
    fn created_at(&self) -> i64;
    fn created_by(&self) -> i32;
    fn modified_by(&self) -> i32;
    /// Forget the storage identity so the record can be inserted anew.
    fn clear_identity(&mut self);
}

/// Column handles of the versioning columns. Implemented with [`versioned_entity!`](crate::versioned_entity).
pub trait VersionedEntity: EntityTrait {
    const KIND: EntityKind;

    fn id_column() -> Self::Column;
    fn deleted_column() -> Self::Column;
    fn version_column() -> Self::Column;
    fn created_at_column() -> Self::Column;
    fn created_by_column() -> Self::Column;
    fn modified_by_column() -> Self::Column;

    /// Columns maintained by the registry itself and never taken from a caller's payload.
    fn is_managed(column: &Self::Column) -> bool;
}

/// Records which can be shown as a short reference inside other records' details.
pub trait Referable {
    fn reference(&self) -> Reference;
}

/// Display attributes of the people recorded as creators and modifiers.
#[async_trait]
pub trait PersonResolver: Send + Sync {
    async fn resolve_person(&self, id: i32) -> Result<Option<Reference>>;
}

/// Schema description of one entity type: everything that makes its CRUD flow different from the others.
///
/// The generic list/get/add/edit/delete/delta algorithms live in [`Registry`](crate::registry::Registry).
#[async_trait]
pub trait DataController: Debug + Send + Sync + 'static {
    type Entity: VersionedEntity<Model = Self::Model, ActiveModel = Self::ActiveModel>;
    type Model: VersionedModel + ModelTrait<Entity = Self::Entity> + FromQueryResult + IntoActiveModel<Self::ActiveModel>;
    type ActiveModel: ActiveModelTrait<Entity = Self::Entity> + ActiveModelBehavior + Send + Sync + 'static;
    type Detail: Serialize + Debug + Clone + Send + Sync + 'static;

    /// Checks evaluated, in order, before a record may be deleted.
    fn usage_checks(&self) -> Vec<UsageCheck> {
        Vec::new()
    }

    /// Uniqueness constraints among live records.
    fn duplicate_checks(&self) -> Vec<DuplicateCheck<Self::Entity>> {
        Vec::new()
    }

    /// Column holding the business code, if the entity has one.
    fn code_column(&self) -> Option<<Self::Entity as EntityTrait>::Column> {
        None
    }

    /// Entity-specific validation of a payload about to be written. Runs inside the write transaction, before any
    /// mutating statement.
    async fn validate(&self, _txn: &DatabaseTransaction, _model: &Self::Model) -> Result<()> {
        Ok(())
    }

    /// Build the caller-facing detail of a row, resolving foreign references.
    async fn hydrate(&self, store: &Store, model: Self::Model) -> Result<Self::Detail>;
}

/// Implement [`VersionedModel`] and [`VersionedEntity`] for the sea-orm entity declared in the calling module.
///
/// The module must declare `id`, `deleted`, `version`, `created_at`, `created_by` and `modified_by` fields on its
/// `Model`.
#[macro_export]
macro_rules! versioned_entity {
    ($kind:expr) => {
        impl $crate::traits::VersionedModel for Model {
            fn id(&self) -> i32 {
                self.id
            }

            fn is_deleted(&self) -> bool {
                self.deleted
            }

            fn version(&self) -> i64 {
                self.version
            }

            fn created_at(&self) -> i64 {
                self.created_at
            }

            fn created_by(&self) -> i32 {
                self.created_by
            }

            fn modified_by(&self) -> i32 {
                self.modified_by
            }

            fn clear_identity(&mut self) {
                self.id = 0;
            }
        }

        impl $crate::traits::VersionedEntity for Entity {
            const KIND: $crate::types::EntityKind = $kind;

            fn id_column() -> Column {
                Column::Id
            }

            fn deleted_column() -> Column {
                Column::Deleted
            }

            fn version_column() -> Column {
                Column::Version
            }

            fn created_at_column() -> Column {
                Column::CreatedAt
            }

            fn created_by_column() -> Column {
                Column::CreatedBy
            }

            fn modified_by_column() -> Column {
                Column::ModifiedBy
            }

            fn is_managed(column: &Column) -> bool {
                matches!(
                    column,
                    Column::Id
                        | Column::Deleted
                        | Column::Version
                        | Column::CreatedAt
                        | Column::CreatedBy
                        | Column::ModifiedBy
                )
            }
        }
    };
}
