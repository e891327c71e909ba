//! Pre-write integrity checks: "is this record still referenced?" before a delete, and "is this key already taken?"
//! before an insert or update.
use sea_orm::sea_query::Alias;
use sea_orm::sea_query::Asterisk;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::Query;
use sea_orm::ColumnTrait;
use sea_orm::ConnectionTrait;
use sea_orm::EntityTrait;
use sea_orm::ModelTrait;
use sea_orm::PaginatorTrait;
use sea_orm::QueryFilter;
use std::future::Future;
use tracing::instrument;

use crate::error::Result;
use crate::traits::VersionedEntity;

/// One "is this id referenced from `table.column`" predicate. Only live (not soft-deleted) referencing rows count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageCheck {
    pub description: &'static str,
    /// Conflict code reported when this check blocks a delete.
    pub code:        &'static str,
    pub table:       &'static str,
    pub column:      &'static str,
}

impl UsageCheck {
    pub const fn new(code: &'static str, description: &'static str, table: &'static str, column: &'static str) -> Self {
        Self {
            description,
            code,
            table,
            column,
        }
    }

    /// Number of live rows referencing `id`.
    #[instrument(level = "trace", skip(self, conn), fields(code = self.code))]
    pub async fn count<C: ConnectionTrait>(&self, conn: &C, id: i32) -> Result<u64> {
        let query = Query::select()
            .expr(Expr::col(Asterisk).count())
            .from(Alias::new(self.table))
            .and_where(Expr::col(Alias::new(self.column)).eq(id))
            .and_where(Expr::col(Alias::new("deleted")).eq(false))
            .to_owned();
        let backend = conn.get_database_backend();
        let count = match conn.query_one(backend.build(&query)).await? {
            Some(row) => row.try_get_by_index::<i64>(0)?,
            None => 0,
        };
        Ok(count.max(0) as u64)
    }
}

/// Evaluate `checks` in order and return the first one whose count is non-zero. Checks after the first match are
/// not evaluated.
pub async fn first_usage<'a, F, Fut>(checks: &'a [UsageCheck], mut count: F) -> Result<Option<&'a UsageCheck>>
where
    F: FnMut(&'a UsageCheck) -> Fut,
    Fut: Future<Output = Result<u64>>,
{
    for check in checks {
        if count(check).await? > 0 {
            return Ok(Some(check));
        }
    }
    Ok(None)
}

/// A column whose value must be unique among live records of an entity.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateCheck<E: EntityTrait> {
    pub column:      E::Column,
    pub code:        &'static str,
    pub description: &'static str,
}

impl<E> DuplicateCheck<E>
where
    E: VersionedEntity,
    E::Model: Sync,
{
    pub fn new(column: E::Column, code: &'static str, description: &'static str) -> Self {
        Self {
            column,
            code,
            description,
        }
    }

    /// Is the value `model` carries in this column already used by another live record?
    pub async fn is_taken<C: ConnectionTrait>(&self, conn: &C, model: &E::Model) -> Result<bool> {
        let taken = E::find()
            .filter(self.column.eq(model.get(self.column)))
            .filter(E::deleted_column().eq(false))
            .filter(E::id_column().ne(model_id::<E>(model)))
            .count(conn)
            .await?;
        Ok(taken > 0)
    }
}

fn model_id<E: VersionedEntity>(model: &E::Model) -> sea_orm::Value {
    model.get(E::id_column())
}
