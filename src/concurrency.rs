//! Optimistic concurrency control.
//!
//! Every mutation is a single conditional statement guarded by `id = ? AND version = ? AND deleted = false`. The
//! version the caller last observed is the compare-and-swap token: if anything changed the row in between (an edit,
//! a delete) or the row does not exist, no row matches and the caller gets [`Error::OtherEditConflict`]. There is no
//! retry and no merge; the loser re-reads and resubmits.
use sea_orm::sea_query::Expr;
use sea_orm::ActiveModelTrait;
use sea_orm::ColumnTrait;
use sea_orm::ConnectionTrait;
use sea_orm::EntityTrait;
use sea_orm::QueryFilter;
use sea_orm::UpdateMany;
use tracing::instrument;

use crate::error::Error;
use crate::error::Result;
use crate::traits::VersionedEntity;

/// Identifies the row state a caller wants to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expected {
    pub id:      i32,
    pub version: i64,
}

impl Expected {
    pub fn new(id: i32, version: i64) -> Self {
        Self { id, version }
    }
}

fn guarded<E: VersionedEntity>(expected: Expected) -> UpdateMany<E> {
    E::update_many()
        .filter(E::id_column().eq(expected.id))
        .filter(E::version_column().eq(expected.version))
        .filter(E::deleted_column().eq(false))
}

async fn swap<E, C>(conn: &C, expected: Expected, update: UpdateMany<E>, new_version: i64) -> Result<i64>
where
    E: VersionedEntity,
    C: ConnectionTrait,
{
    let affected = update.exec(conn).await?.rows_affected;
    match affected {
        0 => Err(Error::OtherEditConflict {
            kind: E::KIND,
            id:   expected.id,
        }),
        1 => Ok(new_version),
        n => Err(Error::Db(sea_orm::DbErr::Custom(format!(
            "{} #{}: conditional write matched {n} rows",
            E::KIND,
            expected.id
        )))),
    }
}

/// Write the `Set` fields of `changes` and move the row to `new_version`.
#[instrument(level = "trace", skip(conn, changes), fields(kind = %E::KIND))]
pub async fn cas_update<E, A, C>(
    conn: &C,
    expected: Expected,
    changes: A,
    actor: i32,
    new_version: i64,
) -> Result<i64>
where
    E: VersionedEntity,
    A: ActiveModelTrait<Entity = E> + Send,
    C: ConnectionTrait,
{
    let update = guarded::<E>(expected)
        .set(changes)
        .col_expr(E::version_column(), Expr::value(new_version))
        .col_expr(E::modified_by_column(), Expr::value(actor));
    swap(conn, expected, update, new_version).await
}

/// Flag the row as deleted and move it to `new_version`. The row is never removed.
#[instrument(level = "trace", skip(conn), fields(kind = %E::KIND))]
pub async fn cas_soft_delete<E, C>(conn: &C, expected: Expected, actor: i32, new_version: i64) -> Result<i64>
where
    E: VersionedEntity,
    C: ConnectionTrait,
{
    let update = guarded::<E>(expected)
        .col_expr(E::deleted_column(), Expr::value(true))
        .col_expr(E::version_column(), Expr::value(new_version))
        .col_expr(E::modified_by_column(), Expr::value(actor));
    swap(conn, expected, update, new_version).await
}
