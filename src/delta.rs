//! Change feed for polling clients.
//!
//! A client holds a watermark (the `result_ts` of its previous poll) and asks for everything whose version moved
//! past it. Soft-deleted rows stay visible here, which is what lets a client learn about deletions at all.
use sea_orm::ColumnTrait;
use sea_orm::ConnectionTrait;
use sea_orm::EntityTrait;
use sea_orm::QueryFilter;
use sea_orm::QueryOrder;
use sea_orm::QuerySelect;
use tracing::instrument;

use crate::error::Result;
use crate::traits::VersionedEntity;
use crate::traits::VersionedModel;
use crate::types::DeltaPartition;

pub fn classify(watermark: i64, deleted: bool, created_at: i64) -> DeltaPartition {
    let existed_before = created_at <= watermark;
    match (deleted, existed_before) {
        (true, true) => DeltaPartition::Deleted,
        (true, false) => DeltaPartition::Skip,
        (false, true) => DeltaPartition::Updated,
        (false, false) => DeltaPartition::New,
    }
}

pub fn classify_model<M: VersionedModel>(watermark: i64, model: &M) -> DeltaPartition {
    classify(watermark, model.is_deleted(), model.created_at())
}

/// Rows changed after `watermark`, newest first, together with the highest version among them. `None` when nothing
/// changed.
///
/// The row query is capped by the maximum found first, so a write committed between the two queries is left for the
/// next poll instead of being returned under a watermark that would skip it.
#[instrument(level = "trace", skip(conn), fields(kind = %E::KIND))]
pub async fn fetch_changes<E, C>(conn: &C, watermark: i64) -> Result<Option<(i64, Vec<E::Model>)>>
where
    E: VersionedEntity,
    C: ConnectionTrait,
{
    let version = E::version_column();
    let max_version = E::find()
        .select_only()
        .column_as(version.max(), "max_version")
        .filter(version.gt(watermark))
        .into_tuple::<Option<i64>>()
        .one(conn)
        .await?
        .flatten();

    let Some(max_version) = max_version
    else {
        return Ok(None);
    };

    let rows = E::find()
        .filter(version.gt(watermark))
        .filter(version.lte(max_version))
        .order_by_desc(version)
        .all(conn)
        .await?;

    Ok(Some((max_version, rows)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partitions_against_watermark() {
        let watermark = 8;
        // Created at 10, never deleted.
        assert_eq!(classify(watermark, false, 10), DeltaPartition::New);
        // Created at 5, updated later.
        assert_eq!(classify(watermark, false, 5), DeltaPartition::Updated);
        // Created at 3, deleted later.
        assert_eq!(classify(watermark, true, 3), DeltaPartition::Deleted);
        // Created and deleted after the watermark.
        assert_eq!(classify(watermark, true, 9), DeltaPartition::Skip);
    }

    #[test]
    fn creation_at_watermark_counts_as_existing() {
        assert_eq!(classify(8, false, 8), DeltaPartition::Updated);
        assert_eq!(classify(8, true, 8), DeltaPartition::Deleted);
    }
}
