use serde::Deserialize;
use serde::Serialize;

/// Every kind of record the registry manages. The string form doubles as the cache key prefix.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    Person,
    Department,
    SiteCategory,
    ConstructionSite,
    ExecutionProject,
    PpeIssue,
}

/// Display snapshot of a foreign record embedded into a detail view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub id:   i32,
    pub code: String,
    pub name: String,
}

/// Resolved creator/modifier of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit {
    pub created_by:  Option<Reference>,
    pub modified_by: Option<Reference>,
}

/// A fully hydrated record: its own row plus resolved foreign references.
#[derive(Debug, Clone, Serialize)]
pub struct Detail<M, R = NoRefs> {
    #[serde(flatten)]
    pub record: M,
    #[serde(flatten)]
    pub refs:   R,
    /// Kept apart from the row, which carries the raw `created_by`/`modified_by` ids.
    pub audit:  Audit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NoRefs {}

/// Where a changed record lands relative to a client watermark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaPartition {
    New,
    Updated,
    Deleted,
    /// Created and deleted within the same window; the client never saw it.
    Skip,
}

/// Changes since a client watermark.
#[derive(Debug, Clone, Serialize)]
pub struct Delta<T> {
    pub new_items:     Vec<T>,
    pub updated_items: Vec<T>,
    pub deleted_items: Vec<T>,
    /// The next watermark for the client.
    pub result_ts:     i64,
}

impl<T> Delta<T> {
    pub fn empty(watermark: i64) -> Self {
        Self {
            new_items:     Vec::new(),
            updated_items: Vec::new(),
            deleted_items: Vec::new(),
            result_ts:     watermark,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.new_items.is_empty() && self.updated_items.is_empty() && self.deleted_items.is_empty()
    }

    pub(crate) fn push(&mut self, partition: DeltaPartition, item: T) {
        match partition {
            DeltaPartition::New => self.new_items.push(item),
            DeltaPartition::Updated => self.updated_items.push(item),
            DeltaPartition::Deleted => self.deleted_items.push(item),
            DeltaPartition::Skip => (),
        }
    }
}

/// A vertex of a tree-shaped master data set. `parent_id == 0` marks a root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub id:        i32,
    pub parent_id: i32,
}
