use sea_orm::DbErr;
use thiserror::Error;

use crate::types::EntityKind;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Outcome taxonomy of every registry operation.
///
/// Only [`Error::Db`], [`Error::Cache`] and [`Error::Serialization`] are internal faults. Everything else is an
/// expected, caller-actionable outcome of concurrent use and is returned as a plain value.
#[derive(Debug, Error)]
pub enum Error {
    #[error("storage failure: {0}")]
    Db(#[from] DbErr),

    #[error("cache backend failure: {0}")]
    Cache(String),

    #[error("snapshot (de)serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} #{id} was changed or deleted by someone else")]
    OtherEditConflict { kind: EntityKind, id: i32 },

    #[error("{kind} #{id} cannot be deleted: {description}")]
    UsageConflict {
        kind:        EntityKind,
        id:          i32,
        code:        &'static str,
        description: &'static str,
    },

    #[error("{kind}: {description} is already taken")]
    DuplicateKey {
        kind:        EntityKind,
        code:        &'static str,
        description: &'static str,
    },

    #[error("{kind} #{id} cannot be moved under #{parent_id}: it is one of its descendants")]
    CycleConflict { kind: EntityKind, id: i32, parent_id: i32 },

    #[error("{kind} #{id} cannot be its own parent")]
    SelfParentConflict { kind: EntityKind, id: i32 },

    #[error("{kind} #{id} not found")]
    NotFound { kind: EntityKind, id: i32 },

    #[error("{kind} #{id} has been deleted")]
    DataDeleted { kind: EntityKind, id: i32 },

    #[error("batch aborted at record {index} (#{id}): {source}")]
    Batch {
        index:  usize,
        id:     i32,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Stable machine-readable code. Usage and duplicate conflicts report the code of the specific check.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Db(_) | Self::Cache(_) | Self::Serialization(_) => "internal_error",
            Self::OtherEditConflict { .. } => "other_edit_conflict",
            Self::UsageConflict { code, .. } | Self::DuplicateKey { code, .. } => *code,
            Self::CycleConflict { .. } => "cycle_conflict",
            Self::SelfParentConflict { .. } => "self_parent_conflict",
            Self::NotFound { .. } => "not_found",
            Self::DataDeleted { .. } => "data_deleted",
            Self::Batch { source, .. } => source.code(),
        }
    }

    pub fn is_internal(&self) -> bool {
        match self {
            Self::Db(_) | Self::Cache(_) | Self::Serialization(_) => true,
            Self::Batch { source, .. } => source.is_internal(),
            _ => false,
        }
    }

    pub fn is_conflict(&self) -> bool {
        !self.is_internal()
    }

    /// Wrap the error with the position of the failing record within a batch.
    pub(crate) fn in_batch(self, index: usize, id: i32) -> Self {
        Self::Batch {
            index,
            id,
            source: Box::new(self),
        }
    }
}
