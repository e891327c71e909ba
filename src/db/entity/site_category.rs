use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::DatabaseTransaction;
use sea_orm::QuerySelect;
use serde::Deserialize;
use serde::Serialize;
use tracing::instrument;

use crate::error::Error;
use crate::error::Result;
use crate::hierarchy::descendants;
use crate::hierarchy::validate_reparent;
use crate::hierarchy::HierarchyConflict;
use crate::registry::Registry;
use crate::store::Store;
use crate::traits::DataController;
use crate::traits::Referable;
use crate::types::Detail;
use crate::types::EntityKind;
use crate::types::Node;
use crate::types::Reference;
use crate::usage::DuplicateCheck;
use crate::usage::UsageCheck;
use crate::versioned_entity;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "site_categories")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub id:          i32,
    #[serde(default)]
    pub deleted:     bool,
    #[serde(default)]
    pub version:     i64,
    #[serde(default)]
    pub created_at:  i64,
    #[serde(default)]
    pub created_by:  i32,
    #[serde(default)]
    pub modified_by: i32,
    pub code:        String,
    pub name:        String,
    /// 0 for a root category.
    #[serde(default)]
    pub parent_id:   i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

versioned_entity!(EntityKind::SiteCategory);

impl Referable for Model {
    fn reference(&self) -> Reference {
        Reference {
            id:   self.id,
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SiteCategoryRefs {
    pub parent: Option<Reference>,
}

pub type SiteCategoryDetail = Detail<Model, SiteCategoryRefs>;

// Every node, deleted ones included, as seen by the current transaction.
async fn snapshot<C: ConnectionTrait>(conn: &C) -> Result<Vec<Node>> {
    let rows: Vec<(i32, i32)> = Entity::find()
        .select_only()
        .column(Column::Id)
        .column(Column::ParentId)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(id, parent_id)| Node { id, parent_id })
        .collect())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Manager;

#[async_trait]
impl DataController for Manager {
    type ActiveModel = ActiveModel;
    type Detail = SiteCategoryDetail;
    type Entity = Entity;
    type Model = Model;

    fn usage_checks(&self) -> Vec<UsageCheck> {
        vec![
            UsageCheck::new(
                "site_category.has_children",
                "has subcategories",
                "site_categories",
                "parent_id",
            ),
            UsageCheck::new(
                "site_category.used_by_site",
                "classifies a construction site",
                "construction_sites",
                "category_id",
            ),
        ]
    }

    fn duplicate_checks(&self) -> Vec<DuplicateCheck<Entity>> {
        vec![DuplicateCheck::new(Column::Code, "site_category.duplicate_code", "category code")]
    }

    fn code_column(&self) -> Option<Column> {
        Some(Column::Code)
    }

    #[instrument(level = "trace", skip(self, txn, model), fields(id = model.id, parent_id = model.parent_id))]
    async fn validate(&self, txn: &DatabaseTransaction, model: &Model) -> Result<()> {
        if model.parent_id == 0 {
            return Ok(());
        }

        let parent_alive = Entity::find_by_id(model.parent_id)
            .one(txn)
            .await?
            .is_some_and(|parent| !parent.deleted);
        if !parent_alive {
            return Err(Error::NotFound {
                kind: EntityKind::SiteCategory,
                id:   model.parent_id,
            });
        }

        // A new record has no descendants, only an existing one can close a loop.
        if model.id == 0 {
            return Ok(());
        }

        let nodes = snapshot(txn).await?;
        validate_reparent(&nodes, model.id, model.parent_id).map_err(|conflict| match conflict {
            HierarchyConflict::SelfParent => Error::SelfParentConflict {
                kind: EntityKind::SiteCategory,
                id:   model.id,
            },
            HierarchyConflict::Cycle => Error::CycleConflict {
                kind:      EntityKind::SiteCategory,
                id:        model.id,
                parent_id: model.parent_id,
            },
        })
    }

    async fn hydrate(&self, store: &Store, model: Model) -> Result<SiteCategoryDetail> {
        Ok(Detail {
            audit:  store.audit(&model).await?,
            refs:   SiteCategoryRefs {
                parent: store.reference::<Entity>(model.parent_id).await?,
            },
            record: model,
        })
    }
}

impl Registry<Manager> {
    /// Ids of all live categories below `id`, at any depth, in ascending order.
    pub async fn subtree(&self, id: i32) -> Result<Vec<i32>> {
        self.get_row(id).await?;

        // A live category never hangs below a deleted one: deleting a parent with live children is refused.
        let rows: Vec<(i32, i32)> = Entity::find()
            .select_only()
            .column(Column::Id)
            .column(Column::ParentId)
            .filter(Column::Deleted.eq(false))
            .into_tuple()
            .all(self.store().db())
            .await?;
        let live = rows
            .into_iter()
            .map(|(id, parent_id)| Node { id, parent_id })
            .collect::<Vec<_>>();

        let mut ids = descendants(&live, id).into_iter().collect::<Vec<_>>();
        ids.sort_unstable();
        Ok(ids)
    }
}
