use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Result;
use crate::store::Store;
use crate::traits::DataController;
use crate::traits::Referable;
use crate::types::Detail;
use crate::types::EntityKind;
use crate::types::Reference;
use crate::usage::DuplicateCheck;
use crate::usage::UsageCheck;
use crate::versioned_entity;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "departments")]
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
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

versioned_entity!(EntityKind::Department);

impl Referable for Model {
    fn reference(&self) -> Reference {
        Reference {
            id:   self.id,
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}

pub type DepartmentDetail = Detail<Model>;

#[derive(Debug, Default, Clone, Copy)]
pub struct Manager;

#[async_trait]
impl DataController for Manager {
    type ActiveModel = ActiveModel;
    type Detail = DepartmentDetail;
    type Entity = Entity;
    type Model = Model;

    fn usage_checks(&self) -> Vec<UsageCheck> {
        vec![UsageCheck::new(
            "department.used_by_site",
            "owns a construction site",
            "construction_sites",
            "department_id",
        )]
    }

    fn duplicate_checks(&self) -> Vec<DuplicateCheck<Entity>> {
        vec![DuplicateCheck::new(Column::Code, "department.duplicate_code", "department code")]
    }

    fn code_column(&self) -> Option<Column> {
        Some(Column::Code)
    }

    async fn hydrate(&self, store: &Store, model: Model) -> Result<DepartmentDetail> {
        Ok(Detail {
            audit:  store.audit(&model).await?,
            refs:   Default::default(),
            record: model,
        })
    }
}
