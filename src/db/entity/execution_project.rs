use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use serde::Deserialize;
use serde::Serialize;

use super::construction_site;
use super::person;
use crate::error::Result;
use crate::store::Store;
use crate::traits::DataController;
use crate::traits::Referable;
use crate::types::Detail;
use crate::types::EntityKind;
use crate::types::Reference;
use crate::usage::DuplicateCheck;
use crate::versioned_entity;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "execution_projects")]
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
    pub site_id:     i32,
    pub manager_id:  i32,
    pub starts_on:   Option<Date>,
    pub ends_on:     Option<Date>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::construction_site::Entity",
        from = "Column::SiteId",
        to = "super::construction_site::Column::Id"
    )]
    Site,
    #[sea_orm(
        belongs_to = "super::person::Entity",
        from = "Column::ManagerId",
        to = "super::person::Column::Id"
    )]
    Manager,
}

impl ActiveModelBehavior for ActiveModel {}

versioned_entity!(EntityKind::ExecutionProject);

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
pub struct ProjectRefs {
    pub site:    Option<Reference>,
    pub manager: Option<Reference>,
}

pub type ProjectDetail = Detail<Model, ProjectRefs>;

#[derive(Debug, Default, Clone, Copy)]
pub struct Manager;

#[async_trait]
impl DataController for Manager {
    type ActiveModel = ActiveModel;
    type Detail = ProjectDetail;
    type Entity = Entity;
    type Model = Model;

    fn duplicate_checks(&self) -> Vec<DuplicateCheck<Entity>> {
        vec![DuplicateCheck::new(Column::Code, "execution_project.duplicate_code", "project code")]
    }

    fn code_column(&self) -> Option<Column> {
        Some(Column::Code)
    }

    async fn hydrate(&self, store: &Store, model: Model) -> Result<ProjectDetail> {
        Ok(Detail {
            audit:  store.audit(&model).await?,
            refs:   ProjectRefs {
                site:    store.reference::<construction_site::Entity>(model.site_id).await?,
                manager: store.reference::<person::Entity>(model.manager_id).await?,
            },
            record: model,
        })
    }
}
