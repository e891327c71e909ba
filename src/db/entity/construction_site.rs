use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use serde::Deserialize;
use serde::Serialize;

use super::department;
use super::person;
use super::site_category;
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
#[sea_orm(table_name = "construction_sites")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(default)]
    pub id:             i32,
    #[serde(default)]
    pub deleted:        bool,
    #[serde(default)]
    pub version:        i64,
    #[serde(default)]
    pub created_at:     i64,
    #[serde(default)]
    pub created_by:     i32,
    #[serde(default)]
    pub modified_by:    i32,
    pub code:           String,
    pub name:           String,
    pub address:        Option<String>,
    pub category_id:    i32,
    pub department_id:  i32,
    /// The person accountable for safety on the site.
    pub responsible_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::site_category::Entity",
        from = "Column::CategoryId",
        to = "super::site_category::Column::Id"
    )]
    Category,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DepartmentId",
        to = "super::department::Column::Id"
    )]
    Department,
    #[sea_orm(
        belongs_to = "super::person::Entity",
        from = "Column::ResponsibleId",
        to = "super::person::Column::Id"
    )]
    Responsible,
}

impl ActiveModelBehavior for ActiveModel {}

versioned_entity!(EntityKind::ConstructionSite);

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
pub struct SiteRefs {
    pub category:    Option<Reference>,
    pub department:  Option<Reference>,
    pub responsible: Option<Reference>,
}

pub type SiteDetail = Detail<Model, SiteRefs>;

#[derive(Debug, Default, Clone, Copy)]
pub struct Manager;

#[async_trait]
impl DataController for Manager {
    type ActiveModel = ActiveModel;
    type Detail = SiteDetail;
    type Entity = Entity;
    type Model = Model;

    fn usage_checks(&self) -> Vec<UsageCheck> {
        vec![
            UsageCheck::new(
                "construction_site.has_projects",
                "has execution projects",
                "execution_projects",
                "site_id",
            ),
            UsageCheck::new("construction_site.has_ppe_issues", "has PPE issues", "ppe_issues", "site_id"),
        ]
    }

    fn duplicate_checks(&self) -> Vec<DuplicateCheck<Entity>> {
        vec![DuplicateCheck::new(Column::Code, "construction_site.duplicate_code", "site code")]
    }

    fn code_column(&self) -> Option<Column> {
        Some(Column::Code)
    }

    async fn hydrate(&self, store: &Store, model: Model) -> Result<SiteDetail> {
        Ok(Detail {
            audit:  store.audit(&model).await?,
            refs:   SiteRefs {
                category:    store.reference::<site_category::Entity>(model.category_id).await?,
                department:  store.reference::<department::Entity>(model.department_id).await?,
                responsible: store.reference::<person::Entity>(model.responsible_id).await?,
            },
            record: model,
        })
    }
}
