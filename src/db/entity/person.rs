use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Result;
use crate::store::Store;
use crate::traits::DataController;
use crate::traits::PersonResolver;
use crate::traits::Referable;
use crate::types::Detail;
use crate::types::EntityKind;
use crate::types::Reference;
use crate::usage::DuplicateCheck;
use crate::usage::UsageCheck;
use crate::versioned_entity;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "persons")]
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
    /// Staff number.
    pub code:        String,
    pub name:        String,
    pub phone:       Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

versioned_entity!(EntityKind::Person);

impl Referable for Model {
    fn reference(&self) -> Reference {
        Reference {
            id:   self.id,
            code: self.code.clone(),
            name: self.name.clone(),
        }
    }
}

pub type PersonDetail = Detail<Model>;

#[derive(Debug, Default, Clone, Copy)]
pub struct Manager;

#[async_trait]
impl DataController for Manager {
    type ActiveModel = ActiveModel;
    type Detail = PersonDetail;
    type Entity = Entity;
    type Model = Model;

    fn usage_checks(&self) -> Vec<UsageCheck> {
        vec![
            UsageCheck::new(
                "person.site_responsible",
                "responsible for a construction site",
                "construction_sites",
                "responsible_id",
            ),
            UsageCheck::new(
                "person.project_manager",
                "manages an execution project",
                "execution_projects",
                "manager_id",
            ),
            UsageCheck::new("person.ppe_recipient", "received PPE", "ppe_issues", "person_id"),
        ]
    }

    fn duplicate_checks(&self) -> Vec<DuplicateCheck<Entity>> {
        vec![DuplicateCheck::new(Column::Code, "person.duplicate_code", "staff number")]
    }

    fn code_column(&self) -> Option<Column> {
        Some(Column::Code)
    }

    async fn hydrate(&self, store: &Store, model: Model) -> Result<PersonDetail> {
        Ok(Detail {
            audit:  store.audit(&model).await?,
            refs:   Default::default(),
            record: model,
        })
    }
}

#[async_trait]
impl PersonResolver for Store {
    async fn resolve_person(&self, id: i32) -> Result<Option<Reference>> {
        self.reference::<Entity>(id).await
    }
}
