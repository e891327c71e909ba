//! Vouchers of personal protective equipment handed out on a site. Nothing references a voucher, so it can always
//! be deleted.
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
#[sea_orm(table_name = "ppe_issues")]
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
    pub voucher_no:  String,
    pub site_id:     i32,
    pub person_id:   i32,
    pub item:        String,
    pub quantity:    i32,
    pub issued_at:   Date,
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
        from = "Column::PersonId",
        to = "super::person::Column::Id"
    )]
    Person,
}

impl ActiveModelBehavior for ActiveModel {}

versioned_entity!(EntityKind::PpeIssue);

impl Referable for Model {
    fn reference(&self) -> Reference {
        Reference {
            id:   self.id,
            code: self.voucher_no.clone(),
            name: self.item.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IssueRefs {
    pub site:   Option<Reference>,
    pub person: Option<Reference>,
}

pub type IssueDetail = Detail<Model, IssueRefs>;

#[derive(Debug, Default, Clone, Copy)]
pub struct Manager;

#[async_trait]
impl DataController for Manager {
    type ActiveModel = ActiveModel;
    type Detail = IssueDetail;
    type Entity = Entity;
    type Model = Model;

    fn duplicate_checks(&self) -> Vec<DuplicateCheck<Entity>> {
        vec![DuplicateCheck::new(Column::VoucherNo, "ppe_issue.duplicate_voucher", "voucher number")]
    }

    fn code_column(&self) -> Option<Column> {
        Some(Column::VoucherNo)
    }

    async fn hydrate(&self, store: &Store, model: Model) -> Result<IssueDetail> {
        Ok(Detail {
            audit:  store.audit(&model).await?,
            refs:   IssueRefs {
                site:   store.reference::<construction_site::Entity>(model.site_id).await?,
                person: store.reference::<person::Entity>(model.person_id).await?,
            },
            record: model,
        })
    }
}
