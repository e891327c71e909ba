use sea_orm_migration::prelude::*;

use super::create_version_index;
use super::versioned_table;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "ppe_issue_migration"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                versioned_table(PpeIssues::Table)
                    .col(ColumnDef::new(PpeIssues::VoucherNo).string().not_null())
                    .col(ColumnDef::new(PpeIssues::SiteId).integer().not_null())
                    .col(ColumnDef::new(PpeIssues::PersonId).integer().not_null())
                    .col(ColumnDef::new(PpeIssues::Item).string().not_null())
                    .col(ColumnDef::new(PpeIssues::Quantity).integer().not_null())
                    .col(ColumnDef::new(PpeIssues::IssuedAt).date().not_null())
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx-ppe_issues-site_id", PpeIssues::SiteId),
            ("idx-ppe_issues-person_id", PpeIssues::PersonId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(PpeIssues::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        create_version_index(manager, PpeIssues::Table, "ppe_issues").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(PpeIssues::Table).to_owned()).await
    }
}

#[derive(Iden, Clone, Copy)]
pub enum PpeIssues {
    Table,
    VoucherNo,
    SiteId,
    PersonId,
    Item,
    Quantity,
    IssuedAt,
}
