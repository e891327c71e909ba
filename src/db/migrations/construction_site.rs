use sea_orm_migration::prelude::*;

use super::create_version_index;
use super::versioned_table;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "construction_site_migration"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                versioned_table(ConstructionSites::Table)
                    .col(ColumnDef::new(ConstructionSites::Code).string().not_null())
                    .col(ColumnDef::new(ConstructionSites::Name).string().not_null())
                    .col(ColumnDef::new(ConstructionSites::Address).string().null())
                    .col(ColumnDef::new(ConstructionSites::CategoryId).integer().not_null())
                    .col(ColumnDef::new(ConstructionSites::DepartmentId).integer().not_null())
                    .col(ColumnDef::new(ConstructionSites::ResponsibleId).integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Usage checks of the referenced entities count by these columns.
        for (name, column) in [
            ("idx-construction_sites-category_id", ConstructionSites::CategoryId),
            ("idx-construction_sites-department_id", ConstructionSites::DepartmentId),
            ("idx-construction_sites-responsible_id", ConstructionSites::ResponsibleId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(ConstructionSites::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        create_version_index(manager, ConstructionSites::Table, "construction_sites").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConstructionSites::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
pub enum ConstructionSites {
    Table,
    Code,
    Name,
    Address,
    CategoryId,
    DepartmentId,
    ResponsibleId,
}
