use sea_orm_migration::prelude::*;

use super::create_version_index;
use super::versioned_table;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "person_migration"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                versioned_table(Persons::Table)
                    .col(ColumnDef::new(Persons::Code).string().not_null())
                    .col(ColumnDef::new(Persons::Name).string().not_null())
                    .col(ColumnDef::new(Persons::Phone).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-persons-code")
                    .table(Persons::Table)
                    .col(Persons::Code)
                    .to_owned(),
            )
            .await?;

        create_version_index(manager, Persons::Table, "persons").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Persons::Table).to_owned()).await
    }
}

#[derive(Iden, Clone, Copy)]
pub enum Persons {
    Table,
    Code,
    Name,
    Phone,
}
