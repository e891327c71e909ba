use sea_orm_migration::prelude::*;

use super::create_version_index;
use super::versioned_table;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "department_migration"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                versioned_table(Departments::Table)
                    .col(ColumnDef::new(Departments::Code).string().not_null())
                    .col(ColumnDef::new(Departments::Name).string().not_null())
                    .to_owned(),
            )
            .await?;

        create_version_index(manager, Departments::Table, "departments").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Departments::Table).to_owned()).await
    }
}

#[derive(Iden, Clone, Copy)]
pub enum Departments {
    Table,
    Code,
    Name,
}
