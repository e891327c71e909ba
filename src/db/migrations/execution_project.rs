use sea_orm_migration::prelude::*;

use super::create_version_index;
use super::versioned_table;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "execution_project_migration"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                versioned_table(ExecutionProjects::Table)
                    .col(ColumnDef::new(ExecutionProjects::Code).string().not_null())
                    .col(ColumnDef::new(ExecutionProjects::Name).string().not_null())
                    .col(ColumnDef::new(ExecutionProjects::SiteId).integer().not_null())
                    .col(ColumnDef::new(ExecutionProjects::ManagerId).integer().not_null())
                    .col(ColumnDef::new(ExecutionProjects::StartsOn).date().null())
                    .col(ColumnDef::new(ExecutionProjects::EndsOn).date().null())
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx-execution_projects-site_id", ExecutionProjects::SiteId),
            ("idx-execution_projects-manager_id", ExecutionProjects::ManagerId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(ExecutionProjects::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        create_version_index(manager, ExecutionProjects::Table, "execution_projects").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ExecutionProjects::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
pub enum ExecutionProjects {
    Table,
    Code,
    Name,
    SiteId,
    ManagerId,
    StartsOn,
    EndsOn,
}
