use sea_orm_migration::prelude::*;

use super::create_version_index;
use super::versioned_table;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "site_category_migration"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // parent_id is 0 for roots, hence no foreign key.
        manager
            .create_table(
                versioned_table(SiteCategories::Table)
                    .col(ColumnDef::new(SiteCategories::Code).string().not_null())
                    .col(ColumnDef::new(SiteCategories::Name).string().not_null())
                    .col(ColumnDef::new(SiteCategories::ParentId).integer().not_null().default(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-site_categories-parent_id")
                    .table(SiteCategories::Table)
                    .col(SiteCategories::ParentId)
                    .to_owned(),
            )
            .await?;

        create_version_index(manager, SiteCategories::Table, "site_categories").await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SiteCategories::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
pub enum SiteCategories {
    Table,
    Code,
    Name,
    ParentId,
}
