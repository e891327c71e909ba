pub mod construction_site;
pub mod department;
pub mod execution_project;
pub mod person;
pub mod ppe_issue;
pub mod site_category;

use sea_orm_migration::prelude::*;

pub struct Migrator;

impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(person::Migration),
            Box::new(department::Migration),
            Box::new(site_category::Migration),
            Box::new(construction_site::Migration),
            Box::new(execution_project::Migration),
            Box::new(ppe_issue::Migration),
        ]
    }
}

/// Columns every registry table starts with.
#[derive(Iden, Clone, Copy)]
pub enum Versioned {
    Id,
    Deleted,
    Version,
    CreatedAt,
    CreatedBy,
    ModifiedBy,
}

/// `CREATE TABLE` statement pre-filled with the identity and versioning columns.
pub(crate) fn versioned_table<T: Iden + 'static>(table: T) -> TableCreateStatement {
    Table::create()
        .table(table)
        .if_not_exists()
        .col(
            ColumnDef::new(Versioned::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(Versioned::Deleted).boolean().not_null().default(false))
        .col(ColumnDef::new(Versioned::Version).big_integer().not_null())
        .col(ColumnDef::new(Versioned::CreatedAt).big_integer().not_null())
        .col(ColumnDef::new(Versioned::CreatedBy).integer().not_null().default(0))
        .col(ColumnDef::new(Versioned::ModifiedBy).integer().not_null().default(0))
        .to_owned()
}

/// Delta feeds range-scan the version column.
pub(crate) async fn create_version_index<T: Iden + 'static>(
    manager: &SchemaManager<'_>,
    table: T,
    name: &str,
) -> Result<(), DbErr> {
    manager
        .create_index(
            Index::create()
                .name(format!("idx-{name}-version"))
                .table(table)
                .col(Versioned::Version)
                .to_owned(),
        )
        .await
}
