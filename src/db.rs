//! Database backend: drivers, entity schemas and migrations.
pub mod driver;
pub mod entity;
pub mod migrations;
