//! The assembled registry: one [`Registry`] per entity over a shared [`Store`].
use std::sync::Arc;

use sea_orm::DbErr;
use sea_orm_migration::MigratorTrait;
use serde_json::json;
use tracing::instrument;

use crate::cache::CacheBackend;
use crate::cache::MokaBackend;
use crate::cache::RecordCache;
use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::clock::VersionClock;
use crate::config::Backend;
use crate::config::Command;
use crate::config::Config;
#[cfg(feature = "pg")]
use crate::db::driver::pg::Pg;
#[cfg(feature = "sqlite")]
use crate::db::driver::sqlite::Sqlite;
use crate::db::driver::DatabaseDriver;
use crate::db::entity::ConstructionSiteMgr;
use crate::db::entity::DepartmentMgr;
use crate::db::entity::ExecutionProjectMgr;
use crate::db::entity::PersonMgr;
use crate::db::entity::PpeIssueMgr;
use crate::db::entity::SiteCategoryMgr;
use crate::db::migrations::Migrator;
use crate::error::Error;
use crate::error::Result;
use crate::registry::Registry;
use crate::registry::RegistryOps;
use crate::store::Store;
use crate::traits::DataController;
use crate::types::EntityKind;

const CACHE_NAME: &str = "records";

#[derive(Debug)]
pub struct SiteSafe {
    driver:             Arc<dyn DatabaseDriver>,
    store:              Arc<Store>,
    persons:            Registry<PersonMgr>,
    departments:        Registry<DepartmentMgr>,
    site_categories:    Registry<SiteCategoryMgr>,
    construction_sites: Registry<ConstructionSiteMgr>,
    execution_projects: Registry<ExecutionProjectMgr>,
    ppe_issues:         Registry<PpeIssueMgr>,
}

impl SiteSafe {
    /// Connect to the backend chosen by `config`, with an in-process cache and the system clock.
    pub async fn connect(config: &Config) -> Result<Self> {
        let driver: Arc<dyn DatabaseDriver> = match config.backend() {
            #[cfg(feature = "sqlite")]
            Backend::Sqlite => Arc::new(Sqlite::connect(&config.sqlite_path()).await?),
            #[cfg(feature = "pg")]
            Backend::Pg => Arc::new(
                Pg::connect(
                    &config.pg_host(),
                    config.pg_port(),
                    &config.pg_user(),
                    &config.pg_password(),
                    &config.pg_database(),
                )
                .await?,
            ),
            #[allow(unreachable_patterns)]
            backend => {
                return Err(Error::Db(DbErr::Custom(format!(
                    "backend {backend:?} is not compiled in"
                ))))
            }
        };

        Self::open(
            driver,
            Arc::new(MokaBackend::new(CACHE_NAME, config.cache_capacity())),
            config.disabled_usage_checks(),
            Arc::new(SystemClock),
        )
        .await
    }

    /// Assemble the registries over an already connected driver.
    pub async fn open<I, S>(
        driver: Arc<dyn DatabaseDriver>,
        cache: Arc<dyn CacheBackend>,
        disabled_checks: I,
        clock: Arc<dyn Clock>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        driver.configure().await?;
        tracing::info!("using {} backend", driver.name());

        let store = Arc::new(Store::new(
            driver.connection(),
            RecordCache::new(CACHE_NAME, cache),
            VersionClock::new(clock),
            driver.single_writer(),
        ));
        let disabled = disabled_checks.into_iter().map(Into::into).collect::<Vec<String>>();

        Ok(Self {
            persons: Self::registry_for(&store, PersonMgr, &disabled),
            departments: Self::registry_for(&store, DepartmentMgr, &disabled),
            site_categories: Self::registry_for(&store, SiteCategoryMgr, &disabled),
            construction_sites: Self::registry_for(&store, ConstructionSiteMgr, &disabled),
            execution_projects: Self::registry_for(&store, ExecutionProjectMgr, &disabled),
            ppe_issues: Self::registry_for(&store, PpeIssueMgr, &disabled),
            store,
            driver,
        })
    }

    fn registry_for<DC: DataController>(store: &Arc<Store>, controller: DC, disabled: &[String]) -> Registry<DC> {
        Registry::new(Arc::clone(store), controller).with_disabled_checks(disabled.iter().cloned())
    }

    /// Bring the schema up to date.
    pub async fn migrate(&self) -> Result<()> {
        Migrator::up(self.store.db(), None).await?;
        Ok(())
    }

    #[inline]
    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    #[inline]
    pub fn persons(&self) -> &Registry<PersonMgr> {
        &self.persons
    }

    #[inline]
    pub fn departments(&self) -> &Registry<DepartmentMgr> {
        &self.departments
    }

    #[inline]
    pub fn site_categories(&self) -> &Registry<SiteCategoryMgr> {
        &self.site_categories
    }

    #[inline]
    pub fn construction_sites(&self) -> &Registry<ConstructionSiteMgr> {
        &self.construction_sites
    }

    #[inline]
    pub fn execution_projects(&self) -> &Registry<ExecutionProjectMgr> {
        &self.execution_projects
    }

    #[inline]
    pub fn ppe_issues(&self) -> &Registry<PpeIssueMgr> {
        &self.ppe_issues
    }

    pub fn registry(&self, kind: EntityKind) -> &dyn RegistryOps {
        match kind {
            EntityKind::Person => &self.persons,
            EntityKind::Department => &self.departments,
            EntityKind::SiteCategory => &self.site_categories,
            EntityKind::ConstructionSite => &self.construction_sites,
            EntityKind::ExecutionProject => &self.execution_projects,
            EntityKind::PpeIssue => &self.ppe_issues,
        }
    }

    /// Run one command line operation and return its JSON result.
    #[instrument(level = "debug", skip(self))]
    pub async fn execute(&self, command: Command) -> Result<serde_json::Value> {
        Ok(match command {
            Command::Migrate => {
                self.migrate().await?;
                json!({ "migrated": true })
            }
            Command::List { kind } => self.registry(kind).list_json().await?,
            Command::Get { kind, id } => self.registry(kind).get_json(id).await?,
            Command::Add { kind, json, actor } => {
                let payload = serde_json::from_str(&json)?;
                self.registry(kind).add_json(payload, actor).await?
            }
            Command::Edit { kind, json, actor } => {
                let payload: serde_json::Value = serde_json::from_str(&json)?;
                let id = payload.get("id").cloned().unwrap_or(serde_json::Value::Null);
                let version = self.registry(kind).edit_json(payload, actor).await?;
                json!({ "id": id, "version": version })
            }
            Command::Delete {
                kind,
                id,
                version,
                actor,
            } => {
                self.registry(kind).delete_record(id, version, actor).await?;
                json!({ "id": id, "deleted": true })
            }
            Command::BatchDelete { kind, items, actor } => {
                let ids = items.iter().map(|item| item.id).collect::<Vec<_>>();
                self.registry(kind).batch_delete_records(items, actor).await?;
                json!({ "ids": ids, "deleted": true })
            }
            Command::Delta { kind, watermark } => self.registry(kind).delta_json(watermark).await?,
        })
    }

    /// Flush the backend before shutdown.
    pub async fn close(&self) -> Result<()> {
        self.driver.checkpoint().await
    }
}
