#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use sitesafe::cache::CacheBackend;
use sitesafe::cache::MokaBackend;
use sitesafe::clock::ManualClock;
use sitesafe::db::driver::sqlite::Sqlite;
use sitesafe::db::entity::ConstructionSite;
use sitesafe::db::entity::Department;
use sitesafe::db::entity::ExecutionProject;
use sitesafe::db::entity::Person;
use sitesafe::db::entity::PpeIssue;
use sitesafe::db::entity::SiteCategory;
use sitesafe::SiteSafe;
use tempfile::TempDir;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

pub struct Harness {
    pub app:   SiteSafe,
    pub clock: Arc<ManualClock>,
    _dir:      TempDir,
}

impl Harness {
    /// Move the clock to `at` so the next write gets exactly this version.
    pub fn at(&self, at: i64) {
        self.clock.set(at);
    }
}

pub async fn harness() -> Harness {
    harness_with(Arc::new(MokaBackend::new("test", 1_000)), &[]).await
}

pub async fn harness_with(cache: Arc<dyn CacheBackend>, disabled_checks: &[&str]) -> Harness {
    let dir = tempfile::Builder::new()
        .prefix("sitesafe-test")
        .tempdir()
        .expect("temporary directory");
    let driver = Sqlite::connect(&dir.path().join("registry.db"))
        .await
        .expect("SQLite connection");
    let clock = Arc::new(ManualClock::new(1_000));

    let app = SiteSafe::open(
        Arc::new(driver),
        cache,
        disabled_checks.iter().copied(),
        clock.clone(),
    )
    .await
    .expect("registry");
    app.migrate().await.expect("migrations");

    Harness { app, clock, _dir: dir }
}

pub fn person(code: &str, name: &str) -> Person {
    Person {
        id:          0,
        deleted:     false,
        version:     0,
        created_at:  0,
        created_by:  0,
        modified_by: 0,
        code:        code.into(),
        name:        name.into(),
        phone:       None,
    }
}

pub fn department(code: &str, name: &str) -> Department {
    Department {
        id:          0,
        deleted:     false,
        version:     0,
        created_at:  0,
        created_by:  0,
        modified_by: 0,
        code:        code.into(),
        name:        name.into(),
    }
}

pub fn category(code: &str, parent_id: i32) -> SiteCategory {
    SiteCategory {
        id: 0,
        deleted: false,
        version: 0,
        created_at: 0,
        created_by: 0,
        modified_by: 0,
        code: code.into(),
        name: format!("Category {code}"),
        parent_id,
    }
}

pub fn site(code: &str, category_id: i32, department_id: i32, responsible_id: i32) -> ConstructionSite {
    ConstructionSite {
        id: 0,
        deleted: false,
        version: 0,
        created_at: 0,
        created_by: 0,
        modified_by: 0,
        code: code.into(),
        name: format!("Site {code}"),
        address: None,
        category_id,
        department_id,
        responsible_id,
    }
}

pub fn project(code: &str, site_id: i32, manager_id: i32) -> ExecutionProject {
    ExecutionProject {
        id: 0,
        deleted: false,
        version: 0,
        created_at: 0,
        created_by: 0,
        modified_by: 0,
        code: code.into(),
        name: format!("Project {code}"),
        site_id,
        manager_id,
        starts_on: NaiveDate::from_ymd_opt(2025, 3, 1),
        ends_on: None,
    }
}

pub fn issue(voucher_no: &str, site_id: i32, person_id: i32) -> PpeIssue {
    PpeIssue {
        id: 0,
        deleted: false,
        version: 0,
        created_at: 0,
        created_by: 0,
        modified_by: 0,
        voucher_no: voucher_no.into(),
        site_id,
        person_id,
        item: "Helmet".into(),
        quantity: 1,
        issued_at: NaiveDate::from_ymd_opt(2025, 3, 2).expect("valid date"),
    }
}
