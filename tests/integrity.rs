#![cfg(feature = "sqlite")]

mod common;

use std::sync::Arc;

use common::*;
use sitesafe::cache::MokaBackend;
use sitesafe::error::Error;

#[tokio::test]
async fn referenced_person_cannot_be_deleted() -> TestResult {
    let h = harness().await;
    let ann = h.app.persons().add(person("P1", "Ann"), 0).await?;
    let bob = h.app.persons().add(person("P2", "Bob"), 0).await?;
    let dept = h.app.departments().add(department("D1", "Roads"), 0).await?;
    let cat = h.app.site_categories().add(category("C1", 0), 0).await?;
    let s = h.app.construction_sites().add(site("S1", cat.id, dept.id, ann.id), 0).await?;
    h.app.ppe_issues().add(issue("V-1", s.id, bob.id), 0).await?;

    let err = h.app.persons().delete(ann.id, ann.version, 0).await.unwrap_err();
    assert!(matches!(err, Error::UsageConflict { id, .. } if id == ann.id), "{err:?}");
    assert_eq!(err.code(), "person.site_responsible");

    let err = h.app.persons().delete(bob.id, bob.version, 0).await.unwrap_err();
    assert_eq!(err.code(), "person.ppe_recipient");

    let err = h.app.departments().delete(dept.id, dept.version, 0).await.unwrap_err();
    assert_eq!(err.code(), "department.used_by_site");

    // Refused deletes leave the records untouched.
    let still = h.app.persons().get_by_id(ann.id).await?;
    assert_eq!(still.record.version, ann.version);
    Ok(())
}

#[tokio::test]
async fn first_matching_check_is_reported() -> TestResult {
    let h = harness().await;
    let ann = h.app.persons().add(person("P1", "Ann"), 0).await?;
    let dept = h.app.departments().add(department("D1", "Roads"), 0).await?;
    let cat = h.app.site_categories().add(category("C1", 0), 0).await?;
    let s = h.app.construction_sites().add(site("S1", cat.id, dept.id, ann.id), 0).await?;
    h.app.execution_projects().add(project("E1", s.id, ann.id), 0).await?;
    h.app.ppe_issues().add(issue("V-1", s.id, ann.id), 0).await?;

    // Ann is referenced three ways; the first check in order wins.
    let err = h.app.persons().delete(ann.id, ann.version, 0).await.unwrap_err();
    assert_eq!(err.code(), "person.site_responsible");

    let err = h.app.construction_sites().delete(s.id, s.version, 0).await.unwrap_err();
    assert_eq!(err.code(), "construction_site.has_projects");
    Ok(())
}

#[tokio::test]
async fn deleted_references_do_not_count() -> TestResult {
    let h = harness().await;
    let ann = h.app.persons().add(person("P1", "Ann"), 0).await?;
    let dept = h.app.departments().add(department("D1", "Roads"), 0).await?;
    let cat = h.app.site_categories().add(category("C1", 0), 0).await?;
    let s = h.app.construction_sites().add(site("S1", cat.id, dept.id, ann.id), 0).await?;

    h.app.construction_sites().delete(s.id, s.version, 0).await?;
    h.app.persons().delete(ann.id, ann.version, 0).await?;
    h.app.departments().delete(dept.id, dept.version, 0).await?;
    h.app.site_categories().delete(cat.id, cat.version, 0).await?;
    Ok(())
}

#[tokio::test]
async fn disabled_check_is_skipped() -> TestResult {
    let h = harness_with(Arc::new(MokaBackend::new("test", 100)), &["person.site_responsible"]).await;
    let ann = h.app.persons().add(person("P1", "Ann"), 0).await?;
    let dept = h.app.departments().add(department("D1", "Roads"), 0).await?;
    let cat = h.app.site_categories().add(category("C1", 0), 0).await?;
    h.app.construction_sites().add(site("S1", cat.id, dept.id, ann.id), 0).await?;

    assert_eq!(h.app.persons().active_usage_checks().len(), 2);
    h.app.persons().delete(ann.id, ann.version, 0).await?;

    // Other entities keep their checks.
    let err = h.app.departments().delete(dept.id, dept.version, 0).await.unwrap_err();
    assert_eq!(err.code(), "department.used_by_site");
    Ok(())
}

#[tokio::test]
async fn duplicate_codes_are_refused() -> TestResult {
    let h = harness().await;
    let ann = h.app.persons().add(person("P1", "Ann"), 0).await?;
    let mut bob = h.app.persons().add(person("P2", "Bob"), 0).await?;

    let err = h.app.persons().add(person("P1", "Impostor"), 0).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateKey { .. }), "{err:?}");
    assert_eq!(err.code(), "person.duplicate_code");

    bob.code = "P1".into();
    let err = h.app.persons().edit(bob.clone(), 0).await.unwrap_err();
    assert_eq!(err.code(), "person.duplicate_code");

    // Saving a record under its own code is not a duplicate.
    let mut same = ann.clone();
    same.name = "Ann Smith".into();
    h.app.persons().edit(same, 0).await?;

    // A deleted record releases its code.
    let ann = h.app.persons().get_row(ann.id).await?;
    h.app.persons().delete(ann.id, ann.version, 0).await?;
    h.app.persons().add(person("P1", "New Ann"), 0).await?;

    h.app.ppe_issues().add(issue("V-1", 0, 0), 0).await?;
    let err = h.app.ppe_issues().add(issue("V-1", 0, 0), 0).await.unwrap_err();
    assert_eq!(err.code(), "ppe_issue.duplicate_voucher");
    Ok(())
}

#[tokio::test]
async fn category_tree_stays_acyclic() -> TestResult {
    let h = harness().await;
    let cats = h.app.site_categories();

    let a = cats.add(category("A", 0), 0).await?;
    let b = cats.add(category("B", a.id), 0).await?;
    let c = cats.add(category("C", b.id), 0).await?;

    let mut a_under_c = a.clone();
    a_under_c.parent_id = c.id;
    let err = cats.edit(a_under_c, 0).await.unwrap_err();
    assert!(
        matches!(err, Error::CycleConflict { id, parent_id, .. } if id == a.id && parent_id == c.id),
        "{err:?}"
    );
    assert_eq!(err.code(), "cycle_conflict");

    let mut a_under_a = a.clone();
    a_under_a.parent_id = a.id;
    let err = cats.edit(a_under_a, 0).await.unwrap_err();
    assert!(matches!(err, Error::SelfParentConflict { .. }), "{err:?}");

    let mut c_under_a = c.clone();
    c_under_a.parent_id = a.id;
    cats.edit(c_under_a, 0).await?;

    assert_eq!(cats.subtree(a.id).await?, vec![b.id, c.id]);
    assert_eq!(cats.subtree(b.id).await?, Vec::<i32>::new());

    // The refused edits changed nothing.
    assert_eq!(cats.get_row(a.id).await?.version, a.version);
    Ok(())
}

#[tokio::test]
async fn category_parent_must_exist() -> TestResult {
    let h = harness().await;
    let cats = h.app.site_categories();

    let err = cats.add(category("X", 999), 0).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { id: 999, .. }), "{err:?}");

    let root = cats.add(category("R", 0), 0).await?;
    let child = cats.add(category("K", root.id), 0).await?;

    let err = cats.delete(root.id, root.version, 0).await.unwrap_err();
    assert_eq!(err.code(), "site_category.has_children");

    cats.delete(child.id, child.version, 0).await?;
    cats.delete(root.id, root.version, 0).await?;

    let err = cats.add(category("L", root.id), 0).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn details_resolve_references() -> TestResult {
    let h = harness().await;
    let ann = h.app.persons().add(person("P1", "Ann"), 0).await?;
    let dept = h.app.departments().add(department("D1", "Roads"), 0).await?;
    let mut cat = h.app.site_categories().add(category("C1", 0), 0).await?;
    let s = h.app.construction_sites().add(site("S1", cat.id, dept.id, ann.id), ann.id).await?;

    let detail = h.app.construction_sites().get_by_id(s.id).await?;
    assert_eq!(detail.refs.category.as_ref().map(|r| r.code.as_str()), Some("C1"));
    assert_eq!(detail.refs.department.as_ref().map(|r| r.name.as_str()), Some("Roads"));
    assert_eq!(detail.refs.responsible.as_ref().map(|r| r.id), Some(ann.id));
    assert_eq!(detail.audit.created_by.as_ref().map(|r| r.id), Some(ann.id));

    // Renaming the category shows up in the site at once.
    cat.name = "Bridges".into();
    h.app.site_categories().edit(cat, 0).await?;
    let detail = h.app.construction_sites().get_by_id(s.id).await?;
    assert_eq!(detail.refs.category.map(|r| r.name), Some("Bridges".to_string()));

    let json = serde_json::to_value(&detail.refs.responsible)?;
    assert_eq!(json["code"], "P1");
    Ok(())
}
