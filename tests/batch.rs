#![cfg(feature = "sqlite")]

mod common;

use common::*;
use sitesafe::concurrency::Expected;
use sitesafe::error::Error;

#[tokio::test]
async fn failing_record_aborts_whole_batch() -> TestResult {
    let h = harness().await;
    let depts = h.app.departments();

    let d1 = depts.add(department("D1", "Roads"), 0).await?;
    let d2 = depts.add(department("D2", "Tunnels"), 0).await?;
    let d3 = depts.add(department("D3", "Bridges"), 0).await?;

    // Warm the cache for all of them.
    depts.list().await?;

    let items = [
        Expected::new(d1.id, d1.version),
        Expected::new(d2.id, d2.version - 1),
        Expected::new(d3.id, d3.version),
    ];
    let err = depts.batch_delete(&items, 0).await.unwrap_err();
    match &err {
        Error::Batch { index, id, source } => {
            assert_eq!(*index, 1);
            assert_eq!(*id, d2.id);
            assert!(matches!(**source, Error::OtherEditConflict { .. }), "{source:?}");
        }
        other => panic!("expected a batch error, got {other:?}"),
    }
    assert_eq!(err.code(), "other_edit_conflict");

    // The first record was deleted inside the transaction, then rolled back.
    for d in [&d1, &d2, &d3] {
        let current = depts.get_by_id(d.id).await?;
        assert_eq!(current.record.version, d.version);
        assert!(!current.record.deleted);
    }
    Ok(())
}

#[tokio::test]
async fn usage_conflict_inside_batch() -> TestResult {
    let h = harness().await;
    let ann = h.app.persons().add(person("P1", "Ann"), 0).await?;
    let bob = h.app.persons().add(person("P2", "Bob"), 0).await?;
    let dept = h.app.departments().add(department("D1", "Roads"), 0).await?;
    let cat = h.app.site_categories().add(category("C1", 0), 0).await?;
    h.app.construction_sites().add(site("S1", cat.id, dept.id, bob.id), 0).await?;

    let err = h
        .app
        .persons()
        .batch_delete(&[Expected::new(ann.id, ann.version), Expected::new(bob.id, bob.version)], 0)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Batch { index: 1, .. }), "{err:?}");
    assert_eq!(err.code(), "person.site_responsible");
    assert!(h.app.persons().get_by_id(ann.id).await.is_ok());
    Ok(())
}

#[tokio::test]
async fn successful_batch_deletes_all() -> TestResult {
    let h = harness().await;
    let depts = h.app.departments();

    let d1 = depts.add(department("D1", "Roads"), 0).await?;
    let d2 = depts.add(department("D2", "Tunnels"), 0).await?;
    depts.list().await?;

    depts
        .batch_delete(&[Expected::new(d1.id, d1.version), Expected::new(d2.id, d2.version)], 0)
        .await?;

    assert!(depts.list().await?.is_empty());
    for d in [&d1, &d2] {
        let err = depts.get_by_id(d.id).await.unwrap_err();
        assert!(matches!(err, Error::DataDeleted { .. }), "{err:?}");
    }
    Ok(())
}

#[tokio::test]
async fn batch_edit_is_atomic() -> TestResult {
    let h = harness().await;
    let persons = h.app.persons();

    let mut ann = persons.add(person("P1", "Ann"), 0).await?;
    let mut bob = persons.add(person("P2", "Bob"), 0).await?;

    ann.name = "Ann Smith".into();
    bob.code = "P1".into();
    let err = persons.batch_edit(vec![ann.clone(), bob.clone()], 0).await.unwrap_err();
    assert!(matches!(err, Error::Batch { index: 1, .. }), "{err:?}");
    assert_eq!(err.code(), "person.duplicate_code");
    assert_eq!(persons.get_by_id(ann.id).await?.record.name, "Ann");

    bob.code = "P2".into();
    bob.name = "Bob Jones".into();
    let versions = persons.batch_edit(vec![ann.clone(), bob.clone()], 0).await?;
    assert_eq!(versions.len(), 2);
    assert!(versions[0] > ann.version && versions[1] > bob.version);
    assert_eq!(persons.get_by_id(bob.id).await?.record.version, versions[1]);
    Ok(())
}

#[tokio::test]
async fn empty_batch_is_a_no_op() -> TestResult {
    let h = harness().await;
    h.app.departments().batch_delete(&[], 0).await?;
    assert!(h.app.departments().batch_edit(Vec::new(), 0).await?.is_empty());
    Ok(())
}
