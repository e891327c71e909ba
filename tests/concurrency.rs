#![cfg(feature = "sqlite")]

mod common;

use common::*;
use sitesafe::error::Error;

#[tokio::test]
async fn stale_version_loses() -> TestResult {
    let h = harness().await;
    let depts = h.app.departments();

    h.at(100);
    let stored = depts.add(department("D1", "Earthworks"), 0).await?;
    assert_eq!(stored.version, 100);
    assert_eq!(stored.created_at, 100);

    // Two clients read the same version.
    let mut first = depts.get_row(stored.id).await?;
    let mut second = first.clone();
    first.name = "Earthworks North".into();
    second.name = "Earthworks South".into();

    h.at(200);
    let new_version = depts.edit(first, 0).await?;
    assert_eq!(new_version, 200);

    h.at(300);
    let err = depts.edit(second, 0).await.unwrap_err();
    assert!(matches!(err, Error::OtherEditConflict { id, .. } if id == stored.id), "{err:?}");
    assert_eq!(err.code(), "other_edit_conflict");

    let current = depts.get_by_id(stored.id).await?;
    assert_eq!(current.record.name, "Earthworks North");
    assert_eq!(current.record.version, 200);
    Ok(())
}

const RACE_ROUNDS: usize = 50;

fn assert_one_winner<A, B>(round: usize, first: &Result<A, Error>, second: &Result<B, Error>) {
    for err in [first.as_ref().err(), second.as_ref().err()].into_iter().flatten() {
        assert!(!err.is_internal(), "round {round}: {err:?}");
        assert!(matches!(err, Error::OtherEditConflict { .. }), "round {round}: {err:?}");
    }
    assert!(
        first.is_ok() != second.is_ok(),
        "round {round}: exactly one writer must win, got {:?} / {:?}",
        first.as_ref().err(),
        second.as_ref().err()
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_edits_have_one_winner() -> TestResult {
    let h = harness().await;
    let depts = h.app.departments();

    for round in 0..RACE_ROUNDS {
        let stored = depts.add(department(&format!("R{round}"), "Before"), 0).await?;
        let mut first = stored.clone();
        let mut second = stored.clone();
        first.name = "First".into();
        second.name = "Second".into();

        let (a, b) = tokio::join!(depts.edit(first, 1), depts.edit(second, 2));
        assert_one_winner(round, &a, &b);

        let winner = if a.is_ok() { "First" } else { "Second" };
        let current = depts.get_by_id(stored.id).await?;
        assert_eq!(current.record.name, winner, "round {round}");
        assert!(current.record.version > stored.version, "round {round}");
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_edit_and_delete_have_one_winner() -> TestResult {
    let h = harness().await;
    let depts = h.app.departments();

    for round in 0..RACE_ROUNDS {
        let stored = depts.add(department(&format!("X{round}"), "Before"), 0).await?;
        let mut edited = stored.clone();
        edited.name = "After".into();

        let (edit, delete) = tokio::join!(depts.edit(edited, 1), depts.delete(stored.id, stored.version, 2));
        assert_one_winner(round, &edit, &delete);

        let current = depts.get_by_id(stored.id).await;
        if delete.is_ok() {
            assert!(matches!(current, Err(Error::DataDeleted { .. })), "round {round}: {current:?}");
        }
        else {
            assert_eq!(current?.record.name, "After", "round {round}");
        }
    }
    Ok(())
}

#[tokio::test]
async fn versions_never_repeat() -> TestResult {
    let h = harness().await;
    let persons = h.app.persons();

    // The clock does not move between the writes.
    h.at(500);
    let mut row = persons.add(person("P1", "Ann"), 0).await?;
    let mut seen = vec![row.version];
    for n in 0..3 {
        row.name = format!("Ann {n}");
        row.version = persons.edit(row.clone(), 0).await?;
        seen.push(row.version);
    }
    assert!(seen.windows(2).all(|w| w[0] < w[1]), "{seen:?}");

    // Nor when it goes backwards.
    h.at(10);
    row.name = "Ann again".into();
    let after_rewind = persons.edit(row.clone(), 0).await?;
    assert!(after_rewind > row.version);
    Ok(())
}

#[tokio::test]
async fn edit_records_modifier() -> TestResult {
    let h = harness().await;
    let author = h.app.persons().add(person("P1", "Ann"), 0).await?;
    let editor = h.app.persons().add(person("P2", "Bob"), author.id).await?;

    let mut dept = h.app.departments().add(department("D1", "Roads"), author.id).await?;
    dept.name = "Roads and Bridges".into();
    h.app.departments().edit(dept.clone(), editor.id).await?;

    let detail = h.app.departments().get_by_id(dept.id).await?;
    assert_eq!(detail.record.created_by, author.id);
    assert_eq!(detail.record.modified_by, editor.id);
    assert_eq!(detail.audit.created_by.map(|r| r.code), Some("P1".to_string()));
    assert_eq!(detail.audit.modified_by.map(|r| r.name), Some("Bob".to_string()));
    Ok(())
}

#[tokio::test]
async fn soft_deleted_record_is_hidden() -> TestResult {
    let h = harness().await;
    let depts = h.app.departments();

    h.at(100);
    let kept = depts.add(department("D1", "Roads"), 0).await?;
    h.at(110);
    let gone = depts.add(department("D2", "Tunnels"), 0).await?;

    // Warm the cache so the delete has something to invalidate.
    depts.get_by_id(gone.id).await?;

    h.at(120);
    depts.delete(gone.id, gone.version, 0).await?;

    let err = depts.get_by_id(gone.id).await.unwrap_err();
    assert!(matches!(err, Error::DataDeleted { .. }), "{err:?}");

    let listed = depts.list().await?;
    assert_eq!(listed.iter().map(|d| d.record.id).collect::<Vec<_>>(), vec![kept.id]);

    let delta = depts.get_delta(115).await?;
    assert_eq!(delta.deleted_items.len(), 1);
    assert_eq!(delta.deleted_items[0].record.id, gone.id);
    assert!(delta.deleted_items[0].record.deleted);
    Ok(())
}

#[tokio::test]
async fn deleted_record_cannot_be_touched_again() -> TestResult {
    let h = harness().await;
    let depts = h.app.departments();

    h.at(100);
    let mut row = depts.add(department("D1", "Roads"), 0).await?;
    h.at(200);
    depts.delete(row.id, row.version, 0).await?;

    // Deleting twice with the old token, or with the current one, is a conflict.
    let err = depts.delete(row.id, row.version, 0).await.unwrap_err();
    assert!(matches!(err, Error::OtherEditConflict { .. }), "{err:?}");
    let err = depts.delete(row.id, 200, 0).await.unwrap_err();
    assert!(matches!(err, Error::OtherEditConflict { .. }), "{err:?}");

    row.name = "Revived".into();
    let err = depts.edit(row, 0).await.unwrap_err();
    assert!(matches!(err, Error::OtherEditConflict { .. }), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn unknown_ids() -> TestResult {
    let h = harness().await;

    let err = h.app.persons().get_by_id(4242).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { id: 4242, .. }), "{err:?}");

    let err = h.app.persons().delete(4242, 1, 0).await.unwrap_err();
    assert!(matches!(err, Error::OtherEditConflict { id: 4242, .. }), "{err:?}");
    Ok(())
}

#[tokio::test]
async fn lookup_by_code() -> TestResult {
    let h = harness().await;
    let ann = h.app.persons().add(person("P-17", "Ann"), 0).await?;

    let found = h.app.persons().get_by_code("P-17").await?;
    assert_eq!(found.map(|d| d.record.id), Some(ann.id));
    assert!(h.app.persons().get_by_code("P-18").await?.is_none());

    h.app.persons().delete(ann.id, ann.version, 0).await?;
    assert!(h.app.persons().get_by_code("P-17").await?.is_none());
    Ok(())
}
