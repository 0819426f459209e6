mod common;

use common::*;
use redo_fs::engine::{Action, Database};
use redo_fs::journal::OperationKind;
use redo_fs::narrative::Severity;
use redo_fs::registry::TxnId;
use redo_fs::tree::{Node, NodeKind};
use redo_fs::{JournalError, Rejection};

fn kinds<P: redo_fs::engine::Publisher>(db: &Database<P>, txn: TxnId) -> Vec<OperationKind> {
    db.journal()
        .entries_for(txn)
        .map(|e| e.kind())
        .collect()
}

fn assert_sets_disjoint<P: redo_fs::engine::Publisher>(db: &Database<P>) {
    let reg = db.registry();
    for id in reg.active() {
        assert!(!reg.aborted().contains(id), "{} active and aborted", id);
        assert!(!reg.consolidated().contains(id), "{} active and consolidated", id);
    }
    for id in reg.aborted() {
        assert!(!reg.consolidated().contains(id), "{} aborted and consolidated", id);
    }
}

#[test]
fn test_commit_write_reaches_stable() {
    let mut db = database();
    let t0 = db.start();
    assert_eq!(t0, TxnId::new(0));

    db.write(t0, &path("fs/readme"), "hi").unwrap();
    assert_eq!(content(db.stable(), "fs/readme"), Some(""));

    db.commit(t0).unwrap();
    assert_eq!(content(db.stable(), "fs/readme"), Some("hi"));
    assert_eq!(
        kinds(&db, t0),
        vec![
            OperationKind::Start,
            OperationKind::Write,
            OperationKind::Commit
        ]
    );
    assert!(db.registry().consolidated().contains(&t0));
    assert!(!db.registry().is_active(t0));
}

#[test]
fn test_abort_created_folder() {
    let mut db = database();
    let _t0 = db.start();
    let t1 = db.start();

    let name = db.create(t1, &path("fs"), NodeKind::Folder).unwrap();
    assert_eq!(name, "folder");
    assert!(db.working().contains(&path("fs/folder")));

    db.abort(t1).unwrap();
    assert!(!db.working().contains(&path("fs/folder")));
    assert_eq!(db.stable(), &disk());
    assert!(!db.registry().is_active(t1));
    assert!(!db.registry().consolidated().contains(&t1));
    assert!(db.registry().aborted().contains(&t1));
}

#[test]
fn test_commit_applies_effects_in_order() {
    let mut db = database();
    let t = db.start();

    let name = db.create(t, &path("fs/docs"), NodeKind::File).unwrap();
    let created = path("fs/docs").join(&name);
    db.write(t, &created, "draft").unwrap();
    db.rename(t, &created, "plan").unwrap();
    db.write(t, &path("fs/docs/plan"), "final").unwrap();
    db.delete(t, &path("fs/src")).unwrap();
    db.commit(t).unwrap();

    let stable = db.stable();
    assert_eq!(content(stable, "fs/docs/plan"), Some("final"));
    assert!(!stable.contains(&created));
    assert!(!stable.contains(&path("fs/src")));
    assert_eq!(content(stable, "fs/docs/notes"), Some("meeting at noon"));
}

#[test]
fn test_abort_leaves_stable_untouched() {
    let mut db = database();
    let t = db.start();
    db.write(t, &path("fs/docs/notes"), "cancelled").unwrap();
    db.delete(t, &path("fs/src")).unwrap();
    db.abort(t).unwrap();

    assert_eq!(db.stable(), &disk());
    assert_eq!(content(db.working(), "fs/docs/notes"), Some("meeting at noon"));
    assert_eq!(content(db.working(), "fs/src/main"), Some("print('hello')"));
}

#[test]
fn test_abort_folder_delete_restores_descendants() {
    let mut db = database();
    let t = db.start();
    db.delete(t, &path("fs/docs")).unwrap();
    assert!(!db.working().contains(&path("fs/docs")));

    let stats = db.abort(t).unwrap();
    assert_eq!(stats.operations_undone, 3);
    assert_eq!(stats.skipped, 0);

    assert_eq!(child_names(db.working(), "fs/docs"), vec!["notes", "todo"]);
    assert_eq!(content(db.working(), "fs/docs/notes"), Some("meeting at noon"));
    assert_eq!(content(db.working(), "fs/docs/todo"), Some("- buy milk"));
}

#[test]
fn test_delete_journals_descendants_first() {
    let mut db = database();
    let t = db.start();
    db.delete(t, &path("fs/docs")).unwrap();

    let deleted: Vec<String> = db
        .journal()
        .entries_for(t)
        .filter(|e| e.kind() == OperationKind::Delete)
        .filter_map(|e| e.path().map(|p| p.to_string()))
        .collect();
    assert_eq!(deleted, vec!["fs/docs/notes", "fs/docs/todo", "fs/docs"]);
}

#[test]
fn test_create_delete_abort_round_trip() {
    let mut db = database();
    let t = db.start();
    db.read(t, &path("fs/docs")).unwrap();
    let before = child_names(db.working(), "fs/docs");

    let name = db.create(t, &path("fs/docs"), NodeKind::File).unwrap();
    db.delete(t, &path("fs/docs").join(&name)).unwrap();
    db.abort(t).unwrap();

    assert_eq!(child_names(db.working(), "fs/docs"), before);
}

#[test]
fn test_read_is_idempotent() {
    let mut db = database();
    let t = db.start();
    db.write(t, &path("fs/readme"), "once").unwrap();

    db.read(t, &path("fs/readme")).unwrap();
    let snapshot = db.working().clone();
    db.read(t, &path("fs/readme")).unwrap();
    assert_eq!(db.working(), &snapshot);
}

#[test]
fn test_deleted_subtree_not_resurrected_by_read() {
    let mut db = database();
    let t = db.start();
    db.delete(t, &path("fs/docs")).unwrap();

    db.read(t, &path("fs/docs/notes")).unwrap();
    assert!(!db.working().contains(&path("fs/docs")));

    let err = db.write(t, &path("fs/docs/notes"), "back").unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::NotFound));
}

#[test]
fn test_rename_rekeys_on_both_trees() {
    let mut db = database();
    let t = db.start();
    db.rename(t, &path("fs/docs"), "papers").unwrap();

    assert_eq!(content(db.working(), "fs/papers/notes"), Some("meeting at noon"));
    assert!(!db.working().contains(&path("fs/docs")));

    db.commit(t).unwrap();
    let renamed = db.stable().get(&path("fs/papers")).unwrap();
    assert_eq!(renamed.name(), "papers");
    assert_eq!(content(db.stable(), "fs/papers/todo"), Some("- buy milk"));
    assert!(!db.stable().contains(&path("fs/docs")));
}

#[test]
fn test_abort_rename_restores_old_name() {
    let mut db = database();
    let t = db.start();
    db.rename(t, &path("fs/src"), "lib").unwrap();
    db.abort(t).unwrap();

    assert!(db.working().contains(&path("fs/src/main")));
    assert!(!db.working().contains(&path("fs/lib")));
}

#[test]
fn test_full_restart_keeps_only_consolidated_effects() {
    let mut db = database();
    let t0 = db.start();
    db.write(t0, &path("fs/readme"), "hi").unwrap();
    db.commit(t0).unwrap();

    let t1 = db.start();
    db.write(t1, &path("fs/readme"), "bye").unwrap();
    db.create(t1, &path("fs"), NodeKind::Folder).unwrap();

    let stats = db.restart().unwrap();
    assert_eq!(stats.transactions_rolled_back, 1);
    assert_eq!(stats.transactions_kept, 1);

    assert_eq!(content(db.stable(), "fs/readme"), Some("hi"));
    assert!(!db.stable().contains(&path("fs/folder")));
    assert!(db.journal().is_empty());
    assert_eq!(db.working(), &Node::root());
    assert!(db.registry().active().is_empty());
    assert!(db.registry().consolidated().is_empty());
    assert!(db.registry().aborted().contains(&t1));
    assert_sets_disjoint(&db);
}

#[test]
fn test_ids_not_reused_after_restart() {
    let mut db = database();
    let t0 = db.start();
    db.restart().unwrap();
    let t1 = db.start();
    assert!(t1 > t0);
}

#[test]
fn test_restart_with_nothing_to_do() {
    let mut db = database();
    let stats = db.restart().unwrap();
    assert_eq!(stats.entries_processed, 0);
    assert_eq!(db.stable(), &disk());
    assert_eq!(
        db.narrative().last().map(|e| e.severity),
        Some(Severity::Danger)
    );
}

#[test]
fn test_sets_stay_disjoint() {
    let mut db = database();
    let a = db.start();
    let b = db.start();
    let c = db.start();
    db.commit(a).unwrap();
    assert_sets_disjoint(&db);
    db.abort(b).unwrap();
    assert_sets_disjoint(&db);
    db.restart().unwrap();
    assert_sets_disjoint(&db);
    assert!(db.registry().aborted().contains(&c));
}

#[test]
fn test_finished_transaction_is_refused() {
    let mut db = database();
    let t = db.start();
    db.commit(t).unwrap();

    let err = db.write(t, &path("fs/readme"), "late").unwrap_err();
    assert!(err.is_soft());
    assert_eq!(err.rejection(), Some(&Rejection::NotActive));

    let err = db.abort(t).unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::NotActive));
    assert_eq!(
        db.narrative().last().map(|e| e.description.as_str()),
        Some("transaction not active")
    );
}

#[test]
fn test_soft_failures_leave_state_unchanged() {
    let mut db = database();
    let t = db.start();
    let journal_len = db.journal().len();
    let working = db.working().clone();

    let failures: Vec<JournalError> = vec![
        db.write(None, &path("fs/readme"), "x").unwrap_err(),
        db.write(t, &path("fs/docs"), "x").unwrap_err(),
        db.write(t, &path("fs/readme"), "").unwrap_err(),
        db.delete(t, &path("fs")).unwrap_err(),
        db.rename(t, &path("fs"), "root").unwrap_err(),
        db.rename(t, &path("fs/docs"), "src").unwrap_err(),
        db.create(t, &path("fs/readme"), NodeKind::File).unwrap_err(),
        db.delete(t, &path("fs/missing")).unwrap_err(),
        db.delete(t, &path("other")).unwrap_err(),
    ];

    let rejections: Vec<Rejection> = failures
        .iter()
        .map(|e| e.rejection().cloned().unwrap())
        .collect();
    assert_eq!(
        rejections,
        vec![
            Rejection::NoTransaction,
            Rejection::IsFolder,
            Rejection::Unchanged,
            Rejection::DeleteRoot,
            Rejection::RenameRoot,
            Rejection::AlreadyExists,
            Rejection::IsFile,
            Rejection::NotFound,
            Rejection::NotFound,
        ]
    );
    assert_eq!(db.journal().len(), journal_len);
    assert_eq!(db.working(), &working);
    assert_eq!(db.narrative().warnings().count(), rejections.len());
}

#[test]
fn test_publisher_sees_every_state_change() {
    let mut db = database();
    let idle = Action::enabled(false);
    let busy = Action::enabled(true);

    assert_eq!(db.publisher().snapshots, vec![idle.clone()]);

    let t = db.start();
    assert_eq!(db.publisher().last(), Some(&busy));
    db.write(t, &path("fs/readme"), "x").unwrap();
    db.commit(t).unwrap();
    assert_eq!(db.publisher().last(), Some(&idle));
    assert_eq!(db.publisher().snapshots.len(), 4);
}

#[test]
fn test_two_transactions_share_the_working_tree() {
    let mut db = database();
    let t0 = db.start();
    let t1 = db.start();

    db.write(t0, &path("fs/docs/todo"), "- buy bread").unwrap();
    db.read(t1, &path("fs/docs/todo")).unwrap();
    assert_eq!(content(db.working(), "fs/docs/todo"), Some("- buy bread"));

    // Only t0's entries reach the disk.
    db.write(t1, &path("fs/readme"), "t1").unwrap();
    db.commit(t0).unwrap();
    assert_eq!(content(db.stable(), "fs/docs/todo"), Some("- buy bread"));
    assert_eq!(content(db.stable(), "fs/readme"), Some(""));
}

#[test]
fn test_cannot_build_on_another_transactions_folder() {
    let mut db = database();
    let t1 = db.start();
    let t2 = db.start();
    let folder = db.create(t1, &path("fs"), NodeKind::Folder).unwrap();

    let err = db
        .create(t2, &path("fs").join(&folder), NodeKind::File)
        .unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::NotFound));

    db.commit(t2).unwrap();
    assert!(db.registry().is_consolidated(t2));
    assert!(db.stable().get(&path("fs/folder")).is_none());
}

#[test]
fn test_conflicting_commit_is_refused() {
    let mut db = database();
    let t1 = db.start();
    let t2 = db.start();
    db.write(t2, &path("fs/src/main"), "print('bye')").unwrap();
    db.delete(t1, &path("fs/src")).unwrap();
    db.commit(t1).unwrap();

    let stable = db.stable().clone();
    let journal_len = db.journal().len();
    let err = db.commit(t2).unwrap_err();
    assert_eq!(err.rejection(), Some(&Rejection::Conflict));
    assert!(db.registry().is_active(t2));
    assert_eq!(db.stable(), &stable);
    assert_eq!(db.journal().len(), journal_len);

    // The loser can still give up cleanly.
    db.abort(t2).unwrap();
    assert!(!db.registry().is_active(t2));
}
