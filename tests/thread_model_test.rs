//! Model-layer tests for thread CRUD, ordering, and vote application.

mod common;

use common::{seed_thread, seed_thread_with, setup_test_db};
use threadboard::models::thread::{self, ThreadPatch, ThreadStatus, VoteDirection};
use threadboard::models::{comment, tag};

#[test]
fn test_create_then_find_round_trips() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();

    let created = seed_thread(&pool, "Round trip", "Some content", "alice");
    assert!(created.id > 0);
    assert_eq!(created.votes, 0);
    assert_eq!(created.status, ThreadStatus::Open);
    assert!(!created.is_pinned);
    assert!(created.comments.is_empty());

    let found = thread::find_by_id(&conn, created.id).unwrap().expect("thread exists");
    assert_eq!(found, created);
}

#[test]
fn test_find_by_id_missing() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    assert!(thread::find_by_id(&conn, 999).unwrap().is_none());
}

#[test]
fn test_find_all_orders_pinned_first_then_newest() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();

    seed_thread_with(&pool, "old unpinned", 0, false, &[]);
    seed_thread_with(&pool, "pinned", 0, true, &[]);
    seed_thread_with(&pool, "new unpinned", 0, false, &[]);

    let all = thread::find_all(&conn).unwrap();
    let titles: Vec<&str> = all.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["pinned", "new unpinned", "old unpinned"]);
}

#[test]
fn test_update_applies_only_present_fields() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let created = seed_thread(&pool, "Before", "Original content", "bob");

    let patch = ThreadPatch { title: Some("After".to_string()), ..ThreadPatch::default() };
    let updated = thread::update(&conn, created.id, &patch).unwrap().expect("exists");

    assert_eq!(updated.title, "After");
    assert_eq!(updated.content, "Original content");
    assert_eq!(updated.author, "bob");
    assert!(updated.updated_at >= created.updated_at);
}

#[test]
fn test_update_status_pin_and_tags() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let created = seed_thread(&pool, "Moderated", "content", "bob");

    let patch = ThreadPatch {
        status: Some(ThreadStatus::Locked),
        is_pinned: Some(true),
        tags: Some(vec![tag::by_id(1).unwrap(), tag::by_id(4).unwrap()]),
        ..ThreadPatch::default()
    };
    let updated = thread::update(&conn, created.id, &patch).unwrap().expect("exists");

    assert_eq!(updated.status, ThreadStatus::Locked);
    assert!(updated.is_pinned);
    let tag_ids: Vec<i64> = updated.tags.iter().map(|t| t.id).collect();
    assert_eq!(tag_ids, vec![1, 4]);
}

#[test]
fn test_update_missing_thread_is_none() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let patch = ThreadPatch { title: Some("x".to_string()), ..ThreadPatch::default() };
    assert!(thread::update(&conn, 12345, &patch).unwrap().is_none());
}

#[test]
fn test_delete_removes_thread_and_comments() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let created = seed_thread(&pool, "Doomed", "content", "bob");
    common::seed_comment(&pool, created.id, "carol", "first");
    common::seed_comment(&pool, created.id, "carol", "second");

    assert!(thread::delete(&conn, created.id).unwrap());
    assert!(thread::find_by_id(&conn, created.id).unwrap().is_none());

    // Cascade removed the embedded comments too.
    let orphans: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM comments WHERE thread_id = ?1",
            [created.id],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(orphans, 0);
}

#[test]
fn test_delete_missing_thread_is_false() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    assert!(!thread::delete(&conn, 4242).unwrap());
}

#[test]
fn test_vote_applies_flat_delta() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let created = seed_thread_with(&pool, "Votable", 4, false, &[]);

    assert_eq!(thread::vote(&conn, created.id, VoteDirection::Up).unwrap(), Some(5));
    assert_eq!(thread::vote(&conn, created.id, VoteDirection::Down).unwrap(), Some(4));
    assert_eq!(thread::vote(&conn, created.id, VoteDirection::Down).unwrap(), Some(3));

    // Counts may go negative; there is no server-side dedup.
    for _ in 0..5 {
        thread::vote(&conn, created.id, VoteDirection::Down).unwrap();
    }
    let found = thread::find_by_id(&conn, created.id).unwrap().unwrap();
    assert_eq!(found.votes, -2);
}

#[test]
fn test_vote_missing_thread_is_none() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    assert_eq!(thread::vote(&conn, 777, VoteDirection::Up).unwrap(), None);
}

#[test]
fn test_status_of() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let created = seed_thread(&pool, "Status", "content", "bob");

    assert_eq!(thread::status_of(&conn, created.id).unwrap(), Some(ThreadStatus::Open));
    let patch = ThreadPatch { status: Some(ThreadStatus::Resolved), ..ThreadPatch::default() };
    thread::update(&conn, created.id, &patch).unwrap();
    assert_eq!(thread::status_of(&conn, created.id).unwrap(), Some(ThreadStatus::Resolved));
    assert_eq!(thread::status_of(&conn, 999).unwrap(), None);
}

#[test]
fn test_comment_ordering_is_insertion_order() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let created = seed_thread(&pool, "Ordered", "content", "bob");

    for i in 0..4 {
        common::seed_comment(&pool, created.id, "carol", &format!("comment {i}"));
    }
    let comments = comment::find_for_thread(&conn, created.id).unwrap();
    let contents: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(contents, vec!["comment 0", "comment 1", "comment 2", "comment 3"]);
}
