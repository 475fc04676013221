//! Model-layer tests for the comment lifecycle: append, edit, delete.

mod common;

use common::{seed_thread, setup_test_db};
use threadboard::models::comment::{self, NewComment};
use threadboard::models::thread;

#[test]
fn test_create_comment_returns_only_the_comment() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let t = seed_thread(&pool, "Commented", "content", "alice");

    let new = NewComment { author: "carol".to_string(), content: "hello".to_string() };
    let created = comment::create(&conn, t.id, &new).unwrap();

    assert!(created.id > 0);
    assert_eq!(created.author, "carol");
    assert_eq!(created.content, "hello");
    assert!(created.edited_at.is_none());
}

#[test]
fn test_create_comment_bumps_thread_updated_at() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let t = seed_thread(&pool, "Bumped", "content", "alice");

    let new = NewComment { author: "carol".to_string(), content: "bump".to_string() };
    comment::create(&conn, t.id, &new).unwrap();

    let after = thread::find_by_id(&conn, t.id).unwrap().unwrap();
    assert!(after.updated_at >= t.updated_at);
    assert_eq!(after.comments.len(), 1);
}

#[test]
fn test_edit_sets_edited_at_once() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let t = seed_thread(&pool, "Edited", "content", "alice");
    let new = NewComment { author: "carol".to_string(), content: "draft".to_string() };
    let created = comment::create(&conn, t.id, &new).unwrap();

    let updated = comment::update_content(&conn, t.id, created.id, "final")
        .unwrap()
        .expect("comment exists");
    assert_eq!(updated.content, "final");
    assert!(updated.edited_at.is_some());
    assert_eq!(updated.created_at, created.created_at);
}

#[test]
fn test_edit_missing_comment_is_none() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let t = seed_thread(&pool, "Empty", "content", "alice");
    assert!(comment::update_content(&conn, t.id, 999, "x").unwrap().is_none());
}

#[test]
fn test_edit_comment_of_other_thread_is_none() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let a = seed_thread(&pool, "A", "content", "alice");
    let b = seed_thread(&pool, "B", "content", "alice");
    let new = NewComment { author: "carol".to_string(), content: "on a".to_string() };
    let created = comment::create(&conn, a.id, &new).unwrap();

    // The comment id must be addressed through its own thread.
    assert!(comment::update_content(&conn, b.id, created.id, "x").unwrap().is_none());
}

#[test]
fn test_delete_comment() {
    let (_dir, pool) = setup_test_db();
    let conn = pool.get().unwrap();
    let t = seed_thread(&pool, "Deleted", "content", "alice");
    let new = NewComment { author: "carol".to_string(), content: "gone soon".to_string() };
    let created = comment::create(&conn, t.id, &new).unwrap();

    assert!(comment::delete(&conn, t.id, created.id).unwrap());
    assert!(comment::find_by_id(&conn, t.id, created.id).unwrap().is_none());
    assert!(!comment::delete(&conn, t.id, created.id).unwrap());
}
