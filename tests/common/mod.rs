//! Shared test infrastructure: temporary databases and seed helpers.
#![allow(dead_code)]

use tempfile::TempDir;

use threadboard::db::{self, DbPool};
use threadboard::models::comment::NewComment;
use threadboard::models::thread::{self, NewThread, Thread, ThreadPatch};
use threadboard::models::{comment, tag};

/// Setup a temporary SQLite database with the schema applied.
///
/// Returns (TempDir, DbPool); the TempDir must be kept alive for the
/// pool to remain valid.
pub fn setup_test_db() -> (TempDir, DbPool) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let pool = db::init_pool(db_path.to_str().expect("utf-8 temp path"));
    db::run_migrations(&pool);
    (dir, pool)
}

/// Create a thread with the given title, content and author.
pub fn seed_thread(pool: &DbPool, title: &str, content: &str, author: &str) -> Thread {
    let conn = pool.get().expect("pool");
    thread::create(
        &conn,
        &NewThread {
            title: title.to_string(),
            content: content.to_string(),
            author: author.to_string(),
            tags: vec![],
        },
    )
    .expect("create thread")
}

/// Create a thread and then patch votes/pinned state onto it.
pub fn seed_thread_with(
    pool: &DbPool,
    title: &str,
    votes: i64,
    pinned: bool,
    tag_ids: &[i64],
) -> Thread {
    let conn = pool.get().expect("pool");
    let created = thread::create(
        &conn,
        &NewThread {
            title: title.to_string(),
            content: format!("{title} content"),
            author: "seed".to_string(),
            tags: tag_ids.iter().filter_map(|&id| tag::by_id(id)).collect(),
        },
    )
    .expect("create thread");
    let patch = ThreadPatch {
        votes: Some(votes),
        is_pinned: Some(pinned),
        ..ThreadPatch::default()
    };
    thread::update(&conn, created.id, &patch)
        .expect("patch thread")
        .expect("thread exists")
}

/// Append a comment by the given author.
pub fn seed_comment(pool: &DbPool, thread_id: i64, author: &str, content: &str) {
    let conn = pool.get().expect("pool");
    comment::create(
        &conn,
        thread_id,
        &NewComment { author: author.to_string(), content: content.to_string() },
    )
    .expect("create comment");
}
