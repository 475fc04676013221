use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

/// A single comment embedded in a thread's comment sequence.
/// `edited_at` is only present once the comment has been edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

/// Payload for appending a comment to a thread.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewComment {
    pub author: String,
    pub content: String,
}

fn row_to_comment(row: &rusqlite::Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        author: row.get("author")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        edited_at: row.get("edited_at")?,
    })
}

/// All comments of a thread, in insertion order.
pub fn find_for_thread(conn: &Connection, thread_id: i64) -> rusqlite::Result<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT id, author, content, created_at, edited_at \
         FROM comments WHERE thread_id = ?1 ORDER BY id",
    )?;
    let rows = stmt
        .query_map(params![thread_id], row_to_comment)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Find a single comment within a thread.
pub fn find_by_id(
    conn: &Connection,
    thread_id: i64,
    comment_id: i64,
) -> rusqlite::Result<Option<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT id, author, content, created_at, edited_at \
         FROM comments WHERE thread_id = ?1 AND id = ?2",
    )?;
    let mut rows = stmt.query_map(params![thread_id, comment_id], row_to_comment)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Append a comment to a thread and bump the thread's update timestamp.
/// Returns the stored comment.
pub fn create(conn: &Connection, thread_id: i64, new: &NewComment) -> rusqlite::Result<Comment> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO comments (thread_id, author, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![thread_id, new.author, new.content, now],
    )?;
    let id = conn.last_insert_rowid();
    conn.execute(
        "UPDATE threads SET updated_at = ?1 WHERE id = ?2",
        params![now, thread_id],
    )?;
    Ok(Comment {
        id,
        author: new.author.clone(),
        content: new.content.clone(),
        created_at: now,
        edited_at: None,
    })
}

/// Replace a comment's content, stamping `edited_at`.
/// Returns the updated comment, or None if it does not exist.
pub fn update_content(
    conn: &Connection,
    thread_id: i64,
    comment_id: i64,
    content: &str,
) -> rusqlite::Result<Option<Comment>> {
    let now = Utc::now();
    let changed = conn.execute(
        "UPDATE comments SET content = ?1, edited_at = ?2 \
         WHERE thread_id = ?3 AND id = ?4",
        params![content, now, thread_id, comment_id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    conn.execute(
        "UPDATE threads SET updated_at = ?1 WHERE id = ?2",
        params![now, thread_id],
    )?;
    find_by_id(conn, thread_id, comment_id)
}

/// Delete a comment. Returns false if it does not exist.
pub fn delete(conn: &Connection, thread_id: i64, comment_id: i64) -> rusqlite::Result<bool> {
    let changed = conn.execute(
        "DELETE FROM comments WHERE thread_id = ?1 AND id = ?2",
        params![thread_id, comment_id],
    )?;
    Ok(changed > 0)
}
