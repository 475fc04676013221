use chrono::{DateTime, Utc};
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use super::comment::{self, Comment};
use super::tag::Tag;

/// Thread lifecycle status. Wire format is the lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    Open,
    Resolved,
    Locked,
}

impl ThreadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ThreadStatus::Open => "open",
            ThreadStatus::Resolved => "resolved",
            ThreadStatus::Locked => "locked",
        }
    }

    fn from_db(s: &str) -> ThreadStatus {
        match s {
            "resolved" => ThreadStatus::Resolved,
            "locked" => ThreadStatus::Locked,
            _ => ThreadStatus::Open,
        }
    }
}

/// Direction of a vote. The server applies a flat +1/-1 per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn delta(self) -> i64 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    pub fn opposite(self) -> VoteDirection {
        match self {
            VoteDirection::Up => VoteDirection::Down,
            VoteDirection::Down => VoteDirection::Up,
        }
    }
}

/// A forum thread with its embedded comment sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub votes: i64,
    pub status: ThreadStatus,
    pub is_pinned: bool,
    pub tags: Vec<Tag>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a thread. Author and tags are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewThread {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Typed partial update of a thread's mutable fields. Absent fields are
/// left untouched; unknown fields are rejected outright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ThreadPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ThreadStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_pinned: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
}

fn tags_to_db(tags: &[Tag]) -> String {
    serde_json::to_string(tags).unwrap_or_else(|_| "[]".to_string())
}

fn row_to_thread(row: &rusqlite::Row) -> rusqlite::Result<Thread> {
    let status: String = row.get("status")?;
    let tags: String = row.get("tags")?;
    Ok(Thread {
        id: row.get("id")?,
        title: row.get("title")?,
        content: row.get("content")?,
        author: row.get("author")?,
        votes: row.get("votes")?,
        status: ThreadStatus::from_db(&status),
        is_pinned: row.get::<_, i64>("is_pinned")? != 0,
        tags: serde_json::from_str(&tags).unwrap_or_default(),
        comments: Vec::new(),
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

const THREAD_COLUMNS: &str =
    "id, title, content, author, votes, status, is_pinned, tags, created_at, updated_at";

/// All threads, pinned first, then newest first, with comments attached.
pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<Thread>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {THREAD_COLUMNS} FROM threads ORDER BY is_pinned DESC, created_at DESC"
    ))?;
    let mut threads = stmt
        .query_map([], row_to_thread)?
        .collect::<Result<Vec<_>, _>>()?;
    for thread in &mut threads {
        thread.comments = comment::find_for_thread(conn, thread.id)?;
    }
    Ok(threads)
}

/// A single thread by id, with comments attached.
pub fn find_by_id(conn: &Connection, id: i64) -> rusqlite::Result<Option<Thread>> {
    let mut stmt =
        conn.prepare(&format!("SELECT {THREAD_COLUMNS} FROM threads WHERE id = ?1"))?;
    let mut rows = stmt.query_map(params![id], row_to_thread)?;
    match rows.next() {
        Some(row) => {
            let mut thread = row?;
            thread.comments = comment::find_for_thread(conn, thread.id)?;
            Ok(Some(thread))
        }
        None => Ok(None),
    }
}

/// The status of a thread, or None if the thread does not exist.
pub fn status_of(conn: &Connection, id: i64) -> rusqlite::Result<Option<ThreadStatus>> {
    let mut stmt = conn.prepare("SELECT status FROM threads WHERE id = ?1")?;
    let mut rows = stmt.query_map(params![id], |row| row.get::<_, String>(0))?;
    match rows.next() {
        Some(row) => Ok(Some(ThreadStatus::from_db(&row?))),
        None => Ok(None),
    }
}

/// Create a thread: votes 0, status open, unpinned, no comments.
pub fn create(conn: &Connection, new: &NewThread) -> rusqlite::Result<Thread> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO threads (title, content, author, tags, created_at, updated_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![new.title, new.content, new.author, tags_to_db(&new.tags), now],
    )?;
    let id = conn.last_insert_rowid();
    Ok(Thread {
        id,
        title: new.title.clone(),
        content: new.content.clone(),
        author: new.author.clone(),
        votes: 0,
        status: ThreadStatus::Open,
        is_pinned: false,
        tags: new.tags.clone(),
        comments: Vec::new(),
        created_at: now,
        updated_at: now,
    })
}

/// Apply a patch to a thread's mutable fields and bump `updated_at`.
/// Returns the full updated record, or None if the thread does not exist.
pub fn update(conn: &Connection, id: i64, patch: &ThreadPatch) -> rusqlite::Result<Option<Thread>> {
    let tags = patch.tags.as_deref().map(tags_to_db);
    let changed = conn.execute(
        "UPDATE threads SET \
            title = COALESCE(?1, title), \
            content = COALESCE(?2, content), \
            status = COALESCE(?3, status), \
            is_pinned = COALESCE(?4, is_pinned), \
            votes = COALESCE(?5, votes), \
            tags = COALESCE(?6, tags), \
            updated_at = ?7 \
         WHERE id = ?8",
        params![
            patch.title,
            patch.content,
            patch.status.map(ThreadStatus::as_str),
            patch.is_pinned,
            patch.votes,
            tags,
            Utc::now(),
            id
        ],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    find_by_id(conn, id)
}

/// Delete a thread and its comments. Returns false if it does not exist.
pub fn delete(conn: &Connection, id: i64) -> rusqlite::Result<bool> {
    let changed = conn.execute("DELETE FROM threads WHERE id = ?1", params![id])?;
    Ok(changed > 0)
}

/// Apply a flat vote delta atomically and return the new count,
/// or None if the thread does not exist.
pub fn vote(conn: &Connection, id: i64, direction: VoteDirection) -> rusqlite::Result<Option<i64>> {
    let changed = conn.execute(
        "UPDATE threads SET votes = votes + ?1, updated_at = ?2 WHERE id = ?3",
        params![direction.delta(), Utc::now(), id],
    )?;
    if changed == 0 {
        return Ok(None);
    }
    conn.query_row("SELECT votes FROM threads WHERE id = ?1", params![id], |row| row.get(0))
        .map(Some)
}
