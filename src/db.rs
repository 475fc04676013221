use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::models::thread::{self, NewThread, ThreadPatch};
use crate::models::{comment, tag};

pub type DbPool = Pool<SqliteConnectionManager>;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub fn init_pool(database_url: &str) -> DbPool {
    let manager = SqliteConnectionManager::file(database_url).with_init(|conn| {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        Ok(())
    });
    Pool::builder()
        .max_size(8)
        .build(manager)
        .expect("Failed to create DB pool")
}

pub fn run_migrations(pool: &DbPool) {
    let conn = pool.get().expect("Failed to get DB connection for migrations");
    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");
}

/// Seed a handful of demo threads when the store is empty.
pub fn seed_demo(pool: &DbPool) {
    let conn = pool.get().expect("Failed to get DB connection for seeding");

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM threads", [], |row| row.get(0))
        .unwrap_or(0);
    if count > 0 {
        log::info!("Database already has {count} threads, skipping demo seed");
        return;
    }

    let demo: [(&str, &str, &str, i64, &[i64], &[&str]); 4] = [
        (
            "Fix Tag",
            "We need to fix the tag component in our UI library. Currently, it breaks \
             layout when used inside flex containers and has z-index issues with dropdowns.",
            "DevTeam",
            4,
            &[3, 6],
            &["Reproduced on the settings page", "Happens in Safari too"],
        ),
        (
            "MongoDB",
            "Working on MongoDB integration and connection pooling. We need to optimize \
             our database queries to handle high traffic scenarios.",
            "DBAdmin",
            12,
            &[],
            &["Indexes on createdAt helped a lot"],
        ),
        (
            "Hello There",
            "Just connected to a locally run MongoDB instance. The setup process was \
             surprisingly smooth.",
            "NewUser",
            1,
            &[],
            &["Welcome to the team!"],
        ),
        (
            "Authentication Flow",
            "Discussing the new authentication flow implementation. We're considering \
             moving from session-based auth to JWT tokens.",
            "SecurityTeam",
            8,
            &[4, 5],
            &["Token refresh needs a spike", "What about revocation?"],
        ),
    ];

    let mut created = 0usize;
    for (title, content, author, votes, tag_ids, comments) in demo {
        let tags = tag_ids.iter().filter_map(|&id| tag::by_id(id)).collect();
        let new = NewThread {
            title: title.to_string(),
            content: content.to_string(),
            author: author.to_string(),
            tags,
        };
        match thread::create(&conn, &new) {
            Ok(t) => {
                let patch = ThreadPatch { votes: Some(votes), ..ThreadPatch::default() };
                if let Err(e) = thread::update(&conn, t.id, &patch) {
                    log::warn!("Seed: failed to set votes on '{title}': {e}");
                }
                for text in comments {
                    let new_comment = comment::NewComment {
                        author: "You".to_string(),
                        content: text.to_string(),
                    };
                    if let Err(e) = comment::create(&conn, t.id, &new_comment) {
                        log::warn!("Seed: failed to add comment to '{title}': {e}");
                    }
                }
                created += 1;
            }
            Err(e) => log::error!("Seed: failed to create '{title}': {e}"),
        }
    }
    log::info!("Demo seed complete: created={created}");
}
