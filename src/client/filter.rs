//! Pure filter/sort engine over the cached thread list. Produces the
//! displayed ordering; never mutates the cache.

use crate::models::thread::{Thread, ThreadStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    All,
    Popular,
    Recent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Latest,
    Oldest,
    MostVoted,
    MostDiscussed,
}

/// The active view parameters: tab, free-text search, selected tag ids,
/// status filter, and the explicit sort key (tab All only).
#[derive(Debug, Clone, Default)]
pub struct ThreadQuery {
    pub tab: Tab,
    pub search: String,
    pub tags: Vec<i64>,
    pub status: Option<ThreadStatus>,
    pub sort: SortKey,
}

/// Apply the query to a thread slice, returning references in display
/// order. Pinned threads always come first, each partition keeping its
/// prior relative order.
pub fn apply<'a>(threads: &'a [Thread], query: &ThreadQuery) -> Vec<&'a Thread> {
    let mut out: Vec<&Thread> = threads.iter().collect();

    match query.tab {
        Tab::Popular => {
            out.retain(|t| t.votes > 0);
            out.sort_by(|a, b| b.votes.cmp(&a.votes));
        }
        Tab::Recent => {
            out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        }
        Tab::All => {}
    }

    if !query.search.is_empty() {
        let needle = query.search.to_lowercase();
        out.retain(|t| {
            t.title.to_lowercase().contains(&needle) || t.content.to_lowercase().contains(&needle)
        });
    }

    if !query.tags.is_empty() {
        out.retain(|t| t.tags.iter().any(|tag| query.tags.contains(&tag.id)));
    }

    if let Some(status) = query.status {
        out.retain(|t| t.status == status);
    }

    if query.tab == Tab::All {
        match query.sort {
            SortKey::Latest => out.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortKey::Oldest => out.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortKey::MostVoted => out.sort_by(|a, b| b.votes.cmp(&a.votes)),
            SortKey::MostDiscussed => {
                out.sort_by(|a, b| b.comments.len().cmp(&a.comments.len()))
            }
        }
    }

    // Stable partition, not a re-sort: each sublist keeps its order.
    let (pinned, unpinned): (Vec<&Thread>, Vec<&Thread>) =
        out.into_iter().partition(|t| t.is_pinned);
    pinned.into_iter().chain(unpinned).collect()
}
