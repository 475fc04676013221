//! The per-agent vote ledger: which direction, if any, this agent last
//! voted on each thread. The server only stores the aggregate count, so
//! the ledger is persisted locally to survive a session. It is never
//! reconciled against other agents' ledgers.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::models::thread::VoteDirection;

#[derive(Debug, Default)]
pub struct VoteLedger {
    entries: HashMap<i64, VoteDirection>,
    path: Option<PathBuf>,
}

impl VoteLedger {
    /// A ledger without a backing file, for tests and throwaway sessions.
    pub fn in_memory() -> VoteLedger {
        VoteLedger::default()
    }

    /// Load the ledger from a JSON file. A missing or unreadable file
    /// yields an empty ledger bound to the same path.
    pub fn load(path: PathBuf) -> VoteLedger {
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();
        VoteLedger { entries, path: Some(path) }
    }

    pub fn get(&self, thread_id: i64) -> Option<VoteDirection> {
        self.entries.get(&thread_id).copied()
    }

    pub fn set(&mut self, thread_id: i64, direction: VoteDirection) {
        self.entries.insert(thread_id, direction);
        self.persist();
    }

    pub fn clear(&mut self, thread_id: i64) {
        self.entries.remove(&thread_id);
        self.persist();
    }

    /// Restore an entry to a prior value (rollback path).
    pub fn restore(&mut self, thread_id: i64, prior: Option<VoteDirection>) {
        match prior {
            Some(direction) => self.set(thread_id, direction),
            None => self.clear(thread_id),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn persist(&self) {
        let Some(path) = &self.path else { return };
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize vote ledger: {e}");
                return;
            }
        };
        if let Err(e) = std::fs::write(path, json) {
            log::warn!("Failed to persist vote ledger to {}: {e}", path.display());
        }
    }
}
