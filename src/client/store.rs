//! The client data store: an explicit, injected cache of the thread list
//! plus the reconciliation protocol for optimistic mutations.
//!
//! Every mutation moves through three states: Pending (optimistic local
//! state applied, call in flight), Confirmed (server response merged), or
//! Rolled-back (pre-mutation snapshot restored). At most one mutation per
//! thread may be in flight at a time.

use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::Utc;

use super::agent::Agent;
use super::api::{ApiError, ThreadApi};
use super::filter::{self, ThreadQuery};
use super::ledger::VoteLedger;
use crate::models::comment::{Comment, NewComment};
use crate::models::tag::Tag;
use crate::models::thread::{NewThread, Thread, ThreadPatch, ThreadStatus, VoteDirection};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum StoreError {
    Api(ApiError),
    /// A mutation for this thread is still unresolved.
    MutationInFlight(i64),
    /// The thread is not in the local cache.
    UnknownThread(i64),
    ThreadLocked,
    NotPermitted,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Api(e) => write!(f, "{e}"),
            StoreError::MutationInFlight(id) => {
                write!(f, "A mutation for thread {id} is already in flight")
            }
            StoreError::UnknownThread(id) => write!(f, "Thread {id} is not loaded"),
            StoreError::ThreadLocked => write!(f, "Thread is locked"),
            StoreError::NotPermitted => write!(f, "Not permitted"),
        }
    }
}

impl From<ApiError> for StoreError {
    fn from(e: ApiError) -> Self {
        StoreError::Api(e)
    }
}

pub struct ForumStore<A: ThreadApi> {
    api: A,
    agent: Agent,
    timeout: Duration,
    threads: RefCell<Vec<Thread>>,
    ledger: RefCell<VoteLedger>,
    in_flight: RefCell<HashSet<i64>>,
    next_placeholder: Cell<i64>,
}

impl<A: ThreadApi> ForumStore<A> {
    pub fn new(api: A, agent: Agent, ledger: VoteLedger) -> ForumStore<A> {
        ForumStore {
            api,
            agent,
            timeout: DEFAULT_TIMEOUT,
            threads: RefCell::new(Vec::new()),
            ledger: RefCell::new(ledger),
            in_flight: RefCell::new(HashSet::new()),
            next_placeholder: Cell::new(-1),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> ForumStore<A> {
        self.timeout = timeout;
        self
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Snapshot of the cached thread list.
    pub fn threads(&self) -> Vec<Thread> {
        self.threads.borrow().clone()
    }

    pub fn thread(&self, thread_id: i64) -> Option<Thread> {
        self.threads.borrow().iter().find(|t| t.id == thread_id).cloned()
    }

    /// The displayed ordering for the given view parameters.
    pub fn visible(&self, query: &ThreadQuery) -> Vec<Thread> {
        let threads = self.threads.borrow();
        filter::apply(&threads, query).into_iter().cloned().collect()
    }

    /// The direction this agent last voted on a thread, if any.
    pub fn vote_of(&self, thread_id: i64) -> Option<VoteDirection> {
        self.ledger.borrow().get(thread_id)
    }

    /// True while a mutation for the thread is unresolved; UI controls
    /// for the thread should be disabled.
    pub fn is_busy(&self, thread_id: i64) -> bool {
        self.in_flight.borrow().contains(&thread_id)
    }

    /// Replace the cache with the server's thread list.
    pub async fn refresh(&self) -> Result<(), StoreError> {
        let threads = self.call(self.api.list_threads()).await?;
        *self.threads.borrow_mut() = threads;
        Ok(())
    }

    /// Create a thread. Not optimistic: the record only enters the cache
    /// once the server has assigned it an identifier.
    pub async fn create_thread(
        &self,
        title: &str,
        content: &str,
        tags: Vec<Tag>,
    ) -> Result<Thread, StoreError> {
        let new = NewThread {
            title: title.trim().to_string(),
            content: content.trim().to_string(),
            author: self.agent.name.clone(),
            tags,
        };
        let created = self.call(self.api.create_thread(&new)).await?;
        self.threads.borrow_mut().insert(0, created.clone());
        Ok(created)
    }

    /// Cast or switch a vote. A repeat in the already-recorded direction
    /// is a local no-op; nothing is sent.
    pub async fn vote(&self, thread_id: i64, direction: VoteDirection) -> Result<(), StoreError> {
        let prior = self.ledger.borrow().get(thread_id);
        if prior == Some(direction) {
            return Ok(());
        }
        self.begin(thread_id)?;
        let result = self.vote_inner(thread_id, direction, prior).await;
        self.finish(thread_id);
        result
    }

    /// Edit a thread's title and content. Author or moderator only.
    pub async fn edit_thread(
        &self,
        thread_id: i64,
        title: &str,
        content: &str,
    ) -> Result<(), StoreError> {
        let thread = self.cached(thread_id)?;
        if !(self.agent.is_author_of(&thread.author) || self.agent.can_moderate()) {
            return Err(StoreError::NotPermitted);
        }
        let patch = ThreadPatch {
            title: Some(title.trim().to_string()),
            content: Some(content.trim().to_string()),
            ..ThreadPatch::default()
        };
        self.patch_thread(thread_id, patch).await
    }

    /// Pin or unpin a thread. Moderator only.
    pub async fn set_pinned(&self, thread_id: i64, pinned: bool) -> Result<(), StoreError> {
        if !self.agent.can_moderate() {
            return Err(StoreError::NotPermitted);
        }
        self.cached(thread_id)?;
        let patch = ThreadPatch { is_pinned: Some(pinned), ..ThreadPatch::default() };
        self.patch_thread(thread_id, patch).await
    }

    /// Lock, resolve, or reopen a thread. Moderator only.
    pub async fn set_status(
        &self,
        thread_id: i64,
        status: ThreadStatus,
    ) -> Result<(), StoreError> {
        if !self.agent.can_moderate() {
            return Err(StoreError::NotPermitted);
        }
        self.cached(thread_id)?;
        let patch = ThreadPatch { status: Some(status), ..ThreadPatch::default() };
        self.patch_thread(thread_id, patch).await
    }

    /// Delete a thread. Author or moderator only.
    pub async fn delete_thread(&self, thread_id: i64) -> Result<(), StoreError> {
        let thread = self.cached(thread_id)?;
        if !(self.agent.is_author_of(&thread.author) || self.agent.can_moderate()) {
            return Err(StoreError::NotPermitted);
        }
        self.begin(thread_id)?;
        let result = self.delete_thread_inner(thread_id).await;
        self.finish(thread_id);
        result
    }

    /// Append a comment as the current agent. Locked threads refuse
    /// locally before any call is made.
    pub async fn add_comment(&self, thread_id: i64, content: &str) -> Result<(), StoreError> {
        let thread = self.cached(thread_id)?;
        if thread.status == ThreadStatus::Locked {
            return Err(StoreError::ThreadLocked);
        }
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(ApiError::Validation("Comment content is required".to_string()).into());
        }
        self.begin(thread_id)?;
        let result = self.add_comment_inner(thread_id, &content).await;
        self.finish(thread_id);
        result
    }

    /// Edit one of this agent's comments (moderators may edit any).
    pub async fn edit_comment(
        &self,
        thread_id: i64,
        comment_id: i64,
        content: &str,
    ) -> Result<(), StoreError> {
        let comment = self.cached_comment(thread_id, comment_id)?;
        if !(self.agent.is_author_of(&comment.author) || self.agent.can_moderate()) {
            return Err(StoreError::NotPermitted);
        }
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(ApiError::Validation("Comment content is required".to_string()).into());
        }
        self.begin(thread_id)?;
        let result = self.edit_comment_inner(thread_id, comment_id, &content).await;
        self.finish(thread_id);
        result
    }

    /// Delete one of this agent's comments (moderators may delete any).
    pub async fn delete_comment(
        &self,
        thread_id: i64,
        comment_id: i64,
    ) -> Result<(), StoreError> {
        let comment = self.cached_comment(thread_id, comment_id)?;
        if !(self.agent.is_author_of(&comment.author) || self.agent.can_moderate()) {
            return Err(StoreError::NotPermitted);
        }
        self.begin(thread_id)?;
        let result = self.delete_comment_inner(thread_id, comment_id).await;
        self.finish(thread_id);
        result
    }

    // --- Reconciliation internals ---

    async fn vote_inner(
        &self,
        thread_id: i64,
        direction: VoteDirection,
        prior: Option<VoteDirection>,
    ) -> Result<(), StoreError> {
        let snapshot = self.cached(thread_id)?.votes;

        // No prior entry: one step. Prior opposite entry: two (undo one,
        // apply one in the new direction).
        let delta = if prior.is_some() { 2 * direction.delta() } else { direction.delta() };
        self.set_votes(thread_id, snapshot + delta);
        self.ledger.borrow_mut().set(thread_id, direction);

        let first = match self.call(self.api.vote(thread_id, direction)).await {
            Ok(count) => count,
            Err(e) => {
                self.set_votes(thread_id, snapshot);
                self.ledger.borrow_mut().restore(thread_id, prior);
                return Err(e.into());
            }
        };

        if prior.is_none() {
            self.set_votes(thread_id, first);
            return Ok(());
        }

        // The service only applies flat +-1 per call, so a switch is an
        // explicit undo-then-apply pair in the new direction.
        match self.call(self.api.vote(thread_id, direction)).await {
            Ok(second) => {
                self.set_votes(thread_id, second);
                Ok(())
            }
            Err(e) => {
                // The undo landed but the re-apply did not: the server's
                // count from the first call is authoritative and no vote
                // of ours remains recorded.
                self.set_votes(thread_id, first);
                self.ledger.borrow_mut().clear(thread_id);
                Err(e.into())
            }
        }
    }

    async fn patch_thread(&self, thread_id: i64, patch: ThreadPatch) -> Result<(), StoreError> {
        self.begin(thread_id)?;
        let result = self.patch_thread_inner(thread_id, patch).await;
        self.finish(thread_id);
        result
    }

    async fn patch_thread_inner(
        &self,
        thread_id: i64,
        patch: ThreadPatch,
    ) -> Result<(), StoreError> {
        let snapshot = self.cached(thread_id)?;

        {
            let mut threads = self.threads.borrow_mut();
            if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
                apply_patch(thread, &patch);
            }
        }

        match self.call(self.api.update_thread(thread_id, &patch)).await {
            Ok(updated) => {
                self.replace(thread_id, updated);
                Ok(())
            }
            Err(e) => {
                self.replace(thread_id, snapshot);
                Err(e.into())
            }
        }
    }

    async fn delete_thread_inner(&self, thread_id: i64) -> Result<(), StoreError> {
        let (position, snapshot) = {
            let threads = self.threads.borrow();
            match threads.iter().position(|t| t.id == thread_id) {
                Some(pos) => (pos, threads[pos].clone()),
                None => return Err(StoreError::UnknownThread(thread_id)),
            }
        };
        self.threads.borrow_mut().remove(position);

        match self.call(self.api.delete_thread(thread_id)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let mut threads = self.threads.borrow_mut();
                let position = position.min(threads.len());
                threads.insert(position, snapshot);
                Err(e.into())
            }
        }
    }

    async fn add_comment_inner(&self, thread_id: i64, content: &str) -> Result<(), StoreError> {
        let placeholder_id = self.next_placeholder.get();
        self.next_placeholder.set(placeholder_id - 1);

        let placeholder = Comment {
            id: placeholder_id,
            author: self.agent.name.clone(),
            content: content.to_string(),
            created_at: Utc::now(),
            edited_at: None,
        };
        {
            let mut threads = self.threads.borrow_mut();
            match threads.iter_mut().find(|t| t.id == thread_id) {
                Some(thread) => thread.comments.push(placeholder),
                None => return Err(StoreError::UnknownThread(thread_id)),
            }
        }

        let new = NewComment { author: self.agent.name.clone(), content: content.to_string() };
        let created = match self.call(self.api.add_comment(thread_id, &new)).await {
            Ok(comment) => comment,
            Err(e) => {
                self.remove_cached_comment(thread_id, placeholder_id);
                return Err(e.into());
            }
        };

        // Swap the placeholder for the server comment first: temporary
        // identifiers must not outlive a resolved create.
        {
            let mut threads = self.threads.borrow_mut();
            if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
                if let Some(slot) =
                    thread.comments.iter_mut().find(|c| c.id == placeholder_id)
                {
                    *slot = created;
                }
            }
        }

        // The create endpoint returns only the comment; fetch the thread
        // for the authoritative sequence.
        match self.call(self.api.get_thread(thread_id)).await {
            Ok(thread) => self.replace(thread_id, thread),
            Err(e) => log::warn!("Comment confirmed but thread {thread_id} refresh failed: {e}"),
        }
        Ok(())
    }

    async fn edit_comment_inner(
        &self,
        thread_id: i64,
        comment_id: i64,
        content: &str,
    ) -> Result<(), StoreError> {
        let snapshot = self.cached_comment(thread_id, comment_id)?;

        {
            let mut threads = self.threads.borrow_mut();
            if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
                if let Some(comment) = thread.comments.iter_mut().find(|c| c.id == comment_id) {
                    comment.content = content.to_string();
                    comment.edited_at = Some(Utc::now());
                }
            }
        }

        match self.call(self.api.edit_comment(thread_id, comment_id, content)).await {
            Ok(updated) => {
                self.replace_cached_comment(thread_id, comment_id, updated);
                Ok(())
            }
            Err(e) => {
                self.replace_cached_comment(thread_id, comment_id, snapshot);
                Err(e.into())
            }
        }
    }

    async fn delete_comment_inner(
        &self,
        thread_id: i64,
        comment_id: i64,
    ) -> Result<(), StoreError> {
        let (position, snapshot) = {
            let threads = self.threads.borrow();
            let Some(thread) = threads.iter().find(|t| t.id == thread_id) else {
                return Err(StoreError::UnknownThread(thread_id));
            };
            match thread.comments.iter().position(|c| c.id == comment_id) {
                Some(pos) => (pos, thread.comments[pos].clone()),
                None => return Err(StoreError::UnknownThread(thread_id)),
            }
        };
        self.remove_cached_comment(thread_id, comment_id);

        match self.call(self.api.delete_comment(thread_id, comment_id)).await {
            Ok(()) => Ok(()),
            Err(e) => {
                let mut threads = self.threads.borrow_mut();
                if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
                    let position = position.min(thread.comments.len());
                    thread.comments.insert(position, snapshot);
                }
                Err(e.into())
            }
        }
    }

    // --- Cache bookkeeping ---

    fn begin(&self, thread_id: i64) -> Result<(), StoreError> {
        if !self.in_flight.borrow_mut().insert(thread_id) {
            return Err(StoreError::MutationInFlight(thread_id));
        }
        Ok(())
    }

    fn finish(&self, thread_id: i64) {
        self.in_flight.borrow_mut().remove(&thread_id);
    }

    async fn call<T>(
        &self,
        fut: impl Future<Output = Result<T, ApiError>>,
    ) -> Result<T, ApiError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout),
        }
    }

    fn cached(&self, thread_id: i64) -> Result<Thread, StoreError> {
        self.thread(thread_id).ok_or(StoreError::UnknownThread(thread_id))
    }

    fn cached_comment(&self, thread_id: i64, comment_id: i64) -> Result<Comment, StoreError> {
        self.threads
            .borrow()
            .iter()
            .find(|t| t.id == thread_id)
            .and_then(|t| t.comments.iter().find(|c| c.id == comment_id))
            .cloned()
            .ok_or(StoreError::UnknownThread(thread_id))
    }

    fn set_votes(&self, thread_id: i64, votes: i64) {
        let mut threads = self.threads.borrow_mut();
        if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
            thread.votes = votes;
        }
    }

    fn replace(&self, thread_id: i64, replacement: Thread) {
        let mut threads = self.threads.borrow_mut();
        if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
            *thread = replacement;
        }
    }

    fn replace_cached_comment(&self, thread_id: i64, comment_id: i64, replacement: Comment) {
        let mut threads = self.threads.borrow_mut();
        if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
            if let Some(comment) = thread.comments.iter_mut().find(|c| c.id == comment_id) {
                *comment = replacement;
            }
        }
    }

    fn remove_cached_comment(&self, thread_id: i64, comment_id: i64) {
        let mut threads = self.threads.borrow_mut();
        if let Some(thread) = threads.iter_mut().find(|t| t.id == thread_id) {
            thread.comments.retain(|c| c.id != comment_id);
        }
    }
}

fn apply_patch(thread: &mut Thread, patch: &ThreadPatch) {
    if let Some(title) = &patch.title {
        thread.title = title.clone();
    }
    if let Some(content) = &patch.content {
        thread.content = content.clone();
    }
    if let Some(status) = patch.status {
        thread.status = status;
    }
    if let Some(pinned) = patch.is_pinned {
        thread.is_pinned = pinned;
    }
    if let Some(votes) = patch.votes {
        thread.votes = votes;
    }
    if let Some(tags) = &patch.tags {
        thread.tags = tags.clone();
    }
    thread.updated_at = Utc::now();
}
