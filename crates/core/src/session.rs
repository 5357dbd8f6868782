//! Browser session state and its registry.
//!
//! Each browser session owns one [`SessionState`]: the result store, the detail view state used
//! by the modal presentation, and a one-shot notice left by the last submission. Sessions are
//! created on a visitor's first request, kept in a [`SessionRegistry`] keyed by a random UUID,
//! and discarded when they go idle for longer than the configured timeout or are ended
//! explicitly. Nothing is persisted.

use crate::store::{RecordId, ResultStore};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use uuid::Uuid;

/// Which record's findings, if any, are shown in the modal dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailView {
    #[default]
    Closed,
    Open(RecordId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

/// Message shown once on the next page render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

/// Everything one browser session knows.
#[derive(Debug, Default)]
pub struct SessionState {
    store: ResultStore,
    detail: DetailView,
    notice: Option<Notice>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ResultStore {
        &mut self.store
    }

    pub fn detail(&self) -> DetailView {
        self.detail
    }

    /// Opens the detail dialog for `id`.
    ///
    /// Returns `false` and leaves the dialog closed when no such record exists.
    pub fn open_detail(&mut self, id: RecordId) -> bool {
        if self.store.record(id).is_none() {
            self.detail = DetailView::Closed;
            return false;
        }
        self.detail = DetailView::Open(id);
        true
    }

    pub fn close_detail(&mut self) {
        self.detail = DetailView::Closed;
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    /// Removes and returns the pending notice.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }
}

/// Shared handle to one session's state.
pub type SessionHandle = Arc<Mutex<SessionState>>;

struct SessionEntry {
    handle: SessionHandle,
    last_seen: Instant,
}

/// All live sessions of the process.
#[derive(Clone)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<Uuid, SessionEntry>>>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Returns the live session for `id`, or starts a new one.
    ///
    /// The returned flag is `true` when a new session was created; the caller must then hand
    /// the new id back to the browser.
    pub async fn resolve(&self, id: Option<Uuid>) -> (Uuid, SessionHandle, bool) {
        self.resolve_at(id, Instant::now()).await
    }

    async fn resolve_at(&self, id: Option<Uuid>, now: Instant) -> (Uuid, SessionHandle, bool) {
        let mut sessions = self.sessions.lock().await;

        if let Some(id) = id {
            if let Some(entry) = sessions.get_mut(&id) {
                if now.saturating_duration_since(entry.last_seen) <= self.idle_timeout {
                    entry.last_seen = now;
                    return (id, entry.handle.clone(), false);
                }
                tracing::debug!("session {} expired", id);
                sessions.remove(&id);
            }
        }

        let idle_timeout = self.idle_timeout;
        let before = sessions.len();
        sessions.retain(|_, entry| now.saturating_duration_since(entry.last_seen) <= idle_timeout);
        let swept = before - sessions.len();
        if swept > 0 {
            tracing::debug!("discarded {} idle sessions", swept);
        }

        let id = Uuid::new_v4();
        let handle: SessionHandle = Arc::new(Mutex::new(SessionState::new()));
        sessions.insert(
            id,
            SessionEntry {
                handle: handle.clone(),
                last_seen: now,
            },
        );
        tracing::info!("started session {}", id);
        (id, handle, true)
    }

    /// Discards the session for `id`. Returns whether it existed.
    pub async fn end(&self, id: Uuid) -> bool {
        let removed = self.sessions.lock().await.remove(&id).is_some();
        if removed {
            tracing::info!("ended session {}", id);
        }
        removed
    }

    /// Number of sessions currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
