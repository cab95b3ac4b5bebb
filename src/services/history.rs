use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Bounded undo/redo history with an index pointer
///
/// `entries[cursor]` is the current entry. Pushing after an undo discards the
/// redo branch; exceeding capacity evicts the oldest entry.
#[derive(Debug, Clone, Serialize)]
pub struct SessionHistory<T> {
    entries: Vec<T>,
    cursor: Option<usize>,
    capacity: usize,
}

impl<T: Clone> SessionHistory<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Replaces the whole history with a single entry
    pub fn store(&mut self, entry: T) {
        self.entries.clear();
        self.entries.push(entry);
        self.cursor = Some(0);
    }

    pub fn push(&mut self, entry: T) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push(entry);
        if self.entries.len() > self.capacity {
            let overflow = self.entries.len() - self.capacity;
            self.entries.drain(..overflow);
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    pub fn undo(&mut self) -> Option<T> {
        let cursor = self.cursor.filter(|c| *c > 0)?;
        self.cursor = Some(cursor - 1);
        self.current()
    }

    pub fn redo(&mut self) -> Option<T> {
        let cursor = self.cursor.filter(|c| c + 1 < self.entries.len())?;
        self.cursor = Some(cursor + 1);
        self.current()
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.entries.len())
    }

    pub fn current(&self) -> Option<T> {
        self.cursor.and_then(|c| self.entries.get(c)).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn snapshot(&self) -> HistorySnapshot<T> {
        HistorySnapshot {
            current: self.current(),
            entries: self.entries.clone(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }
}

/// Serializable view of one session's history
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistorySnapshot<T> {
    pub current: Option<T>,
    pub entries: Vec<T>,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// One session's history plus when it was last written
#[derive(Debug)]
struct TrackedSession<T> {
    history: SessionHistory<T>,
    last_used: u64,
}

#[derive(Debug)]
struct Sessions<T> {
    map: HashMap<String, TrackedSession<T>>,
    clock: u64,
}

impl<T: Clone> Sessions<T> {
    /// Session for writing; opening a new one past `max_sessions` evicts the
    /// least recently written session.
    fn open(&mut self, session_id: &str, capacity: usize, max_sessions: usize) -> &mut SessionHistory<T> {
        self.clock += 1;
        if !self.map.contains_key(session_id) && self.map.len() >= max_sessions {
            let oldest = self
                .map
                .iter()
                .min_by_key(|(_, s)| s.last_used)
                .map(|(id, _)| id.clone());
            if let Some(oldest) = oldest {
                self.map.remove(&oldest);
                tracing::debug!(session = %oldest, "Evicted idle design session");
            }
        }

        let tracked = self
            .map
            .entry(session_id.to_string())
            .or_insert_with(|| TrackedSession {
                history: SessionHistory::new(capacity),
                last_used: 0,
            });
        tracked.last_used = self.clock;
        &mut tracked.history
    }

    fn existing(&mut self, session_id: &str) -> Option<&mut SessionHistory<T>> {
        self.clock += 1;
        let tracked = self.map.get_mut(session_id)?;
        tracked.last_used = self.clock;
        Some(&mut tracked.history)
    }

    fn get(&self, session_id: &str) -> Option<&SessionHistory<T>> {
        self.map.get(session_id).map(|s| &s.history)
    }
}

/// Session id → history, shared across requests
///
/// Holds at most `max_sessions` sessions; the least recently written one is
/// dropped to make room for a new session.
#[derive(Debug, Clone)]
pub struct HistoryStore<T> {
    sessions: Arc<RwLock<Sessions<T>>>,
    capacity: usize,
    max_sessions: usize,
}

impl<T: Clone> HistoryStore<T> {
    pub fn new(capacity: usize, max_sessions: usize) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(Sessions {
                map: HashMap::new(),
                clock: 0,
            })),
            capacity,
            max_sessions: max_sessions.max(1),
        }
    }

    pub async fn store(&self, session_id: &str, entry: T) -> HistorySnapshot<T> {
        let mut sessions = self.sessions.write().await;
        let history = sessions.open(session_id, self.capacity, self.max_sessions);
        history.store(entry);
        history.snapshot()
    }

    pub async fn push(&self, session_id: &str, entry: T) -> HistorySnapshot<T> {
        let mut sessions = self.sessions.write().await;
        let history = sessions.open(session_id, self.capacity, self.max_sessions);
        history.push(entry);
        history.snapshot()
    }

    /// `None` when the session is unknown or has nothing to undo
    pub async fn undo(&self, session_id: &str) -> Option<T> {
        self.sessions.write().await.existing(session_id)?.undo()
    }

    pub async fn redo(&self, session_id: &str) -> Option<T> {
        self.sessions.write().await.existing(session_id)?.redo()
    }

    pub async fn can_undo(&self, session_id: &str) -> bool {
        self.sessions
            .read()
            .await
            .get(session_id)
            .is_some_and(|h| h.can_undo())
    }

    pub async fn can_redo(&self, session_id: &str) -> bool {
        self.sessions
            .read()
            .await
            .get(session_id)
            .is_some_and(|h| h.can_redo())
    }

    pub async fn current(&self, session_id: &str) -> Option<T> {
        self.sessions.read().await.get(session_id)?.current()
    }

    pub async fn snapshot(&self, session_id: &str) -> Option<HistorySnapshot<T>> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .map(|h| h.snapshot())
    }

    /// Drops the session; returns whether it existed
    pub async fn clear(&self, session_id: &str) -> bool {
        self.sessions.write().await.map.remove(session_id).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.map.len()
    }
}
