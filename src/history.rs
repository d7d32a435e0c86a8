//! In-memory conversation history, partitioned by session key.
//!
//! Histories live for the life of the process and are never evicted; a
//! restart starts every session fresh. Each session's turn list sits behind
//! its own lock so concurrent requests on the same key serialize while
//! different sessions proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::models::Turn;

#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Vec<Turn>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The turn list for a session key, created empty on first use.
    fn history(&self, session_id: &str) -> Arc<Mutex<Vec<Turn>>> {
        if let Some(existing) = self
            .sessions
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(session_id)
        {
            return Arc::clone(existing);
        }

        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        Arc::clone(sessions.entry(session_id.to_string()).or_default())
    }

    /// A copy of the session's turns in chronological order.
    pub fn snapshot(&self, session_id: &str) -> Vec<Turn> {
        let history = self.history(session_id);
        let turns = history.lock().unwrap_or_else(|e| e.into_inner());
        turns.clone()
    }

    /// Append one completed exchange to the session.
    pub fn append(&self, session_id: &str, user: String, assistant: String) {
        let history = self.history(session_id);
        let mut turns = history.lock().unwrap_or_else(|e| e.into_inner());
        turns.push(Turn { user, assistant });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turns_accumulate_in_order() {
        let store = SessionStore::new();
        store.append("s1", "first?".into(), "one".into());
        store.append("s1", "second?".into(), "two".into());

        let turns = store.snapshot("s1");
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].user, "first?");
        assert_eq!(turns[0].assistant, "one");
        assert_eq!(turns[1].user, "second?");
    }

    #[test]
    fn sessions_are_isolated() {
        let store = SessionStore::new();
        store.append("alpha", "q".into(), "a".into());

        assert_eq!(store.snapshot("alpha").len(), 1);
        assert!(store.snapshot("beta").is_empty());
    }

    #[test]
    fn unknown_session_snapshots_empty() {
        let store = SessionStore::new();
        assert!(store.snapshot("never-seen").is_empty());
    }
}
