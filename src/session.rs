//! In-memory ring of prior picker sessions.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::PickerContext;

/// Names the engine claims for itself; sessions under these names are
/// rejected outright.
pub const RESERVED_SESSION_NAMES: [&str; 2] = ["@action", "@session"];

/// Most sessions kept before the oldest is evicted.
pub const SESSION_CAPACITY: usize = 100;

/// A saved picker run: enough to resume where the user left off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub context: PickerContext,
}

/// Filter for [`SessionStore::load`].
#[derive(Debug, Clone, Default)]
pub struct SessionQuery {
    /// Restrict to sessions with this picker name.
    pub name: Option<String>,
    /// 1-based recency index within the filtered view; 1 (the default) is
    /// the most recent.
    pub number: Option<usize>,
}

/// Ordered ring of at most [`SESSION_CAPACITY`] sessions,
/// most-recent-last; the front is evicted on overflow.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: VecDeque<Session>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a session, evicting the oldest past capacity.
    ///
    /// Reserved names error; any other `@`-prefixed name is silently not
    /// stored (those belong to the engine's own pickers, not to users).
    pub fn save(&mut self, session: Session) -> Result<(), EngineError> {
        if RESERVED_SESSION_NAMES.contains(&session.name.as_str()) {
            return Err(EngineError::reserved_name(session.name));
        }
        if session.name.starts_with('@') {
            return Ok(());
        }
        self.sessions.push_back(session);
        while self.sessions.len() > SESSION_CAPACITY {
            self.sessions.pop_front();
        }
        Ok(())
    }

    /// Sessions in most-recent-first order.
    #[must_use]
    pub fn list(&self) -> Vec<&Session> {
        self.sessions.iter().rev().collect()
    }

    /// Retrieve by name filter and recency index; `None` when out of
    /// range or empty.
    #[must_use]
    pub fn load(&self, query: &SessionQuery) -> Option<&Session> {
        let filtered: Vec<&Session> = self
            .sessions
            .iter()
            .filter(|session| {
                query
                    .name
                    .as_deref()
                    .is_none_or(|name| session.name == name)
            })
            .collect();
        let number = query.number.unwrap_or(1);
        let index = filtered.len().checked_sub(number)?;
        filtered.get(index).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(name: &str) -> Session {
        Session {
            name: name.into(),
            args: Vec::new(),
            context: PickerContext::default(),
        }
    }

    fn session_with_query(name: &str, query: &str) -> Session {
        Session {
            context: PickerContext {
                query: query.into(),
                ..PickerContext::default()
            },
            ..session(name)
        }
    }

    #[test]
    fn ring_caps_at_capacity_and_evicts_the_oldest() {
        let mut store = SessionStore::new();
        for n in 0..105 {
            store.save(session(&format!("s{n}"))).expect("save");
        }
        assert_eq!(store.len(), 100);

        let listed = store.list();
        assert_eq!(listed[0].name, "s104");
        assert_eq!(listed.last().expect("oldest").name, "s5");
    }

    #[test]
    fn load_defaults_to_the_most_recent() {
        let mut store = SessionStore::new();
        store.save(session("first")).expect("save");
        store.save(session("second")).expect("save");

        let loaded = store.load(&SessionQuery::default()).expect("load");
        assert_eq!(loaded.name, "second");
    }

    #[test]
    fn load_filters_by_name_and_recency_number() {
        let mut store = SessionStore::new();
        for (name, query) in [
            ("file", "one"),
            ("buf", "x"),
            ("file", "two"),
            ("buf", "y"),
            ("file", "three"),
        ] {
            store.save(session_with_query(name, query)).expect("save");
        }

        let loaded = store
            .load(&SessionQuery {
                name: Some("file".into()),
                number: Some(2),
            })
            .expect("load");
        assert_eq!(loaded.context.query, "two");
    }

    #[test]
    fn load_out_of_range_returns_none() {
        let mut store = SessionStore::new();
        store.save(session("only")).expect("save");

        assert!(store.load(&SessionQuery {
            name: Some("missing".into()),
            number: None,
        }).is_none());
        assert!(store.load(&SessionQuery {
            name: None,
            number: Some(2),
        }).is_none());
        assert!(SessionStore::new().load(&SessionQuery::default()).is_none());
    }

    #[test]
    fn reserved_names_are_rejected_at_the_save_boundary() {
        let mut store = SessionStore::new();
        assert!(matches!(
            store.save(session("@action")),
            Err(EngineError::ReservedName { .. })
        ));
        assert!(matches!(
            store.save(session("@session")),
            Err(EngineError::ReservedName { .. })
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn other_at_prefixed_names_are_silently_skipped() {
        let mut store = SessionStore::new();
        store.save(session("@scratch")).expect("save");
        assert!(store.is_empty());
    }

    #[test]
    fn saved_context_round_trips() {
        let mut store = SessionStore::new();
        let original = session_with_query("file", "needle");
        store.save(original.clone()).expect("save");

        let loaded = store
            .load(&SessionQuery {
                name: Some("file".into()),
                number: None,
            })
            .expect("load");
        assert_eq!(*loaded, original);

        let encoded = serde_json::to_string(loaded).expect("serialize");
        let decoded: Session = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded, original);
    }
}
