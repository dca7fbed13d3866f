//! In-memory session storage for a single runner instance.

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use agenthub_types::agent::UserIdentity;
use agenthub_types::llm::Message;
use agenthub_types::runner::{RunnerError, Session, SessionId};

struct SessionEntry {
    session: Session,
    history: Vec<Message>,
}

/// Sessions and their message history, owned by one runner.
///
/// Dropped together with the runner at the end of a request.
#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<SessionId, SessionEntry>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session. Rejects an id that is already in use.
    pub fn create(
        &self,
        id: SessionId,
        app_name: &str,
        user: &UserIdentity,
    ) -> Result<Session, RunnerError> {
        match self.sessions.entry(id.clone()) {
            Entry::Occupied(_) => Err(RunnerError::SessionExists(id)),
            Entry::Vacant(slot) => {
                let session = Session {
                    id,
                    app_name: app_name.to_string(),
                    user: user.clone(),
                    created_at: Utc::now(),
                };
                slot.insert(SessionEntry {
                    session: session.clone(),
                    history: Vec::new(),
                });
                Ok(session)
            }
        }
    }

    pub fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.get(id).map(|entry| entry.session.clone())
    }

    /// Messages recorded so far, oldest first.
    pub fn history(&self, id: &SessionId) -> Result<Vec<Message>, RunnerError> {
        self.sessions
            .get(id)
            .map(|entry| entry.history.clone())
            .ok_or_else(|| RunnerError::SessionNotFound(id.clone()))
    }

    pub fn append(&self, id: &SessionId, message: Message) -> Result<(), RunnerError> {
        let mut entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| RunnerError::SessionNotFound(id.clone()))?;
        entry.history.push(message);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
