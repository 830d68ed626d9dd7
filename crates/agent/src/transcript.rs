//! Transcript management
//!
//! Captures the conversation and persists it to the session record. The
//! orchestrator's loop drives periodic saves; the final save at shutdown
//! wins over any in-flight periodic save because the loop has exited by
//! then.

use std::sync::Arc;

use interview_agent_core::{Transcript, Turn, TurnRole};
use interview_agent_persistence::{SessionStatus, SessionStore};

/// Transcript capture with periodic persistence
pub struct TranscriptManager {
    session_id: String,
    transcript: Transcript,
    last_save_count: usize,
    store: Arc<dyn SessionStore>,
}

impl TranscriptManager {
    pub fn new(session_id: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            session_id: session_id.into(),
            transcript: Transcript::new(),
            last_save_count: 0,
            store,
        }
    }

    /// Append a message in delivery order; empty content is dropped
    pub fn add_message(&mut self, role: TurnRole, content: &str) {
        if content.is_empty() {
            return;
        }
        let preview: String = content.chars().take(100).collect();
        tracing::info!(role = %role, "Transcript [{role}]: {preview}...");
        self.transcript.push(Turn::new(role, content));
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Whether the transcript grew since the last save
    pub fn dirty(&self) -> bool {
        self.transcript.len() > self.last_save_count
    }

    /// Persist the transcript; `final_save` marks the session completed
    ///
    /// Failures are logged and swallowed; the next periodic tick retries.
    pub async fn save(&mut self, final_save: bool) {
        if self.transcript.is_empty() && !final_save {
            return;
        }

        let status = if final_save {
            SessionStatus::Completed
        } else {
            SessionStatus::Active
        };

        let json = match self.transcript.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Transcript serialization failed");
                return;
            }
        };

        match self
            .store
            .update_transcript(&self.session_id, &json, status)
            .await
        {
            Ok(()) => {
                self.last_save_count = self.transcript.len();
                tracing::info!(
                    messages = self.transcript.len(),
                    status = status.as_str(),
                    "Transcript saved"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Transcript save failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interview_agent_persistence::{MemorySessionStore, SessionRecord};

    fn manager() -> (TranscriptManager, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        store.insert(SessionRecord::new("s1", "hr"));
        (TranscriptManager::new("s1", store.clone()), store)
    }

    #[tokio::test]
    async fn test_periodic_save_marks_active() {
        let (mut manager, store) = manager();
        manager.add_message(TurnRole::Assistant, "Hello");
        manager.add_message(TurnRole::User, "Hi");
        assert!(manager.dirty());

        manager.save(false).await;
        assert!(!manager.dirty());

        let record = store.get("s1").await.unwrap().unwrap();
        assert_eq!(record.status, SessionStatus::Active);
        let saved = Transcript::from_json(record.transcript.as_deref().unwrap()).unwrap();
        assert_eq!(saved.len(), 2);
    }

    #[tokio::test]
    async fn test_final_save_marks_completed() {
        let (mut manager, store) = manager();
        manager.add_message(TurnRole::Assistant, "Hello");
        manager.save(true).await;

        let record = store.get("s1").await.unwrap().unwrap();
        assert_eq!(record.status, SessionStatus::Completed);
    }

    #[tokio::test]
    async fn test_empty_final_save_still_completes() {
        let (mut manager, store) = manager();
        manager.save(true).await;
        let record = store.get("s1").await.unwrap().unwrap();
        assert_eq!(record.status, SessionStatus::Completed);
        assert_eq!(record.transcript.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_empty_content_dropped() {
        let (mut manager, _) = manager();
        manager.add_message(TurnRole::User, "");
        assert_eq!(manager.transcript().len(), 0);
    }

    #[tokio::test]
    async fn test_save_failure_keeps_dirty() {
        let store = Arc::new(MemorySessionStore::new());
        // No record seeded: update fails
        let mut manager = TranscriptManager::new("ghost", store);
        manager.add_message(TurnRole::User, "hello");
        manager.save(false).await;
        assert!(manager.dirty());
    }
}
