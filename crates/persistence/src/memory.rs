//! In-memory stores for development and tests

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use crate::applications::{ApplicationRecord, ApplicationStore};
use crate::sessions::{IntelligenceArtifacts, SessionRecord, SessionStatus, SessionStore};
use crate::PersistenceError;

/// In-memory session store
#[derive(Default)]
pub struct MemorySessionStore {
    records: DashMap<String, SessionRecord>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly (test convenience)
    pub fn insert(&self, record: SessionRecord) {
        self.records.insert(record.session_id.clone(), record);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, PersistenceError> {
        Ok(self.records.get(session_id).map(|r| r.clone()))
    }

    async fn create(&self, record: &SessionRecord) -> Result<(), PersistenceError> {
        self.records
            .insert(record.session_id.clone(), record.clone());
        Ok(())
    }

    async fn update_transcript(
        &self,
        session_id: &str,
        transcript_json: &str,
        status: SessionStatus,
    ) -> Result<(), PersistenceError> {
        let mut record = self
            .records
            .get_mut(session_id)
            .ok_or_else(|| PersistenceError::NotFound(session_id.to_string()))?;
        record.transcript = Some(transcript_json.to_string());
        record.status = status;
        Ok(())
    }

    async fn set_trace_id(&self, session_id: &str, trace_id: &str) -> Result<(), PersistenceError> {
        let mut record = self
            .records
            .get_mut(session_id)
            .ok_or_else(|| PersistenceError::NotFound(session_id.to_string()))?;
        record.trace_id = Some(trace_id.to_string());
        Ok(())
    }

    async fn update_intelligence(
        &self,
        session_id: &str,
        artifacts: &IntelligenceArtifacts,
    ) -> Result<(), PersistenceError> {
        let mut record = self
            .records
            .get_mut(session_id)
            .ok_or_else(|| PersistenceError::NotFound(session_id.to_string()))?;
        if let Some(profile) = &artifacts.candidate_profile {
            record.candidate_profile = Some(profile.clone());
        }
        if let Some(assessments) = &artifacts.skill_assessments {
            record.skill_assessments = Some(assessments.clone());
        }
        if let Some(level) = &artifacts.difficulty_level {
            record.difficulty_level = Some(level.clone());
        }
        if let Some(scores) = &artifacts.competency_scores {
            record.competency_scores = Some(scores.clone());
        }
        if let Some(topics) = &artifacts.topics_covered {
            record.topics_covered = Some(topics.clone());
        }
        Ok(())
    }

    async fn update_feedback(
        &self,
        session_id: &str,
        feedback_json: &str,
        overall_score: i32,
    ) -> Result<(), PersistenceError> {
        let mut record = self
            .records
            .get_mut(session_id)
            .ok_or_else(|| PersistenceError::NotFound(session_id.to_string()))?;
        record.feedback_markdown = Some(feedback_json.to_string());
        record.overall_score = Some(overall_score);
        record.status = SessionStatus::Completed;
        Ok(())
    }
}

/// In-memory application store
#[derive(Default)]
pub struct MemoryApplicationStore {
    records: DashMap<String, ApplicationRecord>,
}

impl MemoryApplicationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, record: ApplicationRecord) {
        self.records.insert(record.id.clone(), record);
    }
}

#[async_trait]
impl ApplicationStore for MemoryApplicationStore {
    async fn get(&self, application_id: &str) -> Result<Option<ApplicationRecord>, PersistenceError> {
        Ok(self.records.get(application_id).map(|r| r.clone()))
    }

    async fn create(&self, record: &ApplicationRecord) -> Result<(), PersistenceError> {
        self.records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_cross_stage_insights(
        &self,
        application_id: &str,
    ) -> Result<Value, PersistenceError> {
        let record = self
            .records
            .get(application_id)
            .ok_or_else(|| PersistenceError::NotFound(application_id.to_string()))?;

        Ok(record
            .cross_stage_insights
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_else(|| Value::Object(Default::default())))
    }

    async fn merge_stage_insights(
        &self,
        application_id: &str,
        stage_type: &str,
        insights: Value,
    ) -> Result<(), PersistenceError> {
        let mut current = self.get_cross_stage_insights(application_id).await?;
        if let Some(map) = current.as_object_mut() {
            map.insert(stage_type.to_string(), insights);
        }

        let mut record = self
            .records
            .get_mut(application_id)
            .ok_or_else(|| PersistenceError::NotFound(application_id.to_string()))?;
        record.cross_stage_insights = Some(
            serde_json::to_string(&current)
                .map_err(|e| PersistenceError::InvalidData(e.to_string()))?,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_session_store_roundtrip() {
        let store = MemorySessionStore::new();
        let record = SessionRecord::new("s1", "hr");
        store.create(&record).await.unwrap();

        store
            .update_transcript("s1", "[]", SessionStatus::Active)
            .await
            .unwrap();
        store.set_trace_id("s1", "trace-1").await.unwrap();

        let loaded = store.get("s1").await.unwrap().unwrap();
        assert_eq!(loaded.status, SessionStatus::Active);
        assert_eq!(loaded.trace_id.as_deref(), Some("trace-1"));
    }

    #[tokio::test]
    async fn test_intelligence_partial_update() {
        let store = MemorySessionStore::new();
        store.create(&SessionRecord::new("s1", "technical")).await.unwrap();

        store
            .update_intelligence(
                "s1",
                &IntelligenceArtifacts {
                    difficulty_level: Some("advanced".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let loaded = store.get("s1").await.unwrap().unwrap();
        assert_eq!(loaded.difficulty_level.as_deref(), Some("advanced"));
        assert!(loaded.candidate_profile.is_none());
    }

    #[tokio::test]
    async fn test_merge_preserves_other_stages() {
        let store = MemoryApplicationStore::new();
        store.create(&ApplicationRecord::new("app-1", "Backend Developer")).await.unwrap();

        store
            .merge_stage_insights("app-1", "hr", json!({"summary": "friendly"}))
            .await
            .unwrap();
        store
            .merge_stage_insights("app-1", "technical", json!({"summary": "strong"}))
            .await
            .unwrap();

        let insights = store.get_cross_stage_insights("app-1").await.unwrap();
        assert_eq!(insights["hr"]["summary"], "friendly");
        assert_eq!(insights["technical"]["summary"], "strong");
    }

    #[tokio::test]
    async fn test_missing_session_errors() {
        let store = MemorySessionStore::new();
        assert!(store
            .update_transcript("ghost", "[]", SessionStatus::Active)
            .await
            .is_err());
        assert!(store.get("ghost").await.unwrap().is_none());
    }
}
