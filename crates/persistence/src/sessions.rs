//! Interview session store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{PersistenceError, ScyllaClient};

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Failed,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "active" => Self::Active,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }
}

/// Durable record for one interview session
///
/// JSON-bearing fields hold serialized documents: `transcript` an array of
/// `{role, content}`, `candidate_profile` an object, `skill_assessments` an
/// array of per-turn scores, `competency_scores` an object,
/// `topics_covered` an array of strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub application_id: Option<String>,
    pub stage_type: String,
    pub status: SessionStatus,
    pub language: String,
    pub created_at: DateTime<Utc>,
    pub transcript: Option<String>,
    pub candidate_profile: Option<String>,
    pub skill_assessments: Option<String>,
    pub difficulty_level: Option<String>,
    pub competency_scores: Option<String>,
    pub topics_covered: Option<String>,
    pub feedback_markdown: Option<String>,
    pub overall_score: Option<i32>,
    pub trace_id: Option<String>,
}

impl SessionRecord {
    pub fn new(session_id: impl Into<String>, stage_type: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            application_id: None,
            stage_type: stage_type.into(),
            status: SessionStatus::Pending,
            language: "en".to_string(),
            created_at: Utc::now(),
            transcript: None,
            candidate_profile: None,
            skill_assessments: None,
            difficulty_level: None,
            competency_scores: None,
            topics_covered: None,
            feedback_markdown: None,
            overall_score: None,
            trace_id: None,
        }
    }
}

/// Per-session intelligence artifacts written at shutdown
#[derive(Debug, Clone, Default)]
pub struct IntelligenceArtifacts {
    pub candidate_profile: Option<String>,
    pub skill_assessments: Option<String>,
    pub difficulty_level: Option<String>,
    pub competency_scores: Option<String>,
    pub topics_covered: Option<String>,
}

/// Session data access
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, PersistenceError>;

    async fn create(&self, record: &SessionRecord) -> Result<(), PersistenceError>;

    /// Update transcript JSON and status
    async fn update_transcript(
        &self,
        session_id: &str,
        transcript_json: &str,
        status: SessionStatus,
    ) -> Result<(), PersistenceError>;

    /// Persist the observability trace ID on the session
    async fn set_trace_id(&self, session_id: &str, trace_id: &str) -> Result<(), PersistenceError>;

    /// Persist intelligence artifacts; `None` fields are left untouched
    async fn update_intelligence(
        &self,
        session_id: &str,
        artifacts: &IntelligenceArtifacts,
    ) -> Result<(), PersistenceError>;

    /// Persist generated feedback and the overall score, marking completion
    async fn update_feedback(
        &self,
        session_id: &str,
        feedback_json: &str,
        overall_score: i32,
    ) -> Result<(), PersistenceError>;
}

/// ScyllaDB-backed session store
#[derive(Clone)]
pub struct ScyllaSessionStore {
    client: ScyllaClient,
}

impl ScyllaSessionStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }
}

type SessionRow = (
    String,
    Option<String>,
    String,
    String,
    Option<String>,
    Option<i64>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<i32>,
    Option<String>,
);

#[async_trait]
impl SessionStore for ScyllaSessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionRecord>, PersistenceError> {
        let query = format!(
            "SELECT session_id, application_id, stage_type, status, language, created_at,
                    transcript, candidate_profile, skill_assessments, difficulty_level,
                    competency_scores, topics_covered, feedback_markdown, overall_score, trace_id
             FROM {}.interview_sessions WHERE session_id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (session_id,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (
                    session_id,
                    application_id,
                    stage_type,
                    status,
                    language,
                    created_at,
                    transcript,
                    candidate_profile,
                    skill_assessments,
                    difficulty_level,
                    competency_scores,
                    topics_covered,
                    feedback_markdown,
                    overall_score,
                    trace_id,
                ): SessionRow = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                return Ok(Some(SessionRecord {
                    session_id,
                    application_id,
                    stage_type,
                    status: SessionStatus::parse_or_default(&status),
                    language: language.unwrap_or_else(|| "en".to_string()),
                    created_at: created_at
                        .and_then(DateTime::from_timestamp_millis)
                        .unwrap_or_else(Utc::now),
                    transcript,
                    candidate_profile,
                    skill_assessments,
                    difficulty_level,
                    competency_scores,
                    topics_covered,
                    feedback_markdown,
                    overall_score,
                    trace_id,
                }));
            }
        }

        Ok(None)
    }

    async fn create(&self, record: &SessionRecord) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.interview_sessions (
                session_id, application_id, stage_type, status, language, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    record.session_id.as_str(),
                    record.application_id.as_deref(),
                    record.stage_type.as_str(),
                    record.status.as_str(),
                    record.language.as_str(),
                    record.created_at.timestamp_millis(),
                ),
            )
            .await?;

        Ok(())
    }

    async fn update_transcript(
        &self,
        session_id: &str,
        transcript_json: &str,
        status: SessionStatus,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.interview_sessions SET transcript = ?, status = ? WHERE session_id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(query, (transcript_json, status.as_str(), session_id))
            .await?;

        Ok(())
    }

    async fn set_trace_id(&self, session_id: &str, trace_id: &str) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.interview_sessions SET trace_id = ? WHERE session_id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(query, (trace_id, session_id))
            .await?;

        Ok(())
    }

    async fn update_intelligence(
        &self,
        session_id: &str,
        artifacts: &IntelligenceArtifacts,
    ) -> Result<(), PersistenceError> {
        // One column per write keeps unset fields untouched.
        let columns: [(&str, &Option<String>); 5] = [
            ("candidate_profile", &artifacts.candidate_profile),
            ("skill_assessments", &artifacts.skill_assessments),
            ("difficulty_level", &artifacts.difficulty_level),
            ("competency_scores", &artifacts.competency_scores),
            ("topics_covered", &artifacts.topics_covered),
        ];

        for (column, value) in columns {
            if let Some(value) = value {
                let query = format!(
                    "UPDATE {}.interview_sessions SET {} = ? WHERE session_id = ?",
                    self.client.keyspace(),
                    column
                );
                self.client
                    .session()
                    .query_unpaged(query, (value.as_str(), session_id))
                    .await?;
            }
        }

        Ok(())
    }

    async fn update_feedback(
        &self,
        session_id: &str,
        feedback_json: &str,
        overall_score: i32,
    ) -> Result<(), PersistenceError> {
        let query = format!(
            "UPDATE {}.interview_sessions
             SET feedback_markdown = ?, overall_score = ?, status = ?
             WHERE session_id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    feedback_json,
                    overall_score,
                    SessionStatus::Completed.as_str(),
                    session_id,
                ),
            )
            .await?;

        Ok(())
    }
}
