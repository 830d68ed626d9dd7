//! Application store
//!
//! The application aggregate carries shared interview context (resume text,
//! job description, role) and the cross-stage insight memory keyed by stage
//! type. The core reads and writes only those fields.

use async_trait::async_trait;
use serde_json::Value;

use crate::{PersistenceError, ScyllaClient};

/// Durable record for one interview application
#[derive(Debug, Clone)]
pub struct ApplicationRecord {
    pub id: String,
    pub job_role: String,
    pub resume_text: String,
    pub job_description: String,
    /// JSON object keyed by stage_type
    pub cross_stage_insights: Option<String>,
}

impl ApplicationRecord {
    pub fn new(id: impl Into<String>, job_role: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            job_role: job_role.into(),
            resume_text: String::new(),
            job_description: String::new(),
            cross_stage_insights: None,
        }
    }
}

/// Application data access
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn get(&self, application_id: &str) -> Result<Option<ApplicationRecord>, PersistenceError>;

    async fn create(&self, record: &ApplicationRecord) -> Result<(), PersistenceError>;

    /// Cross-stage insights object keyed by stage type; empty object when
    /// nothing has been written yet
    async fn get_cross_stage_insights(
        &self,
        application_id: &str,
    ) -> Result<Value, PersistenceError>;

    /// Merge one stage's insights into the stored object
    ///
    /// Read-modify-write with last-writer-wins; concurrent stages of one
    /// application are not expected. Other stages' keys are preserved.
    async fn merge_stage_insights(
        &self,
        application_id: &str,
        stage_type: &str,
        insights: Value,
    ) -> Result<(), PersistenceError>;
}

/// ScyllaDB-backed application store
#[derive(Clone)]
pub struct ScyllaApplicationStore {
    client: ScyllaClient,
}

impl ScyllaApplicationStore {
    pub fn new(client: ScyllaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ApplicationStore for ScyllaApplicationStore {
    async fn get(&self, application_id: &str) -> Result<Option<ApplicationRecord>, PersistenceError> {
        let query = format!(
            "SELECT id, job_role, resume_text, job_description, cross_stage_insights
             FROM {}.interview_applications WHERE id = ?",
            self.client.keyspace()
        );

        let result = self
            .client
            .session()
            .query_unpaged(query, (application_id,))
            .await?;

        if let Some(rows) = result.rows {
            if let Some(row) = rows.into_iter().next() {
                let (id, job_role, resume_text, job_description, cross_stage_insights): (
                    String,
                    Option<String>,
                    Option<String>,
                    Option<String>,
                    Option<String>,
                ) = row
                    .into_typed()
                    .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

                return Ok(Some(ApplicationRecord {
                    id,
                    job_role: job_role.unwrap_or_default(),
                    resume_text: resume_text.unwrap_or_default(),
                    job_description: job_description.unwrap_or_default(),
                    cross_stage_insights,
                }));
            }
        }

        Ok(None)
    }

    async fn create(&self, record: &ApplicationRecord) -> Result<(), PersistenceError> {
        let query = format!(
            "INSERT INTO {}.interview_applications (
                id, job_role, resume_text, job_description, cross_stage_insights, created_at
            ) VALUES (?, ?, ?, ?, ?, ?)",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(
                query,
                (
                    record.id.as_str(),
                    record.job_role.as_str(),
                    record.resume_text.as_str(),
                    record.job_description.as_str(),
                    record.cross_stage_insights.as_deref(),
                    chrono::Utc::now().timestamp_millis(),
                ),
            )
            .await?;

        Ok(())
    }

    async fn get_cross_stage_insights(
        &self,
        application_id: &str,
    ) -> Result<Value, PersistenceError> {
        let record = self
            .get(application_id)
            .await?
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

        let json = serde_json::to_string(&current)
            .map_err(|e| PersistenceError::InvalidData(e.to_string()))?;

        let query = format!(
            "UPDATE {}.interview_applications SET cross_stage_insights = ? WHERE id = ?",
            self.client.keyspace()
        );

        self.client
            .session()
            .query_unpaged(query, (json.as_str(), application_id))
            .await?;

        Ok(())
    }
}
