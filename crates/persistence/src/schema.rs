//! ScyllaDB schema creation

use crate::error::PersistenceError;
use scylla::Session;

/// Create the keyspace if it doesn't exist
pub async fn create_keyspace(
    session: &Session,
    keyspace: &str,
    replication_factor: u8,
) -> Result<(), PersistenceError> {
    let query = format!(
        "CREATE KEYSPACE IF NOT EXISTS {} WITH replication = {{'class': 'SimpleStrategy', 'replication_factor': {}}}",
        keyspace, replication_factor
    );

    session
        .query_unpaged(query, &[])
        .await
        .map_err(|e| PersistenceError::SchemaError(format!("Failed to create keyspace: {}", e)))?;

    Ok(())
}

/// Create all required tables
pub async fn create_tables(session: &Session, keyspace: &str) -> Result<(), PersistenceError> {
    // Interview sessions; JSON-bearing columns hold serialized documents
    let sessions_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.interview_sessions (
            session_id TEXT,
            application_id TEXT,
            stage_type TEXT,
            status TEXT,
            language TEXT,
            created_at TIMESTAMP,
            transcript TEXT,
            candidate_profile TEXT,
            skill_assessments TEXT,
            difficulty_level TEXT,
            competency_scores TEXT,
            topics_covered TEXT,
            feedback_markdown TEXT,
            overall_score INT,
            trace_id TEXT,
            PRIMARY KEY (session_id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(sessions_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!("Failed to create interview_sessions table: {}", e))
        })?;

    // Applications: shared context plus cross-stage memory
    let applications_table = format!(
        r#"
        CREATE TABLE IF NOT EXISTS {}.interview_applications (
            id TEXT,
            job_role TEXT,
            resume_text TEXT,
            job_description TEXT,
            cross_stage_insights TEXT,
            created_at TIMESTAMP,
            PRIMARY KEY (id)
        )
    "#,
        keyspace
    );

    session
        .query_unpaged(applications_table, &[])
        .await
        .map_err(|e| {
            PersistenceError::SchemaError(format!(
                "Failed to create interview_applications table: {}",
                e
            ))
        })?;

    tracing::info!("All tables created successfully");
    Ok(())
}
