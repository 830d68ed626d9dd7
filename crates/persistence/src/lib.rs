//! ScyllaDB persistence layer for the interview agent
//!
//! Provides durable storage for:
//! - Interview sessions (transcript, profile, scores, difficulty, feedback)
//! - Applications (shared resume/JD context and cross-stage insights)
//!
//! Stores are trait-based; in-memory implementations back tests and
//! development, ScyllaDB backs production. One scoped store call per write
//! operation; nothing is shared across tasks except the store handles
//! themselves.

pub mod applications;
pub mod client;
pub mod error;
pub mod memory;
pub mod schema;
pub mod sessions;

pub use applications::{ApplicationRecord, ApplicationStore, ScyllaApplicationStore};
pub use client::{ScyllaClient, ScyllaConfig};
pub use error::PersistenceError;
pub use memory::{MemoryApplicationStore, MemorySessionStore};
pub use sessions::{IntelligenceArtifacts, ScyllaSessionStore, SessionRecord, SessionStatus, SessionStore};

use std::sync::Arc;

/// Combined persistence layer
#[derive(Clone)]
pub struct PersistenceLayer {
    pub sessions: Arc<dyn SessionStore>,
    pub applications: Arc<dyn ApplicationStore>,
}

impl PersistenceLayer {
    /// Connect to ScyllaDB and ensure the schema exists
    pub async fn connect(config: ScyllaConfig) -> Result<Self, PersistenceError> {
        let client = ScyllaClient::connect(config).await?;
        client.ensure_schema().await?;

        Ok(Self {
            sessions: Arc::new(ScyllaSessionStore::new(client.clone())),
            applications: Arc::new(ScyllaApplicationStore::new(client)),
        })
    }

    /// In-memory layer for development and tests
    pub fn in_memory() -> Self {
        Self {
            sessions: Arc::new(MemorySessionStore::new()),
            applications: Arc::new(MemoryApplicationStore::new()),
        }
    }
}
