//! Worker runtime
//!
//! Boots shared services (persistence, observability, personas, VAD) and
//! exposes the health surface. The media runtime hands finished rooms to
//! `WorkerState::run_session`, which owns the session until shutdown.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use interview_agent_agent::{AgentServices, OrchestratorConfig, SessionOrchestrator};
use interview_agent_config::Settings;
use interview_agent_media::{preload_vad, MediaSession, VadConfig};
use interview_agent_persistence::{PersistenceLayer, ScyllaConfig};

/// Shared worker state
#[derive(Clone)]
pub struct WorkerState {
    pub services: Arc<AgentServices>,
    pub orchestrator_config: OrchestratorConfig,
    active_sessions: Arc<AtomicUsize>,
}

impl WorkerState {
    /// Initialize worker-wide resources
    ///
    /// The VAD preloads once per process; persona and framework configs are
    /// read once and cached. ScyllaDB failures fall back to in-memory
    /// stores so development works without a cluster.
    pub async fn initialize(settings: Settings) -> Result<Self, interview_agent_core::Error> {
        preload_vad(VadConfig::default());

        let persistence = if settings.persistence.enabled {
            let config = ScyllaConfig {
                hosts: settings.persistence.scylla_hosts.clone(),
                keyspace: settings.persistence.keyspace.clone(),
                replication_factor: settings.persistence.replication_factor,
            };
            match PersistenceLayer::connect(config).await {
                Ok(layer) => {
                    tracing::info!(
                        hosts = ?settings.persistence.scylla_hosts,
                        keyspace = %settings.persistence.keyspace,
                        "ScyllaDB persistence initialized"
                    );
                    layer
                }
                Err(e) => {
                    tracing::error!(error = %e, "ScyllaDB unavailable, falling back to in-memory");
                    PersistenceLayer::in_memory()
                }
            }
        } else {
            tracing::info!("Persistence disabled, using in-memory stores");
            PersistenceLayer::in_memory()
        };

        let services = AgentServices::from_settings(&settings, persistence)?;

        Ok(Self {
            services,
            orchestrator_config: OrchestratorConfig::default(),
            active_sessions: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Run one interview session to completion
    ///
    /// Called by the media runtime integration when a room is assigned to
    /// this worker. Returns when the session has fully shut down.
    pub async fn run_session<M: MediaSession>(
        &self,
        session_id: &str,
        media: &mut M,
    ) -> Result<(), interview_agent_core::Error> {
        let orchestrator = SessionOrchestrator::boot(
            session_id,
            self.services.clone(),
            self.orchestrator_config.clone(),
        )
        .await?;

        self.active_sessions.fetch_add(1, Ordering::Relaxed);
        orchestrator.run(media).await;
        self.active_sessions.fetch_sub(1, Ordering::Relaxed);

        Ok(())
    }

    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::Relaxed)
    }
}

/// Health and readiness surface
pub fn build_router(state: WorkerState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn readyz(State(state): State<WorkerState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ready",
        "active_sessions": state.active_sessions(),
    }))
}
