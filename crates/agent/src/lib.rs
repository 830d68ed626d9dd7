//! Session orchestrator
//!
//! Owns one live interview: boots the intelligence pipeline, drives the
//! turn loop over media events, schedules detached background work
//! (scoring, profiling, shadow analysis, turn logging), persists the
//! transcript periodically, and finalizes all durable state on shutdown.

pub mod config;
pub mod orchestrator;
pub mod services;
pub mod transcript;
pub mod worker;

pub use config::OrchestratorConfig;
pub use orchestrator::SessionOrchestrator;
pub use services::AgentServices;
pub use transcript::TranscriptManager;
pub use worker::{IntelligenceState, ScoringJob, ScoringWorker};
