//! Core types for the interview agent
//!
//! This crate provides foundational types used across all other crates:
//! - Interview stages and languages
//! - Conversation turns and transcripts
//! - Session context
//! - Error types

pub mod conversation;
pub mod error;
pub mod language;
pub mod session;
pub mod stage;

pub use conversation::{Transcript, Turn, TurnRole};
pub use error::{Error, Result};
pub use language::Language;
pub use session::SessionContext;
pub use stage::StageType;
