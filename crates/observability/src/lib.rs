//! Observability layer
//!
//! Provider-abstracted trace/span/metric/evaluation fan-out. The concrete
//! backend is Opik; a `NullProvider` backs the disabled state and replaces a
//! failed initialization silently. Every call out of this layer is
//! best-effort: errors are logged and swallowed, never surfaced to business
//! logic.
//!
//! A process-wide session -> trace registry backs background tasks that are
//! spawned without inherited context.

pub mod evaluation;
pub mod models;
pub mod opik;
pub mod provider;
pub mod service;

pub use evaluation::EvaluationEngine;
pub use models::{EvaluationResult, EvaluationScore, SpanType, TraceMetadata};
pub use opik::OpikProvider;
pub use provider::{NullProvider, ObservabilityProvider};
pub use service::ObservabilityService;

/// Maximum characters of a prompt or response attached to a logged LLM call
pub const LLM_LOG_TRUNCATE_CHARS: usize = 10_000;

/// Truncate a string to `max` characters on a char boundary
pub(crate) fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
