//! Media runtime abstraction
//!
//! The voice transport is an opaque room-based runtime: it runs STT/TTS
//! internally, delivers authoritative transcript events, and accepts reply
//! text. The orchestrator consumes `MediaEvent`s and drives replies through
//! the `MediaSession` trait; a channel-backed implementation backs tests
//! and local development.

pub mod pipeline;
pub mod vad;

pub use pipeline::{PipelineConfig, SttConfig, TtsConfig};
pub use vad::{preload_vad, vad, VadConfig, VadModel};

use async_trait::async_trait;
use tokio::sync::mpsc;

use interview_agent_core::TurnRole;

/// Events delivered by the media runtime
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Authoritative transcript item
    ConversationItemAdded { role: TurnRole, content: String },
    /// Partial STT output; used only for logging
    UserInputTranscribed { transcript: String, is_final: bool },
    /// Participant left the room; triggers shutdown
    ParticipantDisconnected { identity: String },
}

/// Media runtime errors
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Media session closed")]
    Closed,

    #[error("Media runtime error: {0}")]
    Runtime(String),
}

impl From<MediaError> for interview_agent_core::Error {
    fn from(err: MediaError) -> Self {
        interview_agent_core::Error::Media(err.to_string())
    }
}

/// One attached media session
///
/// `generate_reply` is asynchronous in effect: the runtime synthesizes the
/// reply and reports it back as an assistant `ConversationItemAdded` event.
#[async_trait]
pub trait MediaSession: Send + Sync {
    /// Receive the next event; `None` when the session is closed
    async fn next_event(&mut self) -> Option<MediaEvent>;

    /// Speak a literal utterance (the greeting)
    async fn say(&self, text: &str) -> Result<(), MediaError>;

    /// Ask the runtime to generate and speak the next interviewer reply
    /// against the given live instructions
    async fn generate_reply(&self, instructions: &str) -> Result<(), MediaError>;
}

/// Channel-backed media session for tests and local development
pub struct ChannelMediaSession {
    events: mpsc::Receiver<MediaEvent>,
    outbound: mpsc::Sender<OutboundMessage>,
}

/// What the agent asked the runtime to do
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundMessage {
    Say(String),
    GenerateReply { instructions: String },
}

impl ChannelMediaSession {
    /// Build a session plus the handles a test harness drives it with
    pub fn new(
        buffer: usize,
    ) -> (
        Self,
        mpsc::Sender<MediaEvent>,
        mpsc::Receiver<OutboundMessage>,
    ) {
        let (event_tx, event_rx) = mpsc::channel(buffer);
        let (outbound_tx, outbound_rx) = mpsc::channel(buffer);
        (
            Self {
                events: event_rx,
                outbound: outbound_tx,
            },
            event_tx,
            outbound_rx,
        )
    }
}

#[async_trait]
impl MediaSession for ChannelMediaSession {
    async fn next_event(&mut self) -> Option<MediaEvent> {
        self.events.recv().await
    }

    async fn say(&self, text: &str) -> Result<(), MediaError> {
        self.outbound
            .send(OutboundMessage::Say(text.to_string()))
            .await
            .map_err(|_| MediaError::Closed)
    }

    async fn generate_reply(&self, instructions: &str) -> Result<(), MediaError> {
        self.outbound
            .send(OutboundMessage::GenerateReply {
                instructions: instructions.to_string(),
            })
            .await
            .map_err(|_| MediaError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_session_roundtrip() {
        let (mut session, event_tx, mut outbound_rx) = ChannelMediaSession::new(8);

        event_tx
            .send(MediaEvent::ConversationItemAdded {
                role: TurnRole::User,
                content: "hello".to_string(),
            })
            .await
            .unwrap();

        let event = session.next_event().await.unwrap();
        assert!(matches!(event, MediaEvent::ConversationItemAdded { .. }));

        session.say("welcome").await.unwrap();
        assert_eq!(
            outbound_rx.recv().await.unwrap(),
            OutboundMessage::Say("welcome".to_string())
        );

        session.generate_reply("be nice").await.unwrap();
        match outbound_rx.recv().await.unwrap() {
            OutboundMessage::GenerateReply { instructions } => {
                assert_eq!(instructions, "be nice");
            }
            other => panic!("unexpected outbound message: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_closed_session_ends_stream() {
        let (mut session, event_tx, _outbound_rx) = ChannelMediaSession::new(1);
        drop(event_tx);
        assert!(session.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_say_after_harness_drop_errors() {
        let (session, _event_tx, outbound_rx) = ChannelMediaSession::new(1);
        drop(outbound_rx);
        assert!(matches!(session.say("x").await, Err(MediaError::Closed)));
    }
}
