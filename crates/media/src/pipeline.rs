//! Pipeline configuration
//!
//! STT and TTS run inside the media runtime; the core only chooses which
//! models and voices to wire in, by session language.

use serde::{Deserialize, Serialize};

use interview_agent_core::Language;

/// Speech-to-text configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SttConfig {
    pub model: String,
    pub language: String,
}

/// Text-to-speech configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TtsConfig {
    pub model: String,
    /// Voice ID from the resolved persona identity
    pub voice_id: Option<String>,
}

/// Per-session pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineConfig {
    pub stt: SttConfig,
    pub tts: TtsConfig,
}

impl PipelineConfig {
    /// Language-appropriate models; the voice comes from the resolved
    /// identity and is filled in by the orchestrator.
    pub fn for_language(language: Language) -> Self {
        let (stt_model, tts_model) = match language {
            Language::En => ("nova-3", "sonic-2"),
            // Vietnamese runs the multilingual tiers
            Language::Vi => ("nova-2-general", "sonic-multilingual"),
        };

        Self {
            stt: SttConfig {
                model: stt_model.to_string(),
                language: language.code().to_string(),
            },
            tts: TtsConfig {
                model: tts_model.to_string(),
                voice_id: None,
            },
        }
    }

    pub fn with_voice(mut self, voice_id: Option<String>) -> Self {
        self.tts.voice_id = voice_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_selection() {
        let en = PipelineConfig::for_language(Language::En);
        assert_eq!(en.stt.language, "en");
        assert_eq!(en.tts.model, "sonic-2");

        let vi = PipelineConfig::for_language(Language::Vi);
        assert_eq!(vi.stt.language, "vi");
        assert!(vi.tts.model.contains("multilingual"));
    }

    #[test]
    fn test_voice_attachment() {
        let config = PipelineConfig::for_language(Language::En).with_voice(Some("voice-1".to_string()));
        assert_eq!(config.tts.voice_id.as_deref(), Some("voice-1"));
    }
}
