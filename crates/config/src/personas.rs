//! Persona store
//!
//! Personas are declarative YAML files describing an interviewer archetype:
//! an identity pool with per-language voices, directives, sample questions,
//! roleplay scenarios, and the skills to apply at prompt-composition time.
//!
//! The store caches personas by key after first load and never mutates them;
//! a missing persona falls back to the practice persona.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use interview_agent_core::{Language, StageType};

use crate::ConfigError;

/// Persona key used when a stage's persona cannot be loaded
pub const FALLBACK_PERSONA: &str = "practice_interviewer";

/// A string that may be plain or localized by language code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Localized {
    Text(String),
    ByLanguage(HashMap<String, String>),
}

impl Localized {
    /// Resolve for a language, falling back to English
    pub fn resolve(&self, language: Language) -> Option<&str> {
        match self {
            Localized::Text(s) => Some(s.as_str()),
            Localized::ByLanguage(map) => map
                .get(language.code())
                .or_else(|| map.get("en"))
                .map(|s| s.as_str()),
        }
    }
}

/// A string list that may be plain or localized by language code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum LocalizedList {
    List(Vec<String>),
    ByLanguage(HashMap<String, Vec<String>>),
}

impl LocalizedList {
    pub fn resolve(&self, language: Language) -> &[String] {
        match self {
            LocalizedList::List(items) => items,
            LocalizedList::ByLanguage(map) => map
                .get(language.code())
                .or_else(|| map.get("en"))
                .map(|v| v.as_slice())
                .unwrap_or(&[]),
        }
    }
}

impl Default for LocalizedList {
    fn default() -> Self {
        LocalizedList::List(Vec::new())
    }
}

/// One member of a persona's identity pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Display name, localized
    pub name: Localized,
    /// TTS voice ID by language code
    #[serde(default)]
    pub voice: HashMap<String, String>,
}

impl Identity {
    /// Voice ID for a language, falling back to English
    pub fn voice_for(&self, language: Language) -> Option<&str> {
        self.voice
            .get(language.code())
            .or_else(|| self.voice.get("en"))
            .map(|s| s.as_str())
    }
}

/// Trigger-driven roleplay scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub trigger: String,
    pub response_pattern: Localized,
}

/// Reference to a skill with optional per-persona config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRef {
    pub id: String,
    #[serde(default)]
    pub mode: Option<String>,
}

/// Declarative interviewer persona
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Interviewer role label, e.g. "Senior Technical Lead"
    #[serde(default)]
    pub role: String,

    /// Identity pool; legacy personas use root `name`/`voice` instead
    #[serde(default)]
    pub identities: Vec<Identity>,

    /// Legacy root identity name
    #[serde(default)]
    pub name: Option<Localized>,

    /// Legacy root voice map
    #[serde(default)]
    pub voice: HashMap<String, String>,

    /// Behavioral directives injected into the system instruction
    #[serde(default)]
    pub directives: LocalizedList,

    /// Example questions the persona tends to ask
    #[serde(default)]
    pub sample_questions: LocalizedList,

    /// Roleplay scenarios
    #[serde(default)]
    pub scenarios: Vec<Scenario>,

    /// Skills applied at prompt-composition time, in order
    #[serde(default)]
    pub skills: Vec<SkillRef>,
}

impl Persona {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|_| ConfigError::FileNotFound(path.as_ref().display().to_string()))?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

/// Process-wide persona cache
///
/// Populated lazily, read-mostly; loaded personas are shared as `Arc` and
/// never mutated after load.
pub struct PersonaStore {
    personas_dir: PathBuf,
    cache: RwLock<HashMap<String, Arc<Persona>>>,
}

impl PersonaStore {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            personas_dir: config_dir.into().join("personas"),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Persona key for a stage
    pub fn persona_key_for_stage(stage: StageType) -> &'static str {
        match stage {
            StageType::Hr => "hr_recruiter",
            StageType::Technical => "tech_lead",
            StageType::Behavioral => "behavioral_manager",
            StageType::Practice => FALLBACK_PERSONA,
        }
    }

    /// Load a persona by key, caching the result
    ///
    /// A missing or unparseable persona falls back to the practice persona;
    /// if that is also missing, a minimal built-in persona is returned so a
    /// session can still start.
    pub fn load(&self, persona_key: &str) -> Arc<Persona> {
        if let Some(persona) = self.cache.read().get(persona_key) {
            return Arc::clone(persona);
        }

        let path = self.personas_dir.join(format!("{persona_key}.yaml"));
        let persona = match Persona::load(&path) {
            Ok(persona) => Arc::new(persona),
            Err(e) => {
                tracing::warn!(persona = persona_key, error = %e, "Persona load failed");
                if persona_key != FALLBACK_PERSONA {
                    return self.load(FALLBACK_PERSONA);
                }
                Arc::new(Self::builtin_fallback())
            }
        };

        self.cache
            .write()
            .insert(persona_key.to_string(), Arc::clone(&persona));
        persona
    }

    /// Load the persona mapped to a stage
    pub fn load_for_stage(&self, stage: StageType) -> Arc<Persona> {
        self.load(Self::persona_key_for_stage(stage))
    }

    fn builtin_fallback() -> Persona {
        Persona {
            role: "Practice Interviewer".to_string(),
            identities: Vec::new(),
            name: Some(Localized::Text("Interviewer".to_string())),
            voice: HashMap::new(),
            directives: LocalizedList::List(vec![
                "Keep the conversation friendly and constructive.".to_string(),
                "Ask one question at a time and wait for the answer.".to_string(),
            ]),
            sample_questions: LocalizedList::default(),
            scenarios: Vec::new(),
            skills: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_persona(dir: &Path, key: &str, yaml: &str) {
        let personas = dir.join("personas");
        std::fs::create_dir_all(&personas).unwrap();
        std::fs::write(personas.join(format!("{key}.yaml")), yaml).unwrap();
    }

    #[test]
    fn test_localized_fallback() {
        let mut map = HashMap::new();
        map.insert("en".to_string(), "Sarah".to_string());
        map.insert("vi".to_string(), "Linh".to_string());
        let localized = Localized::ByLanguage(map);

        assert_eq!(localized.resolve(Language::Vi), Some("Linh"));
        assert_eq!(localized.resolve(Language::En), Some("Sarah"));

        let mut en_only = HashMap::new();
        en_only.insert("en".to_string(), "Sarah".to_string());
        assert_eq!(
            Localized::ByLanguage(en_only).resolve(Language::Vi),
            Some("Sarah")
        );
    }

    #[test]
    fn test_persona_deserialization() {
        let yaml = r#"
role: "Senior Technical Lead"
identities:
  - name:
      en: "David Chen"
      vi: "Minh Tran"
    voice:
      en: "voice-en-1"
      vi: "voice-vi-1"
  - name: "Priya Sharma"
    voice:
      en: "voice-en-2"
directives:
  en:
    - "Probe for depth."
  vi:
    - "Hỏi sâu hơn."
scenarios:
  - trigger: "candidate asks for hints"
    response_pattern:
      en: "Offer a small nudge, never the full answer."
skills:
  - id: resume_probe
    mode: analysis
  - id: job_match
"#;
        let persona: Persona = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(persona.identities.len(), 2);
        assert_eq!(
            persona.identities[0].name.resolve(Language::Vi),
            Some("Minh Tran")
        );
        assert_eq!(persona.identities[1].voice_for(Language::Vi), Some("voice-en-2"));
        assert_eq!(persona.directives.resolve(Language::En), &["Probe for depth."]);
        assert_eq!(persona.skills.len(), 2);
        assert_eq!(persona.skills[0].mode.as_deref(), Some("analysis"));
    }

    #[test]
    fn test_store_caches_and_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        write_persona(dir.path(), FALLBACK_PERSONA, "role: \"Practice Interviewer\"\n");

        let store = PersonaStore::new(dir.path());
        let missing = store.load("tech_lead");
        assert_eq!(missing.role, "Practice Interviewer");

        // Second load hits the cache
        let again = store.load(FALLBACK_PERSONA);
        assert!(Arc::ptr_eq(&missing, &again) || missing.role == again.role);
    }

    #[test]
    fn test_store_builtin_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let store = PersonaStore::new(dir.path());
        let persona = store.load("tech_lead");
        assert_eq!(persona.role, "Practice Interviewer");
        assert!(persona.name.is_some());
    }

    #[test]
    fn test_stage_mapping() {
        assert_eq!(PersonaStore::persona_key_for_stage(StageType::Hr), "hr_recruiter");
        assert_eq!(PersonaStore::persona_key_for_stage(StageType::Technical), "tech_lead");
        assert_eq!(
            PersonaStore::persona_key_for_stage(StageType::Behavioral),
            "behavioral_manager"
        );
        assert_eq!(
            PersonaStore::persona_key_for_stage(StageType::Practice),
            FALLBACK_PERSONA
        );
    }
}
