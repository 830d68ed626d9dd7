//! Shared services for session orchestrators
//!
//! One `AgentServices` per worker process; every live session holds an
//! `Arc` to it. Everything inside is read-mostly or internally
//! synchronized.

use std::sync::Arc;

use interview_agent_config::{CompetenciesConfig, IntelligenceConfig, PersonaStore, Settings};
use interview_agent_intelligence::{
    CompetencyEvaluator, CrossStageMemory, DifficultyAdapter, ProfileManager, PromptComposer,
    QuestionGenerator, ScoringEngine, ShadowMonitor,
};
use interview_agent_llm::{GeminiBackend, GeminiConfig, LanguageModel};
use interview_agent_observability::{EvaluationEngine, ObservabilityService};
use interview_agent_persistence::{ApplicationStore, PersistenceLayer, SessionStore};

/// Services shared across all sessions in a worker
pub struct AgentServices {
    pub sessions: Arc<dyn SessionStore>,
    pub applications: Arc<dyn ApplicationStore>,
    pub observability: Arc<ObservabilityService>,
    pub composer: Arc<PromptComposer>,
    pub scoring: Arc<ScoringEngine>,
    pub profiles: Arc<ProfileManager>,
    pub difficulty: DifficultyAdapter,
    pub competency: Arc<CompetencyEvaluator>,
    pub memory: Arc<CrossStageMemory>,
    pub shadow: Arc<ShadowMonitor>,
    pub questions: Arc<QuestionGenerator>,
    pub evaluation: Arc<EvaluationEngine>,
}

impl AgentServices {
    /// Wire services from settings and a connected persistence layer
    pub fn from_settings(
        settings: &Settings,
        persistence: PersistenceLayer,
    ) -> Result<Arc<Self>, interview_agent_core::Error> {
        let main_llm: Arc<dyn LanguageModel> = Arc::new(
            GeminiBackend::new(GeminiConfig::new(
                settings.llm.gemini_model.clone(),
                settings.llm.google_api_key.clone(),
            ))
            .map_err(interview_agent_core::Error::from)?,
        );
        let shadow_llm: Arc<dyn LanguageModel> = Arc::new(
            GeminiBackend::new(GeminiConfig::new(
                settings.llm.shadow_model.clone(),
                settings.llm.google_api_key.clone(),
            ))
            .map_err(interview_agent_core::Error::from)?,
        );

        let observability = Arc::new(ObservabilityService::from_settings(&settings.observability));
        let persona_store = Arc::new(PersonaStore::new(settings.config_dir.clone()));
        let intelligence_config = IntelligenceConfig::load_or_default(&settings.config_dir);
        let competencies_config = CompetenciesConfig::load_or_default(&settings.config_dir);

        Ok(Arc::new(Self {
            sessions: persistence.sessions.clone(),
            applications: persistence.applications.clone(),
            observability: observability.clone(),
            composer: Arc::new(PromptComposer::new(persona_store, intelligence_config)),
            scoring: Arc::new(ScoringEngine::new(shadow_llm.clone())),
            profiles: Arc::new(ProfileManager::new(shadow_llm.clone())),
            difficulty: DifficultyAdapter::default(),
            competency: Arc::new(CompetencyEvaluator::new(competencies_config)),
            memory: Arc::new(CrossStageMemory::new(
                shadow_llm.clone(),
                persistence.applications.clone(),
            )),
            shadow: Arc::new(ShadowMonitor::new(shadow_llm.clone(), observability)),
            questions: Arc::new(QuestionGenerator::new(shadow_llm)),
            evaluation: Arc::new(EvaluationEngine::new(main_llm)),
        }))
    }
}
