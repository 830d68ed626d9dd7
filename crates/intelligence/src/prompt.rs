//! Prompt composition
//!
//! Builds the system instruction and greeting for a session: resolves the
//! persona identity deterministically from the session ID, selects the
//! strategic lens for technical rounds, detects the tech stack from
//! role/resume/JD, runs skills, and renders only the sections that have
//! content. Absent inputs contribute nothing, never stubs.

use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;

use interview_agent_config::{IntelligenceConfig, Persona, PersonaStore, StrategyDefinition};
use interview_agent_core::{Language, SessionContext, StageType};

use crate::hash::stable_index;
use crate::skills::{SkillContext, SkillRegistry};

const RESUME_SECTION_MIN_CHARS: usize = 50;
const JD_SECTION_MIN_CHARS: usize = 50;

/// Identity resolved from a persona's pool for one session
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIdentity {
    pub name: String,
    /// TTS voice IDs by language code
    pub voice: HashMap<String, String>,
}

impl ResolvedIdentity {
    /// Voice for a language with English fallback
    pub fn voice_for(&self, language: Language) -> Option<&str> {
        self.voice
            .get(language.code())
            .or_else(|| self.voice.get("en"))
            .map(|s| s.as_str())
    }
}

/// Intelligence inputs rendered into the system instruction
///
/// All fields may be empty; empty fields are omitted from the rendered
/// prompt.
#[derive(Debug, Clone, Default)]
pub struct PromptInputs {
    /// Free-form extra context
    pub context_info: String,
    /// Cross-stage memory block (already carries its own header)
    pub previous_stage_insights: String,
    /// Live candidate profile context
    pub candidate_profile_context: String,
    /// Difficulty block (already carries its own header)
    pub difficulty_level: String,
    /// Competency guidance for this stage and role
    pub competency_focus: String,
    /// Pre-generated questions
    pub prepared_questions: String,
}

/// Prompt composer
pub struct PromptComposer {
    persona_store: Arc<PersonaStore>,
    intelligence: IntelligenceConfig,
    registry: SkillRegistry,
    company_name: String,
}

impl PromptComposer {
    pub fn new(persona_store: Arc<PersonaStore>, intelligence: IntelligenceConfig) -> Self {
        Self {
            persona_store,
            intelligence,
            registry: SkillRegistry::with_builtin_skills(),
            company_name: "TechVision".to_string(),
        }
    }

    pub fn with_company_name(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = company_name.into();
        self
    }

    /// Deterministically resolve an identity from the persona pool
    ///
    /// The same `session_id` always resolves to the same identity and voice.
    /// An empty pool falls back to the persona's legacy root fields; an
    /// empty session ID selects uniformly at random.
    pub fn resolve_identity(
        &self,
        persona: &Persona,
        session_id: &str,
        language: Language,
    ) -> ResolvedIdentity {
        if persona.identities.is_empty() {
            let name = persona
                .name
                .as_ref()
                .and_then(|n| n.resolve(language))
                .unwrap_or("Interviewer")
                .to_string();
            return ResolvedIdentity {
                name,
                voice: persona.voice.clone(),
            };
        }

        let identity = if session_id.is_empty() {
            persona
                .identities
                .choose(&mut rand::thread_rng())
                .expect("pool is non-empty")
        } else {
            let idx = stable_index(session_id, "identity", persona.identities.len())
                .expect("pool is non-empty");
            &persona.identities[idx]
        };

        ResolvedIdentity {
            name: identity
                .name
                .resolve(language)
                .unwrap_or("Interviewer")
                .to_string(),
            voice: identity.voice.clone(),
        }
    }

    /// Select the strategic lens for the session
    ///
    /// Strategies apply to technical rounds only; the same session always
    /// gets the same lens.
    pub fn select_strategy(
        &self,
        session_id: &str,
        stage_type: StageType,
    ) -> Option<StrategyDefinition> {
        if stage_type != StageType::Technical {
            return None;
        }

        let pool = if self.intelligence.strategies.is_empty() {
            builtin_strategies()
        } else {
            self.intelligence.strategies.clone()
        };

        if session_id.is_empty() {
            return pool.choose(&mut rand::thread_rng()).cloned();
        }

        let idx = stable_index(session_id, "strategy", pool.len())?;
        Some(pool[idx].clone())
    }

    /// Detect configured tech-stack keys in role/resume/JD text
    ///
    /// Lowercase substring scan; each tech key appears at most once, in
    /// stable (sorted) order.
    pub fn detect_tech_stack(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }

        let text_lower = text.to_lowercase();
        let mut keys: Vec<&String> = self.intelligence.tech_stacks.keys().collect();
        keys.sort();

        let mut detected = Vec::new();
        for tech in keys {
            let patterns = &self.intelligence.tech_stacks[tech];
            if patterns.iter().any(|p| text_lower.contains(p.as_str())) {
                detected.push(tech.clone());
            }
        }
        detected
    }

    /// Render the complete system instruction for a session
    pub fn system_instruction(&self, ctx: &SessionContext, inputs: &PromptInputs) -> String {
        let persona = self.persona_store.load_for_stage(ctx.stage_type);
        let identity = self.resolve_identity(&persona, &ctx.session_id, ctx.language);
        let strategy = self.select_strategy(&ctx.session_id, ctx.stage_type);

        let combined = format!(
            "{} {} {}",
            ctx.job_role, ctx.resume_text, ctx.job_description
        );
        let tech_stack = self.detect_tech_stack(&combined);

        let has_resume = ctx.resume_text.trim().len() > RESUME_SECTION_MIN_CHARS;
        let has_jd = ctx.job_description.trim().len() > JD_SECTION_MIN_CHARS;

        let skill_context = SkillContext {
            job_role: ctx.job_role.clone(),
            resume_text: ctx.resume_text.clone(),
            job_description: ctx.job_description.clone(),
            language: ctx.language,
            stage_type: ctx.stage_type,
            session_id: ctx.session_id.clone(),
        };
        let skill_injections = self.registry.execute_all(&persona.skills, &skill_context);

        let mut sections: Vec<String> = Vec::new();

        sections.push(format!(
            "You are {}, {} at {}. You are conducting a {} interview for the {} position.",
            identity.name,
            if persona.role.is_empty() {
                "an interviewer"
            } else {
                &persona.role
            },
            self.company_name,
            stage_label(ctx.stage_type),
            ctx.job_role
        ));

        if ctx.language == Language::Vi {
            sections.push(
                "Conduct the entire interview in Vietnamese. Keep technical terms in English where natural."
                    .to_string(),
            );
        }

        let directives = persona.directives.resolve(ctx.language);
        if !directives.is_empty() {
            let mut block = String::from("YOUR DIRECTIVES:");
            for directive in directives {
                block.push_str(&format!("\n- {directive}"));
            }
            sections.push(block);
        }

        if let Some(strategy) = &strategy {
            sections.push(format!(
                "INTERVIEW STRATEGY: {}\n{}",
                strategy.name, strategy.description
            ));
        }

        if !tech_stack.is_empty() {
            sections.push(format!(
                "DETECTED TECH STACK: {}\nProbe these technologies specifically with concrete questions.",
                tech_stack.join(", ")
            ));
        }

        let sample_questions = persona.sample_questions.resolve(ctx.language);
        if !sample_questions.is_empty() {
            let mut block = String::from("SAMPLE QUESTIONS (for inspiration, do not read verbatim):");
            for question in sample_questions {
                block.push_str(&format!("\n- {question}"));
            }
            sections.push(block);
        }

        if !persona.scenarios.is_empty() {
            let mut block = String::from("SITUATIONAL RESPONSES:");
            for scenario in &persona.scenarios {
                if let Some(pattern) = scenario.response_pattern.resolve(ctx.language) {
                    block.push_str(&format!("\nIF {}: {}", scenario.trigger, pattern));
                }
            }
            sections.push(block);
        }

        if has_resume {
            sections.push(format!("CANDIDATE RESUME:\n{}", ctx.resume_text.trim()));
        }

        if has_jd {
            sections.push(format!("JOB DESCRIPTION:\n{}", ctx.job_description.trim()));
        }

        if !skill_injections.is_empty() {
            sections.push(skill_injections);
        }

        if !inputs.previous_stage_insights.trim().is_empty() {
            sections.push(inputs.previous_stage_insights.trim().to_string());
        }

        if !inputs.candidate_profile_context.trim().is_empty() {
            sections.push(format!(
                "CANDIDATE PROFILE (LIVE):\n{}",
                inputs.candidate_profile_context.trim()
            ));
        }

        if !inputs.difficulty_level.trim().is_empty() {
            sections.push(inputs.difficulty_level.trim().to_string());
        }

        if !inputs.competency_focus.trim().is_empty() {
            sections.push(inputs.competency_focus.trim().to_string());
        }

        if !inputs.prepared_questions.trim().is_empty() {
            sections.push(format!(
                "PREPARED QUESTIONS (weave in naturally):\n{}",
                inputs.prepared_questions.trim()
            ));
        }

        if !inputs.context_info.trim().is_empty() {
            sections.push(inputs.context_info.trim().to_string());
        }

        sections.join("\n\n")
    }

    /// Render the initial greeting against the resolved identity
    pub fn greeting(&self, ctx: &SessionContext) -> String {
        let persona = self.persona_store.load_for_stage(ctx.stage_type);
        let identity = self.resolve_identity(&persona, &ctx.session_id, ctx.language);

        match ctx.language {
            Language::En => format!(
                "Hello! I'm {}, and I'll be running your {} today. \
                 We'll be talking about the {} role. Ready when you are!",
                identity.name,
                stage_label(ctx.stage_type),
                ctx.job_role
            ),
            Language::Vi => format!(
                "Xin chào! Tôi là {}, người phỏng vấn của bạn trong buổi {} hôm nay. \
                 Chúng ta sẽ trao đổi về vị trí {}. Bạn sẵn sàng chưa?",
                identity.name,
                stage_label(ctx.stage_type),
                ctx.job_role
            ),
        }
    }

    /// TTS voice ID for the session, from the resolved identity
    pub fn voice_id(&self, ctx: &SessionContext) -> Option<String> {
        let persona = self.persona_store.load_for_stage(ctx.stage_type);
        let identity = self.resolve_identity(&persona, &ctx.session_id, ctx.language);
        identity.voice_for(ctx.language).map(|s| s.to_string())
    }
}

fn stage_label(stage: StageType) -> &'static str {
    match stage {
        StageType::Hr => "HR screening",
        StageType::Technical => "technical round",
        StageType::Behavioral => "behavioral round",
        StageType::Practice => "practice session",
    }
}

fn builtin_strategies() -> Vec<StrategyDefinition> {
    vec![
        StrategyDefinition {
            name: "The Purist".to_string(),
            description: "Focus strictly on Clean Code, SOLID principles, and design patterns. Reject 'hacky' solutions that work but are messy.".to_string(),
        },
        StrategyDefinition {
            name: "The Pragmatist".to_string(),
            description: "Focus on shipping speed, MVP trade-offs, and business value. Challenge over-engineering and ask 'What is the fastest way to get this live?'.".to_string(),
        },
        StrategyDefinition {
            name: "The Scaler".to_string(),
            description: "Obsess over high-load scenarios. Ask about caching (Redis), database indexing, load balancing, and O(n) complexity.".to_string(),
        },
        StrategyDefinition {
            name: "The Security Auditor".to_string(),
            description: "Paranoid about vulnerabilities. Explicitly ask about XSS, SQL Injection, AuthZ/AuthN, and data encryption in every answer.".to_string(),
        },
        StrategyDefinition {
            name: "The Legacy Cleaner".to_string(),
            description: "Focus on refactoring and technical debt. Ask 'How would you migrate this monolith?' or 'How do you handle dependency updates?'.".to_string(),
        },
    ]
}
