//! Session orchestrator
//!
//! Drives one live interview end to end. Transcript events are handled
//! sequentially on the loop; anything with real latency (scoring, profile
//! merges, shadow analysis, turn logging) runs as detached background work
//! that never blocks the next turn.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use interview_agent_core::{Error, SessionContext, StageType, Transcript, TurnRole};
use interview_agent_intelligence::{PromptInputs, QuestionContext, QuestionGenerator};
use interview_agent_media::{MediaEvent, MediaSession, PipelineConfig};
use interview_agent_observability::{SpanType, TraceMetadata};
use interview_agent_persistence::IntelligenceArtifacts;

use crate::config::OrchestratorConfig;
use crate::services::AgentServices;
use crate::transcript::TranscriptManager;
use crate::worker::{IntelligenceState, ScoringJob, ScoringWorker};

const RUNTIME_UPDATE_HEADER: &str = "[RUNTIME INTERVIEW UPDATE]";

/// Orchestrator for one live interview session
pub struct SessionOrchestrator {
    ctx: SessionContext,
    config: OrchestratorConfig,
    services: Arc<AgentServices>,
    transcripts: TranscriptManager,
    worker: ScoringWorker,
    live_instruction: String,
    greeting: String,
    pipeline: PipelineConfig,
    user_turns: u32,
    assistant_turns: u32,
    trace_id: Option<String>,
    intervention_tx: mpsc::Sender<String>,
    intervention_rx: mpsc::Receiver<String>,
}

impl SessionOrchestrator {
    /// Boot the session: resolve context, build initial intelligence state,
    /// compose the prompt, wire the pipeline, and start the trace.
    pub async fn boot(
        session_id: &str,
        services: Arc<AgentServices>,
        config: OrchestratorConfig,
    ) -> Result<Self, Error> {
        if session_id.is_empty() {
            return Err(Error::Session("session_id must not be empty".to_string()));
        }

        let ctx = Self::resolve_context(session_id, &services).await;
        tracing::info!(
            session_id,
            stage = %ctx.stage_type,
            job_role = %ctx.job_role,
            language = %ctx.language,
            "Booting interview session"
        );

        // Cross-stage memory conditions only later application stages.
        let previous_stage_insights = match (&ctx.application_id, ctx.stage_type) {
            (Some(application_id), StageType::Technical | StageType::Behavioral) => {
                let insights = services
                    .memory
                    .get_previous_insights(application_id, ctx.stage_type)
                    .await;
                services.memory.build_context_prompt(&insights)
            }
            _ => String::new(),
        };

        let difficulty_state = services
            .difficulty
            .initial_state(services.difficulty.level_for_stage(ctx.stage_type));
        let competency_focus =
            services
                .competency
                .interview_guidance(ctx.stage_type, &ctx.job_role, None);

        // LLM-backed boot work shares one generous cold-start deadline;
        // hitting it degrades to an empty profile and no prepared questions.
        let prewarm = tokio::time::timeout(config.prewarm_deadline, async {
            let profile = services
                .profiles
                .create_initial_profile(&ctx.resume_text, &ctx.job_description)
                .await;

            let question_context = QuestionContext {
                resume_text: ctx.resume_text.clone(),
                job_description: ctx.job_description.clone(),
                focus_competencies: services.competency.stage_focus(ctx.stage_type),
                topics_covered: profile.topics_covered.iter().cloned().collect(),
                identified_gaps: profile.identified_gaps.clone(),
                performance_summary: String::new(),
            };
            let questions = services
                .questions
                .generate(
                    &ctx.job_role,
                    ctx.stage_type,
                    difficulty_state.level,
                    &question_context,
                    config.prepared_question_count,
                )
                .await;

            (profile, questions)
        })
        .await;

        let (profile, prepared_questions) = match prewarm {
            Ok(result) => result,
            Err(_) => {
                tracing::error!("Prewarm deadline exceeded, starting with defaults");
                (Default::default(), Vec::new())
            }
        };

        let inputs = PromptInputs {
            previous_stage_insights,
            candidate_profile_context: services.profiles.to_context_string(&profile),
            difficulty_level: services.difficulty.prompt_block(&difficulty_state),
            competency_focus,
            prepared_questions: QuestionGenerator::to_prompt_block(&prepared_questions),
            ..Default::default()
        };

        let live_instruction = services.composer.system_instruction(&ctx, &inputs);
        let greeting = services.composer.greeting(&ctx);
        let pipeline =
            PipelineConfig::for_language(ctx.language).with_voice(services.composer.voice_id(&ctx));

        // Session-level trace; the registry carries it to detached tasks.
        let metadata = TraceMetadata::for_session(
            ctx.session_id.clone(),
            ctx.stage_type.as_str(),
            ctx.job_role.clone(),
            ctx.language.code(),
        );
        let trace_id = services
            .observability
            .start_trace(&format!("interview_session_{session_id}"), metadata)
            .await;
        if let Some(trace_id) = &trace_id {
            services
                .observability
                .register_session_trace(session_id, trace_id);
            if let Err(e) = services.sessions.set_trace_id(session_id, trace_id).await {
                tracing::error!(error = %e, "Failed to persist trace ID");
            }
        }

        let worker = ScoringWorker::spawn(
            services.scoring.clone(),
            services.profiles.clone(),
            services.difficulty.clone(),
            services.observability.clone(),
            ctx.session_id.clone(),
            ctx.stage_type,
            ctx.job_role.clone(),
            IntelligenceState {
                profile,
                difficulty: difficulty_state,
                ..Default::default()
            },
        );

        let transcripts = TranscriptManager::new(session_id, services.sessions.clone());
        let (intervention_tx, intervention_rx) = mpsc::channel(16);

        Ok(Self {
            ctx,
            config,
            services,
            transcripts,
            worker,
            live_instruction,
            greeting,
            pipeline,
            user_turns: 0,
            assistant_turns: 0,
            trace_id,
            intervention_tx,
            intervention_rx,
        })
    }

    async fn resolve_context(session_id: &str, services: &AgentServices) -> SessionContext {
        let mut ctx = SessionContext::new(session_id);

        let record = match services.sessions.get(session_id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(error = %e, "Session lookup failed, using defaults");
                None
            }
        };

        if let Some(record) = record {
            ctx.stage_type = StageType::parse_or_default(&record.stage_type);
            ctx.language = interview_agent_core::Language::parse_or_default(&record.language);
            ctx.application_id = record.application_id;

            if let Some(application_id) = &ctx.application_id {
                match services.applications.get(application_id).await {
                    Ok(Some(application)) => {
                        if !application.job_role.is_empty() {
                            ctx.job_role = application.job_role;
                        }
                        ctx.resume_text = application.resume_text;
                        ctx.job_description = application.job_description;
                    }
                    Ok(None) => {
                        tracing::warn!(application_id = %application_id, "Application not found");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Application lookup failed");
                    }
                }
            }
        } else {
            tracing::warn!(session_id, "Session record not found, using defaults");
        }

        ctx
    }

    /// The current live system instruction
    pub fn live_instruction(&self) -> &str {
        &self.live_instruction
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn pipeline(&self) -> &PipelineConfig {
        &self.pipeline
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    /// Drive the turn loop until disconnect, then finalize
    pub async fn run<M: MediaSession>(mut self, media: &mut M) {
        if let Err(e) = media.say(&self.greeting).await {
            tracing::error!(error = %e, "Failed to deliver greeting");
        }

        let mut save_interval = tokio::time::interval(self.config.save_interval);
        save_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // Consume the immediate first tick
        save_interval.tick().await;

        loop {
            tokio::select! {
                biased;

                Some(intervention) = self.intervention_rx.recv() => {
                    self.apply_intervention(&intervention);
                }

                _ = save_interval.tick() => {
                    if self.transcripts.dirty() {
                        self.transcripts.save(false).await;
                    }
                }

                event = media.next_event() => {
                    match event {
                        Some(MediaEvent::ConversationItemAdded { role, content }) => {
                            self.on_item(media, role, content).await;
                        }
                        Some(MediaEvent::UserInputTranscribed { transcript, is_final }) => {
                            tracing::debug!(is_final, "Partial transcript: {transcript}");
                        }
                        Some(MediaEvent::ParticipantDisconnected { identity }) => {
                            tracing::info!(identity = %identity, "Participant disconnected");
                            break;
                        }
                        None => {
                            tracing::info!("Media session closed");
                            break;
                        }
                    }
                }
            }
        }

        self.shutdown().await;
    }

    async fn on_item<M: MediaSession>(&mut self, media: &M, role: TurnRole, content: String) {
        self.transcripts.add_message(role, &content);
        match role {
            TurnRole::User => self.user_turns += 1,
            TurnRole::Assistant => self.assistant_turns += 1,
        }

        self.spawn_turn_log(role, &content);

        if role != TurnRole::User {
            return;
        }

        // Scoring pairs the answer with the question it followed.
        if content.trim().chars().count() > self.config.scoring_min_answer_chars {
            let question = self
                .transcripts
                .transcript()
                .turns()
                .iter()
                .rev()
                .skip(1)
                .find(|t| t.role == TurnRole::Assistant)
                .map(|t| t.content.clone());

            if let Some(question) = question {
                self.worker.enqueue(ScoringJob {
                    turn_index: self.user_turns,
                    question,
                    answer: content.clone(),
                });
            }
        }

        self.spawn_shadow_analysis();

        // The reply is generated against the instruction as of now; any
        // shadow intervention from this turn lands on a later reply.
        if let Err(e) = media.generate_reply(&self.live_instruction).await {
            tracing::error!(error = %e, "Reply generation failed");
        }
    }

    fn spawn_turn_log(&self, role: TurnRole, content: &str) {
        let observability = self.services.observability.clone();
        let session_id = self.ctx.session_id.clone();
        let turn_index = self.transcripts.transcript().len();
        let content: String = content.chars().take(500).collect();

        tokio::spawn(async move {
            let trace_id = observability.trace_for_session(&session_id);
            let span_id = observability
                .start_span(
                    &format!("turn_{turn_index}_{role}"),
                    trace_id.as_deref(),
                    SpanType::Function,
                    Some(json!({ "content": content })),
                    None,
                )
                .await;
            if let Some(span_id) = span_id {
                observability.end_span(&span_id, None, None).await;
            }
        });
    }

    fn spawn_shadow_analysis(&self) {
        let transcript: Transcript = self.transcripts.transcript().clone();
        if transcript.len() < 2 {
            return;
        }

        let shadow = self.services.shadow.clone();
        let job_role = self.ctx.job_role.clone();
        let stage_type = self.ctx.stage_type;
        let session_id = self.ctx.session_id.clone();
        let intervention_tx = self.intervention_tx.clone();

        tokio::spawn(async move {
            if let Some(intervention) = shadow
                .analyze(&transcript, &job_role, stage_type, &session_id)
                .await
            {
                let _ = intervention_tx.send(intervention).await;
            }
        });
    }

    /// Append a runtime directive to the live instruction
    ///
    /// Repeated appends are tolerated but bounded by the configured
    /// instruction length.
    fn apply_intervention(&mut self, intervention: &str) {
        let block = format!("\n\n{RUNTIME_UPDATE_HEADER}\n{intervention}");
        if self.live_instruction.len() + block.len() > self.config.max_instruction_chars {
            tracing::warn!("Instruction length bound reached, dropping intervention");
            return;
        }
        tracing::info!(intervention = %intervention, "Applying runtime instruction update");
        self.live_instruction.push_str(&block);
    }

    /// Finalize the session
    ///
    /// Steps are independent: each runs under its own budget and a failed
    /// or overrun step never prevents the rest.
    async fn shutdown(mut self) {
        let budget = self.config.shutdown_step_budget;
        tracing::info!(session_id = %self.ctx.session_id, "Shutting down session");

        // (i) Final transcript save wins over the stopped periodic saver.
        if tokio::time::timeout(budget, self.transcripts.save(true))
            .await
            .is_err()
        {
            tracing::error!("Final transcript save exceeded budget");
        }

        // (ii) Drain in-flight scoring, bounded, then snapshot.
        let state = self.worker.drain(budget).await;

        // (iii) Final competency scores need at least one scored turn.
        let report = if state.profile.performance_trajectory.is_empty() {
            None
        } else {
            Some(
                self.services
                    .competency
                    .compute_competency_scores(&state.turn_scores, &self.ctx.job_role),
            )
        };

        // (iv) Cross-stage insights for the application pipeline.
        if let Some(application_id) = &self.ctx.application_id {
            if !self.transcripts.transcript().is_empty() {
                let save = self.services.memory.save_stage_insights(
                    application_id,
                    self.ctx.stage_type,
                    &state.profile,
                    self.transcripts.transcript(),
                    &state.turn_scores,
                    &self.ctx.job_role,
                );
                if tokio::time::timeout(budget, save).await.is_err() {
                    tracing::error!("Cross-stage insight save exceeded budget");
                }
            }
        }

        // (v) Persist intelligence artifacts.
        let artifacts = IntelligenceArtifacts {
            candidate_profile: state.profile.to_json().ok(),
            skill_assessments: serde_json::to_string(&state.turn_scores).ok(),
            difficulty_level: Some(state.difficulty.level.as_str().to_string()),
            competency_scores: report
                .as_ref()
                .and_then(|r| serde_json::to_string(r).ok()),
            topics_covered: serde_json::to_string(
                &state.profile.topics_covered.iter().collect::<Vec<_>>(),
            )
            .ok(),
        };
        let persist = self
            .services
            .sessions
            .update_intelligence(&self.ctx.session_id, &artifacts);
        match tokio::time::timeout(budget, persist).await {
            Ok(Err(e)) => tracing::error!(error = %e, "Failed to persist intelligence artifacts"),
            Err(_) => tracing::error!("Intelligence artifact save exceeded budget"),
            Ok(Ok(())) => {}
        }

        // (vi) Post-session GEval; advisory scores land on the trace and
        // the session record.
        let geval = self.services.evaluation.evaluate_and_submit(
            &self.services.observability,
            &self.ctx.session_id,
            self.transcripts.transcript(),
            self.ctx.stage_type,
            &self.ctx.job_role,
        );
        match tokio::time::timeout(budget, geval).await {
            Ok(Some(evaluation)) => {
                let overall = evaluation.overall_score.unwrap_or(0.0);
                let feedback = serde_json::to_string(&evaluation).unwrap_or_default();
                if let Err(e) = self
                    .services
                    .sessions
                    .update_feedback(
                        &self.ctx.session_id,
                        &feedback,
                        (overall * 100.0).round().clamp(0.0, 100.0) as i32,
                    )
                    .await
                {
                    tracing::error!(error = %e, "Failed to persist evaluation feedback");
                }
            }
            Ok(None) => {}
            Err(_) => tracing::error!("Post-session evaluation exceeded budget"),
        }

        // (vii) Close the trace and release the registry entry.
        if let Some(trace_id) = &self.trace_id {
            let output = json!({
                "total_turns": self.transcripts.transcript().len(),
                "user_turns": self.user_turns,
                "assistant_turns": self.assistant_turns,
                "competency_scores": report.as_ref().map(|r| r.role_fit_score),
                "difficulty_final": state.difficulty.level.as_str(),
            });
            self.services
                .observability
                .end_trace(trace_id, Some(output), None)
                .await;
        }
        self.services
            .observability
            .unregister_session_trace(&self.ctx.session_id);
        self.services.observability.flush().await;

        tracing::info!(
            session_id = %self.ctx.session_id,
            turns = self.transcripts.transcript().len(),
            "Session finalized"
        );
    }
}
