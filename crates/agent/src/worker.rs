//! Per-session scoring worker
//!
//! Each scored user turn becomes one job: score the answer, record the
//! metric, merge the profile, update difficulty. Jobs are queued in turn
//! order and processed by a single task, so later-turn updates always
//! observe earlier-turn writes.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

use interview_agent_core::StageType;
use interview_agent_intelligence::{
    AnswerScore, CandidateProfile, DifficultyAdapter, DifficultyState, ProfileManager,
    ScoreContext, ScoringEngine, TurnScoreRecord,
};
use interview_agent_observability::ObservabilityService;

/// One scored exchange
#[derive(Debug, Clone)]
pub struct ScoringJob {
    pub turn_index: u32,
    pub question: String,
    pub answer: String,
}

/// Mutable intelligence state owned by the session
#[derive(Debug, Clone, Default)]
pub struct IntelligenceState {
    pub profile: CandidateProfile,
    pub difficulty: DifficultyState,
    pub turn_scores: Vec<TurnScoreRecord>,
    pub answer_scores: Vec<AnswerScore>,
}

/// Handle to the session's scoring pipeline
pub struct ScoringWorker {
    jobs: Option<mpsc::Sender<ScoringJob>>,
    handle: Option<JoinHandle<()>>,
    state: Arc<Mutex<IntelligenceState>>,
}

struct WorkerDeps {
    scoring: Arc<ScoringEngine>,
    profiles: Arc<ProfileManager>,
    difficulty: DifficultyAdapter,
    observability: Arc<ObservabilityService>,
    session_id: String,
    stage_type: StageType,
    job_role: String,
}

impl ScoringWorker {
    /// Spawn the worker task for one session
    #[allow(clippy::too_many_arguments)]
    pub fn spawn(
        scoring: Arc<ScoringEngine>,
        profiles: Arc<ProfileManager>,
        difficulty: DifficultyAdapter,
        observability: Arc<ObservabilityService>,
        session_id: String,
        stage_type: StageType,
        job_role: String,
        initial: IntelligenceState,
    ) -> Self {
        let (tx, mut rx) = mpsc::channel::<ScoringJob>(64);
        let state = Arc::new(Mutex::new(initial));

        let deps = WorkerDeps {
            scoring,
            profiles,
            difficulty,
            observability,
            session_id,
            stage_type,
            job_role,
        };

        let worker_state = Arc::clone(&state);
        let handle = tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                process_job(&deps, &worker_state, job).await;
            }
            tracing::debug!(session_id = %deps.session_id, "Scoring worker drained");
        });

        Self {
            jobs: Some(tx),
            handle: Some(handle),
            state,
        }
    }

    /// Enqueue a job; drops (with a log) if the queue is full or closed
    pub fn enqueue(&self, job: ScoringJob) {
        if let Some(jobs) = &self.jobs {
            if let Err(e) = jobs.try_send(job) {
                tracing::error!(error = %e, "Scoring job dropped");
            }
        }
    }

    /// Snapshot the current state
    pub async fn snapshot(&self) -> IntelligenceState {
        self.state.lock().await.clone()
    }

    /// Replace the profile (used at boot, before any jobs run)
    pub async fn set_profile(&self, profile: CandidateProfile) {
        self.state.lock().await.profile = profile;
    }

    pub async fn set_difficulty(&self, difficulty: DifficultyState) {
        self.state.lock().await.difficulty = difficulty;
    }

    /// Close the queue and wait for in-flight jobs, bounded by `budget`
    ///
    /// Returns the final state snapshot regardless of whether the drain
    /// completed in time.
    pub async fn drain(&mut self, budget: std::time::Duration) -> IntelligenceState {
        self.jobs.take();
        if let Some(handle) = self.handle.take() {
            if tokio::time::timeout(budget, handle).await.is_err() {
                tracing::warn!("Scoring worker drain exceeded budget, snapshotting anyway");
            }
        }
        self.snapshot().await
    }
}

async fn process_job(deps: &WorkerDeps, state: &Arc<Mutex<IntelligenceState>>, job: ScoringJob) {
    // Context for the scorer comes from the state before this turn.
    let (profile_context, previous_scores) = {
        let state = state.lock().await;
        (
            deps.profiles.to_context_string(&state.profile),
            state.profile.performance_trajectory.clone(),
        )
    };

    let context = ScoreContext {
        profile_context: (!profile_context.is_empty()).then_some(profile_context),
        previous_scores,
    };

    let score = deps
        .scoring
        .score_answer(
            &job.question,
            &job.answer,
            deps.stage_type,
            &deps.job_role,
            Some(&context),
        )
        .await;

    let trace_id = deps.observability.trace_for_session(&deps.session_id);
    deps.observability
        .record_metric(
            "answer_score",
            score.overall,
            trace_id.as_deref(),
            Some(HashMap::from([
                ("turn".to_string(), json!(job.turn_index)),
                ("dimension".to_string(), json!(score.dimension)),
            ])),
        )
        .await;

    let mut state = state.lock().await;

    let profile = std::mem::take(&mut state.profile);
    state.profile = deps
        .profiles
        .update_after_turn(profile, &job.question, &job.answer, score.overall)
        .await;

    let current_turn = state.profile.current_turn;
    let difficulty = std::mem::take(&mut state.difficulty);
    state.difficulty = deps.difficulty.update(difficulty, score.overall, current_turn);

    state.turn_scores.push(TurnScoreRecord {
        turn: current_turn,
        score: score.overall,
        dimension: score.dimension.clone(),
        feedback: score.feedback.clone(),
    });
    state.answer_scores.push(score);
}
