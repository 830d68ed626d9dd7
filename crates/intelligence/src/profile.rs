//! Candidate profile manager
//!
//! Builds and maintains a real-time profile of the candidate: verified
//! skills with depth ratings, identified gaps, red flags, strengths,
//! covered topics, and the performance trajectory. The profile is a value
//! type; merge functions return the updated value and the orchestrator
//! replaces its owned instance.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use interview_agent_llm::LanguageModel;

const RESUME_MIN_CHARS: usize = 50;
const PROFILE_UPDATE_MIN_ANSWER_CHARS: usize = 20;
const QUESTION_EXCERPT_CHARS: usize = 200;
const VERIFIED_DEPTH_THRESHOLD: u8 = 3;

/// Assessment of a single skill
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillAssessment {
    /// Depth on a 0-5 scale; 0 means claimed but unverified
    pub depth: u8,
    /// Quote or summary from the candidate
    pub evidence: String,
    pub verified_at_turn: u32,
    /// 0-1
    pub confidence: f64,
}

/// A red flag observed during the interview
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedFlag {
    #[serde(rename = "type")]
    pub kind: String,
    pub detail: String,
}

/// A question asked, with its turn and score
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AskedQuestion {
    pub turn: u32,
    pub question: String,
    pub score: f64,
}

/// Real-time candidate profile built during an interview
///
/// Invariants: `current_turn == performance_trajectory.len()`, and skill
/// depth is monotonically non-decreasing within a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CandidateProfile {
    /// Verified skills with depth ratings
    #[serde(default)]
    pub verified_skills: BTreeMap<String, SkillAssessment>,

    /// Skills in the JD but weak or missing in the candidate
    #[serde(default)]
    pub identified_gaps: Vec<String>,

    /// Inconsistencies and concerning patterns
    #[serde(default)]
    pub red_flags: Vec<RedFlag>,

    #[serde(default)]
    pub strengths: Vec<String>,

    /// Topics already covered; `pending:`-prefixed entries are priorities
    /// that do not block re-asking
    #[serde(default)]
    pub topics_covered: BTreeSet<String>,

    #[serde(default)]
    pub questions_asked: Vec<AskedQuestion>,

    /// Scores in turn order
    #[serde(default)]
    pub performance_trajectory: Vec<f64>,

    #[serde(default)]
    pub key_facts: Vec<String>,

    #[serde(default)]
    pub current_turn: u32,
}

impl CandidateProfile {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    fn has_content(&self) -> bool {
        !self.verified_skills.is_empty()
            || !self.identified_gaps.is_empty()
            || !self.strengths.is_empty()
    }
}

/// Manages candidate profiling via the shadow model
pub struct ProfileManager {
    llm: Arc<dyn LanguageModel>,
}

impl ProfileManager {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Build the initial profile from resume and job description
    ///
    /// Resumes under 50 characters produce an empty profile without a model
    /// call; extraction failures also fall back to the empty profile.
    pub async fn create_initial_profile(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> CandidateProfile {
        let mut profile = CandidateProfile::default();

        if resume_text.trim().len() < RESUME_MIN_CHARS {
            tracing::info!("No resume provided, starting with blank profile");
            return profile;
        }

        let resume_excerpt: String = resume_text.chars().take(3_000).collect();
        let jd_excerpt: String = if job_description.is_empty() {
            "Not provided".to_string()
        } else {
            job_description.chars().take(2_000).collect()
        };

        let prompt = format!(
            r#"Analyze this resume and job description to create an initial candidate profile.

RESUME:
{resume_excerpt}

JOB DESCRIPTION:
{jd_excerpt}

Extract and return JSON:
{{
    "claimed_skills": ["skill1", "skill2"],
    "experience_years": 5,
    "education_level": "Bachelor's/Master's/PhD",
    "potential_gaps": ["skill from JD not in resume"],
    "potential_strengths": ["strong points from resume"],
    "initial_topics": ["topics to explore"]
}}

Focus on factual extraction. Do not infer or assume."#
        );

        let data = match self.llm.generate_json(&prompt).await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create initial profile");
                return profile;
            }
        };

        for skill in string_array(&data, "claimed_skills") {
            profile.verified_skills.insert(
                skill,
                SkillAssessment {
                    depth: 0,
                    evidence: "From resume (unverified)".to_string(),
                    verified_at_turn: 0,
                    confidence: 0.3,
                },
            );
        }

        profile.identified_gaps = string_array(&data, "potential_gaps");
        profile.strengths = string_array(&data, "potential_strengths");

        let experience = data
            .get("experience_years")
            .map(|v| v.to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        profile.key_facts.push(format!("Experience: ~{experience} years"));
        let education = data
            .get("education_level")
            .and_then(|v| v.as_str())
            .unwrap_or("Unknown")
            .to_string();
        profile.key_facts.push(format!("Education: {education}"));

        for topic in string_array(&data, "initial_topics") {
            profile.topics_covered.insert(format!("pending:{topic}"));
        }

        tracing::info!(
            claimed_skills = profile.verified_skills.len(),
            "Initial profile created"
        );
        profile
    }

    /// Merge one Q&A exchange into the profile
    ///
    /// Always advances the turn counter and trajectory. Answers under 20
    /// characters skip the extraction call; extraction failures leave the
    /// rest of the profile unchanged.
    pub async fn update_after_turn(
        &self,
        mut profile: CandidateProfile,
        question: &str,
        answer: &str,
        score: f64,
    ) -> CandidateProfile {
        profile.current_turn += 1;
        profile.performance_trajectory.push(score);
        profile.questions_asked.push(AskedQuestion {
            turn: profile.current_turn,
            question: question.chars().take(QUESTION_EXCERPT_CHARS).collect(),
            score,
        });

        if answer.trim().len() < PROFILE_UPDATE_MIN_ANSWER_CHARS {
            tracing::debug!("Answer too short, skipping profile update");
            return profile;
        }

        let current = json!({
            "verified_skills": profile.verified_skills,
            "strengths": profile.strengths,
            "gaps": profile.identified_gaps,
        });
        let answer_excerpt: String = answer.chars().take(1_500).collect();

        let prompt = format!(
            r#"Analyze this interview exchange and update the candidate profile.

QUESTION ASKED:
{question}

CANDIDATE'S ANSWER:
{answer_excerpt}

ANSWER SCORE: {score}/100

CURRENT PROFILE:
{current}

Based on this exchange, extract:
1. Any skills that were VERIFIED (candidate demonstrated knowledge)
2. Any skills that showed WEAKNESS (candidate struggled)
3. Any RED FLAGS (inconsistencies, concerning statements)
4. Any NEW STRENGTHS identified
5. KEY FACTS learned about the candidate

Return JSON:
{{
    "verified_skills": {{"skill_name": {{"depth": 1-5, "evidence": "brief quote"}}}},
    "weakness_signals": ["areas where candidate struggled"],
    "red_flags": [{{"type": "inconsistency|evasion|concern", "detail": "..."}}],
    "new_strengths": ["newly identified strengths"],
    "key_facts": ["important facts learned"],
    "topic_covered": "main topic of this exchange"
}}"#
        );

        let data = match self.llm.generate_json(&prompt).await {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "Failed to update profile");
                return profile;
            }
        };

        self.merge_extraction(&mut profile, &data, score);
        tracing::debug!(turn = profile.current_turn, "Profile updated");
        profile
    }

    fn merge_extraction(&self, profile: &mut CandidateProfile, data: &Value, score: f64) {
        // Skill depth only moves up; confidence follows the answer score.
        if let Some(skills) = data.get("verified_skills").and_then(|v| v.as_object()) {
            for (skill, assessment) in skills {
                let new_depth = assessment
                    .get("depth")
                    .and_then(|v| v.as_u64())
                    .unwrap_or(3)
                    .min(5) as u8;
                let existing_depth = profile
                    .verified_skills
                    .get(skill)
                    .map(|a| a.depth)
                    .unwrap_or(0);

                if new_depth > existing_depth {
                    profile.verified_skills.insert(
                        skill.clone(),
                        SkillAssessment {
                            depth: new_depth,
                            evidence: assessment
                                .get("evidence")
                                .and_then(|v| v.as_str())
                                .unwrap_or_default()
                                .to_string(),
                            verified_at_turn: profile.current_turn,
                            confidence: if score >= 70.0 { 0.8 } else { 0.5 },
                        },
                    );
                }
            }
        }

        for weakness in string_array(data, "weakness_signals") {
            if !profile.identified_gaps.contains(&weakness) {
                profile.identified_gaps.push(weakness);
            }
        }

        if let Some(flags) = data.get("red_flags").and_then(|v| v.as_array()) {
            for flag in flags {
                let flag = RedFlag {
                    kind: flag
                        .get("type")
                        .and_then(|v| v.as_str())
                        .unwrap_or("concern")
                        .to_string(),
                    detail: flag
                        .get("detail")
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string(),
                };
                if !profile.red_flags.contains(&flag) {
                    profile.red_flags.push(flag);
                }
            }
        }

        for strength in string_array(data, "new_strengths") {
            if !profile.strengths.contains(&strength) {
                profile.strengths.push(strength);
            }
        }

        for fact in string_array(data, "key_facts") {
            if !profile.key_facts.contains(&fact) {
                profile.key_facts.push(fact);
            }
        }

        if let Some(topic) = data.get("topic_covered").and_then(|v| v.as_str()) {
            if !topic.is_empty() {
                profile.topics_covered.insert(topic.to_string());
            }
        }
    }

    /// Render the profile as a prompt-injectable context block
    ///
    /// Only non-empty sections appear; an empty profile renders to an empty
    /// string.
    pub fn to_context_string(&self, profile: &CandidateProfile) -> String {
        if !profile.has_content() {
            return String::new();
        }

        let mut sections = Vec::new();

        let verified: Vec<String> = profile
            .verified_skills
            .iter()
            .filter(|(_, a)| a.depth >= VERIFIED_DEPTH_THRESHOLD)
            .map(|(skill, a)| format!("{skill} (depth: {}/5)", a.depth))
            .collect();
        if !verified.is_empty() {
            sections.push(format!("VERIFIED SKILLS: {}", verified.join(", ")));
        }

        if !profile.identified_gaps.is_empty() {
            let gaps: Vec<&str> = profile
                .identified_gaps
                .iter()
                .take(5)
                .map(|s| s.as_str())
                .collect();
            sections.push(format!("GAPS TO PROBE: {}", gaps.join(", ")));
        }

        if !profile.red_flags.is_empty() {
            let flags: Vec<&str> = profile
                .red_flags
                .iter()
                .take(3)
                .map(|f| f.detail.as_str())
                .collect();
            sections.push(format!("CONCERNS: {}", flags.join("; ")));
        }

        if !profile.strengths.is_empty() {
            let strengths: Vec<&str> =
                profile.strengths.iter().take(3).map(|s| s.as_str()).collect();
            sections.push(format!("STRENGTHS: {}", strengths.join(", ")));
        }

        if !profile.topics_covered.is_empty() {
            let topics: Vec<&str> = profile
                .topics_covered
                .iter()
                .take(10)
                .map(|s| s.as_str())
                .collect();
            sections.push(format!("TOPICS COVERED (DO NOT REPEAT): {}", topics.join(", ")));
        }

        if profile.performance_trajectory.len() >= 3 {
            let recent = &profile.performance_trajectory[profile.performance_trajectory.len() - 3..];
            let avg: f64 = recent.iter().sum::<f64>() / recent.len() as f64;
            let trend = if recent[2] > recent[0] {
                "improving"
            } else if recent[2] < recent[0] {
                "declining"
            } else {
                "stable"
            };
            sections.push(format!("PERFORMANCE: {trend} (avg: {avg:.0}/100)"));
        }

        sections.join("\n")
    }

    /// Suggested focus areas based on the profile
    pub fn suggested_focus(&self, profile: &CandidateProfile) -> Vec<String> {
        let mut suggestions = Vec::new();

        let unverified: Vec<&str> = profile
            .verified_skills
            .iter()
            .filter(|(_, a)| a.depth < 2)
            .take(3)
            .map(|(skill, _)| skill.as_str())
            .collect();
        if !unverified.is_empty() {
            suggestions.push(format!("Verify claimed skills: {}", unverified.join(", ")));
        }

        if !profile.identified_gaps.is_empty() {
            let gaps: Vec<&str> = profile
                .identified_gaps
                .iter()
                .take(2)
                .map(|s| s.as_str())
                .collect();
            suggestions.push(format!("Probe gaps: {}", gaps.join(", ")));
        }

        let low_turns: Vec<String> = profile
            .performance_trajectory
            .iter()
            .enumerate()
            .filter(|(_, score)| **score < 50.0)
            .map(|(i, _)| (i + 1).to_string())
            .collect();
        if !low_turns.is_empty() {
            let tail_start = low_turns.len().saturating_sub(3);
            suggestions.push(format!(
                "Follow up on weak answers from turns: {}",
                low_turns[tail_start..].join(", ")
            ));
        }

        suggestions
    }
}

fn string_array(data: &Value, field: &str) -> Vec<String> {
    data.get(field)
        .and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str())
                .map(|s| s.to_string())
                .collect()
        })
        .unwrap_or_default()
}
