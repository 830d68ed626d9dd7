//! Session context resolved at boot

use crate::{Language, StageType};
use serde::{Deserialize, Serialize};

/// Immutable context for one live interview session
///
/// Resolved from the session record at boot; missing values fall back to
/// `{hr, "General", en, "", "", none}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionContext {
    /// Stable session ID, also the media room name and trace key
    pub session_id: String,
    pub stage_type: StageType,
    pub job_role: String,
    pub language: Language,
    pub resume_text: String,
    pub job_description: String,
    /// Parent application, absent for detached practice sessions
    pub application_id: Option<String>,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            stage_type: StageType::Hr,
            job_role: "General".to_string(),
            language: Language::En,
            resume_text: String::new(),
            job_description: String::new(),
            application_id: None,
        }
    }

    pub fn with_stage(mut self, stage_type: StageType) -> Self {
        self.stage_type = stage_type;
        self
    }

    pub fn with_job_role(mut self, job_role: impl Into<String>) -> Self {
        self.job_role = job_role.into();
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_resume(mut self, resume_text: impl Into<String>) -> Self {
        self.resume_text = resume_text.into();
        self
    }

    pub fn with_job_description(mut self, job_description: impl Into<String>) -> Self {
        self.job_description = job_description.into();
        self
    }

    pub fn with_application_id(mut self, application_id: impl Into<String>) -> Self {
        self.application_id = Some(application_id.into());
        self
    }
}
