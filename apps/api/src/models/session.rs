use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::problem::ProblemDetail;

/// Greeting every interview opens with.
pub const SEED_GREETING: &str =
    "Hi I am Alice. I am your interviewer today. Could you please introduce yourself?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Interviewer,
}

/// One entry of the append-only chat history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterviewStatus {
    #[default]
    InProgress,
    Concluded,
}

/// The value stored under a session key.
///
/// `type` and `resume` are the persisted field names. A record missing
/// `status` or `version` decodes as in progress at version 0; any other
/// shape mismatch is reported as corrupt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub domain: String,
    #[serde(rename = "type")]
    pub interview_type: String,
    #[serde(rename = "resume")]
    pub resume_text: String,
    pub rules: String,
    pub chat_history: Vec<ChatTurn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problems: Option<Vec<ProblemDetail>>,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub status: InterviewStatus,
    /// Optimistic-concurrency counter, bumped by the store on every successful write.
    #[serde(default)]
    pub version: u64,
}

impl SessionRecord {
    /// Builds a fresh record seeded with the interviewer greeting.
    pub fn seeded(
        domain: &str,
        interview_type: &str,
        resume_text: String,
        rules: String,
        problems: Option<Vec<ProblemDetail>>,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            domain: domain.to_string(),
            interview_type: interview_type.to_string(),
            resume_text,
            rules,
            chat_history: vec![ChatTurn::new(Role::System, SEED_GREETING)],
            problems,
            start_time,
            status: InterviewStatus::InProgress,
            version: 0,
        }
    }

    /// Minutes since the interview started.
    pub fn elapsed_minutes(&self, now: DateTime<Utc>) -> f64 {
        (now - self.start_time).num_seconds() as f64 / 60.0
    }

    pub fn is_concluded(&self) -> bool {
        self.status == InterviewStatus::Concluded
    }
}
