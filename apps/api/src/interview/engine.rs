//! Interview Engine: the session state machine.
//!
//! Flow: initialize (seed greeting) → next_question loop → improvements.
//!
//! States: CREATED (one system turn) → AWAITING_ANSWER (interviewer just asked)
//! → CONCLUDED (terminal; only improvements allowed). Every record mutation is
//! a read → modify → compare-and-swap write, so two concurrent turns on one
//! session cannot silently drop each other: the slower writer gets a conflict.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::InterviewCatalog;
use crate::errors::AppError;
use crate::interview::prompts::{
    build_follow_up_prompt, build_improvements_prompt, is_conclusion, FollowUpContext,
    CLOSING_MESSAGE, IMPROVEMENTS_SYSTEM, INTERVIEWER_SYSTEM,
};
use crate::llm_client::TextGenerator;
use crate::models::session::{ChatTurn, InterviewStatus, Role, SessionRecord};
use crate::problems::ProblemSelector;
use crate::retrieval::{BestPracticeIndex, SNIPPETS_PER_QUERY};
use crate::session::{derive_session_key, SessionStore};

#[derive(Debug, Serialize)]
pub struct InitializeResponse {
    pub session_id: String,
    pub interviewer_response: Vec<ChatTurn>,
}

/// Result of one candidate turn.
#[derive(Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// The interviewer asked another question.
    InProgress { question: String },
    /// The interview is over; the client should request improvements next.
    Concluded { message: String, session_id: String },
}

#[derive(Clone)]
pub struct InterviewEngine {
    sessions: Arc<dyn SessionStore>,
    catalog: Arc<dyn InterviewCatalog>,
    problems: ProblemSelector,
    llm: Arc<dyn TextGenerator>,
    best_practices: Arc<BestPracticeIndex>,
}

impl InterviewEngine {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        catalog: Arc<dyn InterviewCatalog>,
        problems: ProblemSelector,
        llm: Arc<dyn TextGenerator>,
        best_practices: Arc<BestPracticeIndex>,
    ) -> Self {
        Self {
            sessions,
            catalog,
            problems,
            llm,
            best_practices,
        }
    }

    /// Creates a session for an already-extracted resume.
    pub async fn initialize(
        &self,
        domain: &str,
        interview_type: &str,
        resume_filename: &str,
        resume_text: String,
    ) -> Result<InitializeResponse, AppError> {
        let session_id = derive_session_key(domain, interview_type, resume_filename)?;

        let domain_id = self
            .catalog
            .domain_id(domain)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No domain found for {domain}")))?;

        let round_id = self
            .catalog
            .round_id(interview_type)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No round found for {interview_type}")))?;

        let rules = self
            .catalog
            .interview_rules(domain_id, round_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound("No rules found for the selected domain and type".to_string())
            })?;

        let problems = self.problems.select(domain, interview_type).await;

        let record = SessionRecord::seeded(
            domain,
            interview_type,
            resume_text,
            rules,
            problems,
            Utc::now(),
        );
        self.sessions.create(&session_id, &record).await?;

        info!(
            "Initialized session {session_id} ({} problems)",
            record.problems.as_ref().map_or(0, Vec::len)
        );

        Ok(InitializeResponse {
            session_id,
            interviewer_response: record.chat_history,
        })
    }

    /// Records the candidate's answer and asks the next question, or concludes.
    pub async fn next_question(
        &self,
        session_id: &str,
        user_answer: &str,
    ) -> Result<TurnOutcome, AppError> {
        let mut record = self.sessions.read(session_id).await?;
        if record.is_concluded() {
            return Err(AppError::Conflict(format!(
                "Interview {session_id} has already concluded"
            )));
        }

        record
            .chat_history
            .push(ChatTurn::new(Role::User, user_answer));
        let elapsed_minutes = record.elapsed_minutes(Utc::now());

        let best_practices = self
            .best_practices
            .retrieve(user_answer, SNIPPETS_PER_QUERY)
            .await
            .map_err(|e| AppError::llm("No follow-up available", e))?;

        let prompt = build_follow_up_prompt(&FollowUpContext {
            rules: &record.rules,
            best_practices: &best_practices,
            history: &record.chat_history,
            user_answer,
            resume: &record.resume_text,
            elapsed_minutes,
            problems: record.problems.as_deref(),
        });

        let reply = self
            .llm
            .generate(&prompt, INTERVIEWER_SYSTEM)
            .await
            .map_err(|e| AppError::llm("No follow-up available", e))?;

        if is_conclusion(&reply) {
            record.status = InterviewStatus::Concluded;
            self.sessions.write(session_id, &record).await?;
            info!("Session {session_id} concluded after {elapsed_minutes:.1} minutes");
            return Ok(TurnOutcome::Concluded {
                message: CLOSING_MESSAGE.to_string(),
                session_id: session_id.to_string(),
            });
        }

        let question = reply.trim().to_string();
        record
            .chat_history
            .push(ChatTurn::new(Role::Interviewer, question.clone()));
        let version = self.sessions.write(session_id, &record).await?;

        info!(
            "Session {session_id} advanced to {} turns (version {version})",
            record.chat_history.len()
        );
        Ok(TurnOutcome::InProgress { question })
    }

    /// Generates feedback from the transcript and closes the session.
    ///
    /// The session is deleted whether or not generation succeeds.
    pub async fn improvements(&self, session_id: &str) -> Result<String, AppError> {
        let record = self.sessions.read(session_id).await?;

        let prompt = build_improvements_prompt(&record.chat_history);
        let generated = self.llm.generate(&prompt, IMPROVEMENTS_SYSTEM).await;

        self.sessions.delete(session_id).await?;

        match generated {
            Ok(text) => {
                info!("Session {session_id} closed with feedback");
                Ok(text.trim().to_string())
            }
            Err(e) => {
                warn!("Session {session_id} closed without feedback");
                Err(AppError::llm("Could not generate improvements", e))
            }
        }
    }
}
