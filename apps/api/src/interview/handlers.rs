use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::interview::engine::{InitializeResponse, TurnOutcome};
use crate::pdf::{ensure_pdf, extract_text};
use crate::routes::form::FormData;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ImprovementsResponse {
    pub improvements: String,
}

fn required<'a>(form: &'a FormData, name: &str) -> Result<&'a str, AppError> {
    form.text(name)
        .ok_or_else(|| AppError::Validation(format!("Missing required field '{name}'")))
}

/// POST /interview/initialize
pub async fn handle_initialize(
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<Json<InitializeResponse>, AppError> {
    let domain = required(&form, "domain")?.to_string();
    let interview_type = required(&form, "type")?.to_string();
    let resume = form
        .take_file("resume")
        .ok_or_else(|| AppError::Validation("Missing required field 'resume'".to_string()))?;

    ensure_pdf(&resume.file_name)?;
    let resume_text = extract_text(resume.bytes).await?;

    let response = state
        .interview
        .initialize(&domain, &interview_type, &resume.file_name, resume_text)
        .await?;
    Ok(Json(response))
}

/// POST /interview/next_question
pub async fn handle_next_question(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<TurnOutcome>, AppError> {
    let session_id = required(&form, "session_id")?;
    let user_answer = required(&form, "user_answer")?;
    let outcome = state.interview.next_question(session_id, user_answer).await?;
    Ok(Json(outcome))
}

/// POST /interview/improvements
pub async fn handle_improvements(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<ImprovementsResponse>, AppError> {
    let session_id = required(&form, "session_id")?;
    let improvements = state.interview.improvements(session_id).await?;
    Ok(Json(ImprovementsResponse { improvements }))
}
