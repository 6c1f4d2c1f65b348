use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::evaluation::EvaluationReport;
use crate::pdf::{ensure_pdf, extract_text};
use crate::routes::form::FormData;
use crate::state::AppState;

/// POST /resume/evaluate_resume
pub async fn handle_evaluate_resume(
    State(state): State<AppState>,
    mut form: FormData,
) -> Result<Json<EvaluationReport>, AppError> {
    let job_description = form.text("job_description").map(str::to_string);
    let (Some(resume), Some(job_description)) = (form.take_file("resume"), job_description) else {
        return Err(AppError::Validation(
            "Both resume and job description are required".to_string(),
        ));
    };
    ensure_pdf(&resume.file_name)?;

    let resume_text = extract_text(resume.bytes).await?;
    let report = state.evaluator.evaluate(&resume_text, &job_description).await?;
    Ok(Json(report))
}
