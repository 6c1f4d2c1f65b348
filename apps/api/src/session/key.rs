use crate::errors::AppError;

/// Derives the session key `"{domain}_{interview_type}_{stem}"`.
///
/// The stem is the final path component of the uploaded filename up to its
/// first `.`. Characters outside `[A-Za-z0-9_-]` become `-` so a filename can
/// never smuggle key delimiters or whitespace into the key.
pub fn derive_session_key(
    domain: &str,
    interview_type: &str,
    resume_filename: &str,
) -> Result<String, AppError> {
    let base = resume_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(resume_filename);
    let stem = base.split('.').next().unwrap_or_default();

    let stem: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if stem.trim_matches('-').is_empty() {
        return Err(AppError::Validation(format!(
            "Resume filename '{resume_filename}' has no usable name"
        )));
    }

    Ok(format!("{domain}_{interview_type}_{stem}"))
}
