// Evaluation Engine LLM prompt templates.

use crate::llm_client::prompts::render_template;

pub const GRAMMAR_COUNT_PROMPT: &str = r#"Here is the text of a resume:

{resume}

Count the grammatical errors in it. Reply with the number of errors only."#;

pub const SUGGESTIONS_SYSTEM: &str = "\
You are a senior recruiter reviewing a resume against a job description. \
You write feedback as plain sentences, never as headings, lists or dialogue.";

pub const SUGGESTIONS_PROMPT: &str = r#"Review the resume below against the job description, in the style of interview feedback. Base every remark on the resume text itself and quote from it when proposing a change.

Cover these areas in order:

Bullet points. Are achievements, responsibilities and skills laid out as bullet points? Acknowledge good formatting; otherwise show how a dense paragraph from the resume would read as bullets.

Formal tone. Is the language formal and professional? Rewrite any casual sentence you find, for example "I really like working with teams and get things done quickly" becomes "Collaborated with cross-functional teams to deliver projects within deadlines".

Keyword match. Which keywords or skills stressed by the job description are missing or under-represented? Show how an existing line could be reworded to cover them.

Grammar. Point out grammatical errors and give the corrected sentence.

Metrics. Do contributions carry measurable results such as "reduced response time by 30%"? Where they do not, suggest where numbers belong.

Contact information. Is there a phone number and an email address? If not, ask for them.

Sections. Are "Skills", "Projects" and "Education" present? Suggest any that are missing.

Finish with the changes that would most improve how well the resume fits the job description. Respond in sentences only.

JOB DESCRIPTION:
{job_description}

RESUME:
{resume}"#;

pub fn build_grammar_prompt(resume: &str) -> String {
    render_template(GRAMMAR_COUNT_PROMPT, &[("resume", resume)])
}

pub fn build_suggestions_prompt(resume: &str, job_description: &str) -> String {
    render_template(
        SUGGESTIONS_PROMPT,
        &[("job_description", job_description), ("resume", resume)],
    )
}
