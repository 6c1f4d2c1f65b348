// Interview Engine LLM prompt templates.
// All prompts for the interview module are defined here.

use crate::llm_client::prompts::render_template;
use crate::models::problem::ProblemDetail;
use crate::models::session::{ChatTurn, Role};

/// Token the model replies with once the interview should end.
pub const CONCLUDE_TOKEN: &str = "conclude";

/// Minutes that must elapse before the model may conclude.
pub const MIN_INTERVIEW_MINUTES: u32 = 30;

pub const CLOSING_MESSAGE: &str = "Thank you so much for taking the time to talk with us today. \
We really enjoyed learning more about your background and the skills you bring to the role. \
We'll review everything and be in touch soon about the next steps. \
If you have any questions in the meantime, feel free to reach out. Have a great day!";

pub const INTERVIEWER_SYSTEM: &str = "\
You are a world-class technical interviewer. You speak directly to the candidate in plain text. \
You never use headings, lists, or markdown.";

pub const FOLLOW_UP_PROMPT: &str = r#"Frame the next thing you say to the candidate, using the context below.

INTERVIEW STRUCTURE AND RULES:
{rules}

BEST PRACTICES FOR QUESTION FRAMING:
{best_practices}

CHAT HISTORY SO FAR:
{chat_history}

THE CANDIDATE'S ANSWER TO YOUR PREVIOUS QUESTION:
{user_answer}

THE CANDIDATE'S RESUME:
{resume}

MINUTES ELAPSED SINCE THE INTERVIEW STARTED: {elapsed_minutes}

RULES:
1. Respond to the candidate's answer briefly, then ask exactly ONE question. Never ask several at once.
2. Ask a follow-up only when the answer needs clarification; assess the answer before following up.
3. Never ask more than 2 follow-ups on one topic; then move to a different topic.
4. Questions are medium difficulty, short, precise, technical, and connected to the candidate's last answer.
5. If the answer is a self-introduction, you may ask for a clarification from it, but nothing unnecessary.
6. Keep a formal tone consistent with the best practices. Do not open with "Given your".
7. Plain text only. No headings.
8. If every criterion in the interview rules is met AND more than {min_minutes} minutes have elapsed, reply with the single word "conclude" and nothing else."#;

pub const PROBLEMS_SECTION: &str = r#"

CODING PROBLEMS FOR THIS SESSION (prefer these over resume-based questions):
{problems}"#;

pub const IMPROVEMENTS_SYSTEM: &str = "\
You are an expert interviewer giving a candidate written feedback after a mock interview.";

pub const IMPROVEMENTS_PROMPT: &str = r#"Based on the following interview transcript, provide detailed and constructive improvement suggestions for the candidate as bullet points.

TRANSCRIPT:
{chat_history}"#;

/// Renders the transcript one turn per line as `role: content`.
pub fn render_history(history: &[ChatTurn]) -> String {
    history
        .iter()
        .map(|turn| {
            let role = match turn.role {
                Role::System => "system",
                Role::User => "candidate",
                Role::Interviewer => "interviewer",
            };
            format!("{role}: {}", turn.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_problems(problems: &[ProblemDetail]) -> String {
    problems
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut block = format!("Problem {}: {} ({})", i + 1, p.title, p.difficulty);
            if let Some(content) = p.content.as_deref() {
                block.push('\n');
                block.push_str(content);
            }
            if let Some(examples) = p.example_testcases.as_deref() {
                block.push_str("\nExample testcases:\n");
                block.push_str(examples);
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub struct FollowUpContext<'a> {
    pub rules: &'a str,
    pub best_practices: &'a [String],
    pub history: &'a [ChatTurn],
    pub user_answer: &'a str,
    pub resume: &'a str,
    pub elapsed_minutes: f64,
    pub problems: Option<&'a [ProblemDetail]>,
}

pub fn build_follow_up_prompt(ctx: &FollowUpContext<'_>) -> String {
    let best_practices = if ctx.best_practices.is_empty() {
        "(none)".to_string()
    } else {
        ctx.best_practices
            .iter()
            .map(|s| format!("- {s}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let history = render_history(ctx.history);
    let elapsed = format!("{:.1}", ctx.elapsed_minutes);
    let min_minutes = MIN_INTERVIEW_MINUTES.to_string();
    let mut prompt = render_template(
        FOLLOW_UP_PROMPT,
        &[
            ("rules", ctx.rules),
            ("best_practices", best_practices.as_str()),
            ("chat_history", history.as_str()),
            ("user_answer", ctx.user_answer),
            ("resume", ctx.resume),
            ("elapsed_minutes", elapsed.as_str()),
            ("min_minutes", min_minutes.as_str()),
        ],
    );

    if let Some(problems) = ctx.problems.filter(|p| !p.is_empty()) {
        let rendered = render_problems(problems);
        prompt.push_str(&render_template(PROBLEMS_SECTION, &[("problems", rendered.as_str())]));
    }

    prompt
}

pub fn build_improvements_prompt(history: &[ChatTurn]) -> String {
    render_template(
        IMPROVEMENTS_PROMPT,
        &[("chat_history", render_history(history).as_str())],
    )
}

/// True when the model signalled the end of the interview.
pub fn is_conclusion(reply: &str) -> bool {
    reply.to_lowercase().contains(CONCLUDE_TOKEN)
}
