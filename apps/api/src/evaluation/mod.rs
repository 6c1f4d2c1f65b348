//! Evaluation Engine: ATS-style resume scoring against a job description.
//!
//! `ats_score = keyword * 50 + grammar + layout`, where keyword similarity is
//! in `[0, 1]`, grammar is out of 30 and layout out of 20.

pub mod handlers;
pub mod layout;
pub mod prompts;

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::evaluation::layout::layout_check;
use crate::evaluation::prompts::{build_grammar_prompt, build_suggestions_prompt, SUGGESTIONS_SYSTEM};
use crate::llm_client::embeddings::cosine_similarity;
use crate::llm_client::prompts::NUMBER_ONLY_SYSTEM;
use crate::llm_client::{strip_code_fences, Embedder, TextGenerator};

const KEYWORD_WEIGHT: f64 = 50.0;
const GRAMMAR_MAX: f64 = 30.0;

pub const NO_SUGGESTIONS: &str = "No suggestions available.";

#[derive(Debug, Serialize)]
pub struct ScoreBreakdown {
    pub keyword_score: String,
    pub grammar_score: f64,
    pub layout_score: u32,
}

#[derive(Debug, Serialize)]
pub struct EvaluationReport {
    pub ats_score: String,
    pub ats_score_breakdown: ScoreBreakdown,
    pub suggestions: Vec<String>,
}

#[derive(Clone)]
pub struct ResumeEvaluator {
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn TextGenerator>,
}

impl ResumeEvaluator {
    pub fn new(embedder: Arc<dyn Embedder>, llm: Arc<dyn TextGenerator>) -> Self {
        Self { embedder, llm }
    }

    pub async fn evaluate(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<EvaluationReport, AppError> {
        let keyword = self.keyword_similarity(job_description, resume_text).await?;
        let grammar = self.grammar_score(resume_text).await?;
        let layout = layout_check(resume_text);
        let suggestions = self.suggestions(resume_text, job_description).await;

        let total = f64::from(keyword) * KEYWORD_WEIGHT + grammar + f64::from(layout);
        info!("Resume evaluated: ats={total:.2} keyword={keyword:.3} grammar={grammar:.2} layout={layout}");

        Ok(EvaluationReport {
            ats_score: format!("{total:.2}"),
            ats_score_breakdown: ScoreBreakdown {
                keyword_score: format!("{keyword:.4}"),
                grammar_score: grammar,
                layout_score: layout,
            },
            suggestions,
        })
    }

    /// Cosine similarity of the two texts' embeddings, clamped to `[0, 1]`.
    async fn keyword_similarity(&self, job_description: &str, resume_text: &str) -> Result<f32, AppError> {
        let texts = [job_description.to_string(), resume_text.to_string()];
        let vectors = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| AppError::llm("Keyword scoring failed", e))?;

        match vectors.as_slice() {
            [jd, resume] => Ok(cosine_similarity(jd, resume).clamp(0.0, 1.0)),
            _ => Err(AppError::Llm(format!(
                "Keyword scoring failed: expected 2 embeddings, got {}",
                vectors.len()
            ))),
        }
    }

    async fn grammar_score(&self, resume_text: &str) -> Result<f64, AppError> {
        let reply = self
            .llm
            .generate(&build_grammar_prompt(resume_text), NUMBER_ONLY_SYSTEM)
            .await
            .map_err(|e| AppError::llm("Grammar check failed", e))?;

        let errors = parse_error_count(&reply).ok_or_else(|| {
            AppError::Llm(format!("Grammar check returned a non-numeric reply: {reply:?}"))
        })?;
        Ok(grammar_score(errors, resume_text.split_whitespace().count()))
    }

    async fn suggestions(&self, resume_text: &str, job_description: &str) -> Vec<String> {
        let prompt = build_suggestions_prompt(resume_text, job_description);
        match self.llm.generate(&prompt, SUGGESTIONS_SYSTEM).await {
            Ok(reply) => {
                let sentences = split_suggestions(&reply);
                if sentences.is_empty() {
                    vec![NO_SUGGESTIONS.to_string()]
                } else {
                    sentences
                }
            }
            Err(e) => {
                warn!("Suggestion generation failed: {e}");
                vec![NO_SUGGESTIONS.to_string()]
            }
        }
    }
}

fn parse_error_count(reply: &str) -> Option<u64> {
    strip_code_fences(reply).trim().parse().ok()
}

/// `max(0, 30 * (1 - errors / words))`; an empty text has an error ratio of 0.
pub fn grammar_score(errors: u64, word_count: usize) -> f64 {
    let ratio = if word_count == 0 {
        0.0
    } else {
        errors as f64 / word_count as f64
    };
    (GRAMMAR_MAX * (1.0 - ratio)).max(0.0)
}

/// Splits prose into sentences on `". "`, each ending in exactly one period.
pub fn split_suggestions(text: &str) -> Vec<String> {
    text.trim()
        .split(". ")
        .map(|s| s.trim().trim_end_matches('.'))
        .filter(|s| !s.is_empty())
        .map(|s| format!("{s}."))
        .collect()
}
