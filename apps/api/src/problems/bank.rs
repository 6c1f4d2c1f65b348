//! Problem bank client: resolves a problem slug to its full description over GraphQL.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::models::problem::ProblemDetail;

pub const DEFAULT_PROBLEM_BANK_URL: &str = "https://leetcode.com/graphql/";
const REQUEST_TIMEOUT_SECS: u64 = 30;

const QUESTION_QUERY: &str = "query questionDetail($titleSlug: String!) { \
    question(titleSlug: $titleSlug) { title difficulty content exampleTestcases } }";

/// Source of problem descriptions.
///
/// Carried by the `ProblemSelector` as `Arc<dyn ProblemBank>`.
#[async_trait]
pub trait ProblemBank: Send + Sync {
    /// Returns `Ok(None)` when the bank answers with a non-success status or an
    /// empty question; transport failures are errors.
    async fn fetch(&self, slug: &str) -> Result<Option<ProblemDetail>, AppError>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Variables<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Variables<'a> {
    title_slug: &'a str,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<QuestionData>,
}

#[derive(Debug, Deserialize)]
struct QuestionData {
    question: Option<ProblemDetail>,
}

#[derive(Clone)]
pub struct GraphQlProblemBank {
    client: Client,
    url: String,
}

impl GraphQlProblemBank {
    pub fn new(url: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(e.into()))?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl ProblemBank for GraphQlProblemBank {
    async fn fetch(&self, slug: &str) -> Result<Option<ProblemDetail>, AppError> {
        let body = GraphQlRequest {
            query: QUESTION_QUERY,
            variables: Variables { title_slug: slug },
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("problem bank request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!("Problem bank returned {status} for '{slug}'");
            return Ok(None);
        }

        let parsed: GraphQlResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("problem bank reply undecodable: {e}")))?;

        Ok(extract_question(parsed))
    }
}

fn extract_question(response: GraphQlResponse) -> Option<ProblemDetail> {
    response.data.and_then(|d| d.question)
}
