use std::sync::Arc;

use crate::auth::token::TokenSigner;
use crate::auth::users::UserStore;
use crate::catalog::InterviewCatalog;
use crate::evaluation::ResumeEvaluator;
use crate::interview::engine::InterviewEngine;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every external collaborator sits behind a trait object so handlers run
/// unchanged against in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<dyn SessionStore>,
    pub catalog: Arc<dyn InterviewCatalog>,
    pub users: Arc<dyn UserStore>,
    pub interview: InterviewEngine,
    pub evaluator: ResumeEvaluator,
    pub tokens: TokenSigner,
}
