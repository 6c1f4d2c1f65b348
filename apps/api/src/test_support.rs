//! In-memory fakes for every external collaborator, shared by unit tests.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::auth::token::TokenSigner;
use crate::auth::users::UserStore;
use crate::catalog::InterviewCatalog;
use crate::errors::AppError;
use crate::evaluation::ResumeEvaluator;
use crate::interview::engine::InterviewEngine;
use crate::llm_client::{Embedder, LlmError, TextGenerator};
use crate::models::problem::ProblemDetail;
use crate::models::session::{ChatTurn, Role};
use crate::models::user::{DomainRow, UserRow};
use crate::problems::bank::ProblemBank;
use crate::problems::ProblemSelector;
use crate::retrieval::BestPracticeIndex;
use crate::session::memory::InMemorySessionStore;
use crate::session::SessionStore;
use crate::state::AppState;

pub const TEST_SECRET: &str = "test-secret";

/// One-page resume with a Helvetica text layer: "Jane Doe" then a headline.
pub const RESUME_PDF: &[u8] = include_bytes!(concat!(env!("CARGO_MANIFEST_DIR"), "/testdata/resume.pdf"));

// ── Catalog ─────────────────────────────────────────────────────────────────

/// Domains `DS`, `SDE`; rounds `TECHNICAL`, `TECHNICAL_1`, `HR`.
/// Every pair has rules except `DS`/`HR`. Problem ids 1..=50 map to `problem-<id>`.
pub struct FakeCatalog {
    domains: Vec<DomainRow>,
    rounds: HashMap<String, i64>,
    rules: HashMap<(i64, i64), String>,
}

impl FakeCatalog {
    pub fn standard() -> Self {
        let domains = vec![
            DomainRow {
                id: 1,
                name: "DS".to_string(),
            },
            DomainRow {
                id: 2,
                name: "SDE".to_string(),
            },
        ];
        let rounds = [("TECHNICAL", 1), ("TECHNICAL_1", 2), ("HR", 3)]
            .into_iter()
            .map(|(name, id)| (name.to_string(), id))
            .collect();
        let rules = [(1, 1), (1, 2), (2, 1), (2, 2), (2, 3)]
            .into_iter()
            .map(|pair| (pair, format!("Rules for domain {} round {}", pair.0, pair.1)))
            .collect();
        Self {
            domains,
            rounds,
            rules,
        }
    }
}

#[async_trait]
impl InterviewCatalog for FakeCatalog {
    async fn domain_id(&self, name: &str) -> Result<Option<i64>, AppError> {
        Ok(self.domains.iter().find(|d| d.name == name).map(|d| d.id))
    }

    async fn round_id(&self, name: &str) -> Result<Option<i64>, AppError> {
        Ok(self.rounds.get(name).copied())
    }

    async fn interview_rules(
        &self,
        domain_id: i64,
        round_id: i64,
    ) -> Result<Option<String>, AppError> {
        Ok(self.rules.get(&(domain_id, round_id)).cloned())
    }

    async fn problem_slug(&self, problem_id: u32) -> Result<Option<String>, AppError> {
        Ok((1..=50)
            .contains(&problem_id)
            .then(|| format!("problem-{problem_id}")))
    }

    async fn list_domains(&self) -> Result<Vec<DomainRow>, AppError> {
        Ok(self.domains.clone())
    }
}

// ── Problem bank ────────────────────────────────────────────────────────────

enum BankMode {
    Healthy,
    Unavailable,
    NotFound,
}

pub struct FakeProblemBank {
    mode: BankMode,
}

impl FakeProblemBank {
    pub fn healthy() -> Self {
        Self {
            mode: BankMode::Healthy,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            mode: BankMode::Unavailable,
        }
    }

    pub fn not_found() -> Self {
        Self {
            mode: BankMode::NotFound,
        }
    }
}

#[async_trait]
impl ProblemBank for FakeProblemBank {
    async fn fetch(&self, slug: &str) -> Result<Option<ProblemDetail>, AppError> {
        match self.mode {
            BankMode::Healthy => Ok(Some(ProblemDetail {
                title: slug.to_string(),
                difficulty: "Medium".to_string(),
                content: Some(format!("Solve {slug}.")),
                example_testcases: None,
            })),
            BankMode::Unavailable => Err(AppError::Upstream("connection refused".to_string())),
            BankMode::NotFound => Ok(None),
        }
    }
}

// ── Providers ───────────────────────────────────────────────────────────────

/// Deterministic hashed bag-of-words embedding: texts sharing words score higher.
pub struct BagOfWordsEmbedder;

const EMBEDDING_DIMS: usize = 256;

impl BagOfWordsEmbedder {
    fn vectorize(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; EMBEDDING_DIMS];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let mut hasher = DefaultHasher::new();
            token.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() % EMBEDDING_DIMS as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for BagOfWordsEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        Ok(Self::vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Ok(texts.iter().map(|t| Self::vectorize(t)).collect())
    }
}

/// Embedder whose provider is always down.
pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
        Err(provider_down())
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        Err(provider_down())
    }
}

fn provider_down() -> LlmError {
    LlmError::Api {
        status: 503,
        message: "provider unavailable".to_string(),
    }
}

/// Replays queued replies in call order; `Err(())` simulates a provider failure.
/// Once the queue is empty every call gets a generic follow-up question.
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String, ()>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub const DEFAULT_REPLY: &'static str = "Could you elaborate on that?";

    pub fn new(replies: Vec<Result<String, ()>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt received so far, oldest first.
    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.prompts.lock().await.push(prompt.to_string());
        match self.replies.lock().await.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(())) => Err(provider_down()),
            None => Ok(Self::DEFAULT_REPLY.to_string()),
        }
    }
}

/// Commits a competing candidate turn to the session while the engine waits
/// on generation, so the engine's own write arrives stale.
pub struct InterleavingGenerator {
    store: Arc<InMemorySessionStore>,
    key: String,
}

impl InterleavingGenerator {
    pub const COMPETING_ANSWER: &'static str = "answer from another tab";

    pub fn new(store: Arc<InMemorySessionStore>, key: &str) -> Self {
        Self {
            store,
            key: key.to_string(),
        }
    }
}

#[async_trait]
impl TextGenerator for InterleavingGenerator {
    async fn generate(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        if let Ok(mut record) = self.store.read(&self.key).await {
            record
                .chat_history
                .push(ChatTurn::new(Role::User, Self::COMPETING_ANSWER));
            let _ = self.store.write(&self.key, &record).await;
        }
        Ok("What did you measure?".to_string())
    }
}

// ── Users ───────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct FakeUserStore {
    users: Mutex<HashMap<String, UserRow>>,
}

#[async_trait]
impl UserStore for FakeUserStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<Uuid, AppError> {
        let mut users = self.users.lock().await;
        if users.contains_key(username) {
            return Err(AppError::Conflict(format!(
                "Username '{username}' is already taken"
            )));
        }
        let id = Uuid::new_v4();
        users.insert(
            username.to_string(),
            UserRow {
                id,
                username: username.to_string(),
                password: password_hash.to_string(),
            },
        );
        Ok(id)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRow>, AppError> {
        Ok(self.users.lock().await.get(username).cloned())
    }
}

// ── Wiring ──────────────────────────────────────────────────────────────────

pub fn corpus() -> Vec<String> {
    vec![
        "I cached hot keys in Redis with a TTL How did you avoid stale reads?".to_string(),
        "I tuned Postgres indexes for slow queries Which index types did you compare?".to_string(),
        "I led the migration to Kubernetes What was your rollback plan?".to_string(),
        "I built a Rust service with tokio How did you bound concurrency?".to_string(),
    ]
}

async fn best_practices() -> Arc<BestPracticeIndex> {
    Arc::new(
        BestPracticeIndex::build(corpus(), Arc::new(BagOfWordsEmbedder))
            .await
            .expect("fake embedder never fails"),
    )
}

pub async fn engine_with(
    store: Arc<InMemorySessionStore>,
    generator: Arc<dyn TextGenerator>,
    bank: FakeProblemBank,
) -> InterviewEngine {
    let catalog: Arc<dyn InterviewCatalog> = Arc::new(FakeCatalog::standard());
    let problems = ProblemSelector::new(catalog.clone(), Arc::new(bank));
    InterviewEngine::new(store, catalog, problems, generator, best_practices().await)
}

/// Full application state over fakes. Returns the session store for inspection.
pub async fn test_state(generator: Arc<ScriptedGenerator>) -> (AppState, Arc<InMemorySessionStore>) {
    let store = Arc::new(InMemorySessionStore::new());
    let catalog: Arc<dyn InterviewCatalog> = Arc::new(FakeCatalog::standard());
    let interview = engine_with(store.clone(), generator.clone(), FakeProblemBank::healthy()).await;
    let evaluator = ResumeEvaluator::new(Arc::new(BagOfWordsEmbedder), generator);

    let state = AppState {
        sessions: store.clone(),
        catalog,
        users: Arc::new(FakeUserStore::default()),
        interview,
        evaluator,
        tokens: TokenSigner::new(TEST_SECRET.as_bytes()),
    };
    (state, store)
}
