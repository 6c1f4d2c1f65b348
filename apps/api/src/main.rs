mod auth;
mod catalog;
mod config;
mod db;
mod errors;
mod evaluation;
mod interview;
mod llm_client;
mod models;
mod pdf;
mod problems;
mod retrieval;
mod routes;
mod session;
mod state;
#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::auth::token::TokenSigner;
use crate::auth::users::PgUserStore;
use crate::catalog::{InterviewCatalog, PgCatalog};
use crate::config::Config;
use crate::db::create_pool;
use crate::evaluation::ResumeEvaluator;
use crate::interview::engine::InterviewEngine;
use crate::llm_client::LlmClient;
use crate::problems::bank::GraphQlProblemBank;
use crate::problems::ProblemSelector;
use crate::retrieval::BestPracticeIndex;
use crate::routes::build_router;
use crate::session::RedisSessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Prep2Pro API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let catalog: Arc<dyn InterviewCatalog> = Arc::new(PgCatalog::new(db.clone()));
    let users = Arc::new(PgUserStore::new(db));

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    let sessions = Arc::new(
        RedisSessionStore::connect(&redis, config.session_ttl_secs)
            .await
            .context("connecting to Redis")?,
    );

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize LLM client
    let llm = Arc::new(LlmClient::new(config.gemini_api_key.clone())?);
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Best-practice index: download and embed the corpus once
    let corpus =
        retrieval::corpus::load_from_s3(&s3, &config.s3_bucket, &config.best_practices_key).await?;
    let best_practices = Arc::new(
        BestPracticeIndex::build(corpus, llm.clone())
            .await
            .context("embedding the best-practice corpus")?,
    );
    if best_practices.is_empty() {
        warn!("Best-practice corpus is empty; follow-up prompts will carry no examples");
    } else {
        info!("Best-practice index ready ({} documents)", best_practices.len());
    }

    let bank = Arc::new(GraphQlProblemBank::new(config.problem_bank_url.clone())?);
    let problems = ProblemSelector::new(catalog.clone(), bank);

    // Build app state
    let state = AppState {
        sessions: sessions.clone(),
        catalog: catalog.clone(),
        users,
        interview: InterviewEngine::new(sessions, catalog, problems, llm.clone(), best_practices),
        evaluator: ResumeEvaluator::new(llm.clone(), llm),
        tokens: TokenSigner::new(config.secret_key.as_bytes()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "prep2pro-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
