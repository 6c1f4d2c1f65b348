//! Interview catalog: read-only lookups of domain, round, rule and problem metadata.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::errors::AppError;
use crate::models::user::DomainRow;

/// Relational metadata the interview flow depends on.
///
/// Carried in `AppState` as `Arc<dyn InterviewCatalog>`.
#[async_trait]
pub trait InterviewCatalog: Send + Sync {
    /// Exact-name lookup in `domains`.
    async fn domain_id(&self, name: &str) -> Result<Option<i64>, AppError>;

    /// Exact-name lookup in `rounds`.
    async fn round_id(&self, name: &str) -> Result<Option<i64>, AppError>;

    /// Rule text for a `(domain, round)` pair.
    async fn interview_rules(&self, domain_id: i64, round_id: i64)
        -> Result<Option<String>, AppError>;

    /// Problem-bank slug stored for a problem id.
    async fn problem_slug(&self, problem_id: u32) -> Result<Option<String>, AppError>;

    async fn list_domains(&self) -> Result<Vec<DomainRow>, AppError>;
}

/// Postgres-backed catalog.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewCatalog for PgCatalog {
    async fn domain_id(&self, name: &str) -> Result<Option<i64>, AppError> {
        let id = sqlx::query_scalar("SELECT id::int8 FROM domains WHERE name = $1 LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn round_id(&self, name: &str) -> Result<Option<i64>, AppError> {
        let id = sqlx::query_scalar("SELECT id::int8 FROM rounds WHERE name = $1 LIMIT 1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn interview_rules(
        &self,
        domain_id: i64,
        round_id: i64,
    ) -> Result<Option<String>, AppError> {
        // rule_content may be text or jsonb depending on the deployment; cast to text either way.
        let rules = sqlx::query_scalar(
            "SELECT rule_content::text FROM interview_rules WHERE domain_id = $1 AND round_id = $2 LIMIT 1",
        )
        .bind(domain_id)
        .bind(round_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(rules)
    }

    async fn problem_slug(&self, problem_id: u32) -> Result<Option<String>, AppError> {
        let slug = sqlx::query_scalar("SELECT name FROM problems WHERE id = $1 LIMIT 1")
            .bind(i64::from(problem_id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(slug)
    }

    async fn list_domains(&self) -> Result<Vec<DomainRow>, AppError> {
        let rows = sqlx::query_as::<_, DomainRow>("SELECT id::int8 AS id, name FROM domains ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
