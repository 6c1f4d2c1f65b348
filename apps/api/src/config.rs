use anyhow::{Context, Result};

use crate::problems::bank::DEFAULT_PROBLEM_BANK_URL;

const DEFAULT_BEST_PRACTICES_KEY: &str = "answers_followup_questions.csv";
const DEFAULT_SESSION_TTL_SECS: u64 = 2 * 60 * 60;
const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;
const DEFAULT_REDIS_PORT: &str = "6379";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub gemini_api_key: String,
    pub secret_key: String,
    /// Object key of the best-practice CSV inside `s3_bucket`.
    pub best_practices_key: String,
    /// Idle lifetime of an interview session; 0 keeps sessions forever.
    pub session_ttl_secs: u64,
    pub problem_bank_url: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: redis_url()?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            secret_key: require_env("SECRET_KEY")?,
            best_practices_key: optional_env("BEST_PRACTICES_KEY")
                .unwrap_or_else(|| DEFAULT_BEST_PRACTICES_KEY.to_string()),
            session_ttl_secs: match optional_env("SESSION_TTL_SECS") {
                Some(v) => parse_session_ttl(&v)?,
                None => DEFAULT_SESSION_TTL_SECS,
            },
            problem_bank_url: optional_env("PROBLEM_BANK_URL")
                .unwrap_or_else(|| DEFAULT_PROBLEM_BANK_URL.to_string()),
            port: optional_env("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// `REDIS_URL` wins; otherwise the URL is assembled from `REDIS_HOST` and `REDIS_PORT`.
fn redis_url() -> Result<String> {
    if let Some(url) = optional_env("REDIS_URL") {
        return Ok(url);
    }
    let host = require_env("REDIS_HOST").context("set REDIS_URL or REDIS_HOST")?;
    let port = optional_env("REDIS_PORT").unwrap_or_else(|| DEFAULT_REDIS_PORT.to_string());
    Ok(redis_url_from_parts(&host, &port))
}

fn parse_session_ttl(raw: &str) -> Result<u64> {
    let ttl: u64 = raw
        .parse()
        .context("SESSION_TTL_SECS must be a whole number of seconds")?;
    if ttl > MAX_SESSION_TTL_SECS {
        anyhow::bail!("SESSION_TTL_SECS must be at most {MAX_SESSION_TTL_SECS} seconds, got {ttl}");
    }
    Ok(ttl)
}

fn redis_url_from_parts(host: &str, port: &str) -> String {
    format!("redis://{host}:{port}/")
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
