//! Operational endpoints for the cache and the relational store.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::user::DomainRow;
use crate::session::ProbeReport;
use crate::state::AppState;

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct CacheProbeResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub probe: ProbeReport,
}

/// POST /redis/flushall
///
/// Drops every key in the cache, live interview sessions included.
pub async fn handle_flush_all(State(state): State<AppState>) -> Result<Json<StatusResponse>, AppError> {
    state.sessions.flush_all().await?;
    warn!("Session cache flushed");
    Ok(Json(StatusResponse {
        status: "success",
        message: "All keys flushed from Redis database",
    }))
}

/// POST /testing/database
pub async fn handle_database_probe(
    State(state): State<AppState>,
) -> Result<Json<Vec<DomainRow>>, AppError> {
    let domains = state.catalog.list_domains().await?;
    info!("Database probe returned {} domains", domains.len());
    Ok(Json(domains))
}

/// POST /testing/redis
pub async fn handle_cache_probe(
    State(state): State<AppState>,
) -> Result<Json<CacheProbeResponse>, AppError> {
    let probe = state.sessions.probe().await?;
    info!(
        "Cache probe set '{}' and read back {:?}",
        probe.set_key, probe.retrieved_value
    );
    Ok(Json(CacheProbeResponse {
        status: "success",
        probe,
    }))
}
