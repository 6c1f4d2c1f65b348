use anyhow::anyhow;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::auth::password::{hash_password, verify_password};
use crate::errors::AppError;
use crate::routes::form::FormData;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

fn credentials(form: &FormData) -> Result<(String, String), AppError> {
    match (form.text("username"), form.text("password")) {
        (Some(username), Some(password)) => Ok((username.to_string(), password.to_string())),
        _ => Err(AppError::Validation(
            "Username and password are required".to_string(),
        )),
    }
}

/// Runs CPU-bound Argon2 work on the blocking pool.
async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Internal(anyhow!("password task failed: {e}")))
}

/// POST /auth/signup
pub async fn handle_signup(
    State(state): State<AppState>,
    form: FormData,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let (username, password) = credentials(&form)?;
    let hash = blocking(move || hash_password(&password)).await??;

    let id = state.users.create(&username, &hash).await?;
    info!("Registered user {id}");
    Ok((
        StatusCode::CREATED,
        MessageResponse::new("User registered successfully"),
    ))
}

/// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    form: FormData,
) -> Result<Json<TokenResponse>, AppError> {
    let (username, password) = credentials(&form)?;

    let Some(user) = state.users.find_by_username(&username).await? else {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };
    let stored = user.password.clone();
    if !blocking(move || verify_password(&stored, &password)).await? {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = state
        .tokens
        .issue(user.id)
        .map_err(|e| AppError::Internal(anyhow!("token signing failed: {e}")))?;
    info!("User {} logged in", user.id);
    Ok(Json(TokenResponse { token }))
}

/// POST /auth/logout
///
/// Tokens are stateless, so there is nothing to revoke. A bearer token, if
/// sent, is only checked for logging.
pub async fn handle_logout(State(state): State<AppState>, headers: HeaderMap) -> Json<MessageResponse> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    if let Some(token) = bearer {
        match state.tokens.verify(token.trim()) {
            Ok(claims) => info!("User {} logged out", claims.user_id),
            Err(e) => warn!("Logout with unusable token: {e}"),
        }
    }
    MessageResponse::new("Logged out successfully")
}
