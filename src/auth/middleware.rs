//! Request authentication extractor and shared application state.

use crate::auth::token::sha256_hex;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::AppError;
use crate::models::StoredUser;
use crate::storage;
use crate::telegram::TelegramClient;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::sync::Arc;

/// Shared state for all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub redis: redis::Client,
    pub config: Arc<Config>,
    pub telegram: TelegramClient,
    pub dispatcher: Dispatcher,
    pub bot_name: String,
}

impl AppState {
    pub async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, AppError> {
        Ok(self.redis.get_multiplexed_async_connection().await?)
    }
}

/// Extractor that authenticates a request via its bearer token.
///
/// The raw token is hashed and looked up in Redis; a missing, malformed,
/// expired or unknown token all produce the same generic 401. The reason
/// is logged server-side only.
pub struct AuthUser {
    pub user: StoredUser,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("malformed authorization header".to_string()))?;

        if token.is_empty() {
            return Err(AppError::Unauthorized("empty bearer token".to_string()));
        }

        let mut con = state.connection().await?;
        let user = storage::session::resolve_session(&mut con, &sha256_hex(token))
            .await?
            .ok_or_else(|| AppError::Unauthorized("unknown or expired token".to_string()))?;

        Ok(AuthUser { user })
    }
}
