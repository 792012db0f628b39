//! Bot-facing endpoints: webhook delivery, polling and registration.

use crate::auth::middleware::AppState;
use crate::auth::token::{constant_time_eq, generate_session_token};
use crate::error::AppError;
use crate::models::TelegramUpdate;
use crate::processor;
use crate::storage;
use axum::{
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;

/// Name of the setting holding the webhook secret token.
const SECURITY_CODE_SETTING: &str = "telegram_security_code";

/// GET / — Deployment probe.
pub async fn root() -> &'static str {
    "This telegram bot is deployed correctly. No user-serviceable parts inside."
}

/// POST /telegramMessage — Webhook receiver for bot updates.
///
/// Telegram echoes the secret registered via setWebhook in the
/// `X-Telegram-Bot-Api-Secret-Token` header; anything else is rejected
/// before the body is looked at.
pub async fn telegram_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(update): Json<TelegramUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let supplied = headers
        .get("X-Telegram-Bot-Api-Secret-Token")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let mut con = state.connection().await?;
    let expected = storage::settings::get_setting(&mut con, SECURITY_CODE_SETTING)
        .await?
        .ok_or_else(|| AppError::Internal("webhook secret not configured".to_string()))?;

    if !constant_time_eq(supplied, &expected) {
        return Err(AppError::Unauthorized(
            "webhook secret mismatch".to_string(),
        ));
    }

    processor::process_update(&mut con, &state.dispatcher, &update).await?;

    Ok("Success")
}

/// GET /updateTelegramMessages — Polling fallback for local development.
///
/// Only reachable through a local host header; a deployed instance uses
/// the webhook and never exposes this.
pub async fn update_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let host = headers
        .get(axum::http::header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if !host.starts_with("localhost") && !host.starts_with("127.0.0.1") {
        return Err(AppError::Forbidden(format!(
            "polling endpoint called with host {:?}",
            host
        )));
    }

    let mut con = state.connection().await?;
    let last_update_id = storage::settings::get_latest_update_id(&mut con).await?;
    let offset = (last_update_id > 0).then_some(last_update_id);

    let updates = state
        .telegram
        .get_updates(offset)
        .await
        .map_err(|e| AppError::Internal(format!("getUpdates failed: {}", e)))?;

    let received = updates.len();

    // Processing may send messages and take a while; do it off-request
    let worker_state = state.clone();
    tokio::spawn(async move {
        let mut con = match worker_state.connection().await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!("polling worker lost Redis: {}", e);
                return;
            }
        };
        for update in &updates {
            if let Err(e) =
                processor::process_update(&mut con, &worker_state.dispatcher, update).await
            {
                tracing::error!("failed to process update {}: {}", update.update_id, e);
            }
        }
    });

    Ok(Json(json!({
        "lastUpdateId": last_update_id,
        "received": received
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterWebhookRequest {
    pub external_url: String,
}

/// POST /init — Register the Telegram webhook for this deployment.
///
/// Guarded by the operator-held INIT_SECRET, not by user sessions. The
/// webhook secret is minted on first use and reused afterwards, so
/// re-running registration against a new URL keeps old deliveries valid.
pub async fn register_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<RegisterWebhookRequest>,
) -> Result<impl IntoResponse, AppError> {
    let supplied = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let expected = format!("Bearer {}", state.config.init_secret);

    if !constant_time_eq(supplied, &expected) {
        return Err(AppError::Unauthorized(
            "webhook registration secret mismatch".to_string(),
        ));
    }

    if !request.external_url.starts_with("https://") {
        return Err(AppError::BadRequest(
            "externalUrl must be an https URL".to_string(),
        ));
    }

    let mut con = state.connection().await?;
    let security_code =
        match storage::settings::get_setting(&mut con, SECURITY_CODE_SETTING).await? {
            Some(code) => code,
            None => {
                let code = generate_session_token();
                storage::settings::set_setting(&mut con, SECURITY_CODE_SETTING, &code).await?;
                code
            }
        };

    let webhook_url = format!(
        "{}/telegramMessage",
        request.external_url.trim_end_matches('/')
    );
    let result = state
        .telegram
        .set_webhook(&webhook_url, &security_code)
        .await
        .map_err(|e| AppError::Internal(format!("setWebhook failed: {}", e)))?;

    tracing::info!("webhook registered");

    Ok(Json(result))
}
