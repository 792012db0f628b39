//! API route handlers.

pub mod bot;
pub mod miniapp;

use crate::auth::middleware::AppState;
use crate::error::AppError;
use axum::{routing::get, routing::post, Router};

/// Validate a calendar reference (URL-safe base64 alphabet).
///
/// Length is not pinned so references minted under a different
/// CALENDAR_REF_LEN keep working; only the alphabet is enforced.
pub fn validate_reference(reference: &str) -> Result<(), AppError> {
    if reference.is_empty()
        || reference.len() > 64
        || !reference
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::BadRequest("Invalid reference format".to_string()));
    }
    Ok(())
}

/// Build the API router with all endpoints.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Deployment probe
        .route("/", get(bot::root))
        // Mini App endpoints
        .route("/miniApp/init", post(miniapp::init))
        .route("/miniApp/me", get(miniapp::me))
        .route("/miniApp/calendar/{reference}", get(miniapp::get_calendar))
        .route("/miniApp/dates", post(miniapp::submit_dates))
        // Bot endpoints
        .route("/telegramMessage", post(bot::telegram_message))
        .route("/updateTelegramMessages", get(bot::update_messages))
        .route("/init", post(bot::register_webhook))
}
