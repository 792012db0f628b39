//! Mini App API endpoints.

use crate::auth::middleware::{AppState, AuthUser};
use crate::auth::token::{generate_reference, generate_session_token, sha256_hex};
use crate::auth::verify::calculate_hashes;
use crate::dispatch::Notification;
use crate::error::AppError;
use crate::messages::Lang;
use crate::models::{
    DatesRequest, DatesResponse, InitRequest, InitResponse, StartPage, StoredCalendar, StoredUser,
};
use crate::storage;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use std::time::{SystemTime, UNIX_EPOCH};

fn unix_now() -> Result<i64, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::Internal(format!("System clock error: {}", e)))?;
    Ok(now.as_secs() as i64)
}

/// POST /miniApp/init — Verify launch data and issue a session token.
///
/// Order matters: integrity first, then freshness, then payload shape.
/// A tampered-but-fresh payload must fail as unauthorized, never as stale.
pub async fn init(
    State(state): State<AppState>,
    Json(request): Json<InitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let check = calculate_hashes(&request.init_data_raw, &state.config.bot_token);

    if !check.hash_valid() {
        return Err(AppError::Unauthorized(
            "init data hash mismatch".to_string(),
        ));
    }

    let now = unix_now()?;
    if now - check.data.auth_date > state.config.auth_freshness_secs {
        return Err(AppError::Stale);
    }

    let telegram_user = check.data.user().ok_or_else(|| {
        AppError::BadRequest("Invalid user data: missing id or first_name".to_string())
    })?;

    let user = StoredUser::from_telegram(&telegram_user, check.data.auth_date, now as u64);

    // The raw token goes to the client; only its hash reaches Redis
    let token = generate_session_token();
    let token_hash = sha256_hex(&token);

    let mut con = state.connection().await?;
    storage::session::issue_session(&mut con, &user, &token_hash, state.config.token_ttl_secs)
        .await?;

    // Re-read the profile: an out-of-order init keeps the stored (newer)
    // one, and the response must reflect what is actually persisted
    let stored = storage::user::get_user(&mut con, user.telegram_id)
        .await?
        .unwrap_or(user);

    let start_page = if check.data.start_param.is_some() {
        StartPage::Calendar
    } else {
        StartPage::Home
    };

    tracing::info!(telegram_id = stored.telegram_id, "session issued");

    Ok(Json(InitResponse {
        token,
        start_param: check.data.start_param,
        start_page,
        user: stored,
    }))
}

/// GET /miniApp/me — Return the authenticated user's profile.
pub async fn me(auth: AuthUser) -> impl IntoResponse {
    Json(json!({ "user": auth.user }))
}

/// GET /miniApp/calendar/{reference} — Fetch a shared calendar.
///
/// No session required: the unguessable reference is the capability.
/// Only the dates are exposed, never the owner.
pub async fn get_calendar(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    super::validate_reference(&reference)?;

    let mut con = state.connection().await?;
    let calendar = storage::calendar::get_calendar_by_ref(&mut con, &reference)
        .await?
        .ok_or_else(|| AppError::NotFound("Calendar not found".to_string()))?;

    Ok(Json(json!({
        "calendar": {
            "dates": calendar.dates
        }
    })))
}

/// POST /miniApp/dates — Submit a date set and get a shareable reference.
///
/// The reference is returned to the user through the bot chat, not the
/// HTTP response; the handler only confirms the submission.
pub async fn submit_dates(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<DatesRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.dates.is_empty() || request.dates.len() > state.config.max_dates_per_calendar {
        return Err(AppError::BadRequest("Invalid or too many dates".to_string()));
    }
    if !request.dates.iter().all(|d| is_calendar_date(d)) {
        return Err(AppError::BadRequest("Invalid date format".to_string()));
    }

    let now = unix_now()?;
    let reference = generate_reference(state.config.calendar_ref_len);
    let calendar = StoredCalendar {
        dates: request.dates,
        owner_telegram_id: auth.user.telegram_id,
        created_at: now as u64,
    };

    let mut con = state.connection().await?;
    storage::calendar::save_calendar(&mut con, &reference, &calendar).await?;

    tracing::info!(
        telegram_id = auth.user.telegram_id,
        dates = calendar.dates.len(),
        "calendar submitted"
    );

    state.dispatcher.enqueue(Notification::CalendarLink {
        chat_id: auth.user.telegram_id,
        language: Lang::from_tag(auth.user.language_code.as_deref()),
        user_name: auth.user.first_name.clone(),
        calendar_ref: reference,
    });

    Ok(Json(DatesResponse { user: auth.user }))
}

/// Structural YYYY-MM-DD check. Calendar plausibility (leap years, days
/// per month) is the front-end's concern; storage only refuses garbage.
fn is_calendar_date(s: &str) -> bool {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    if !s
        .char_indices()
        .all(|(i, c)| matches!(i, 4 | 7) || c.is_ascii_digit())
    {
        return false;
    }

    let month: u32 = s[5..7].parse().unwrap_or(0);
    let day: u32 = s[8..10].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}
