//! Request and response models for the API.
//!
//! All models use serde for serialization/deserialization.
//! Storage models represent Redis data structures.

use serde::{Deserialize, Serialize};

// ============================================================================
// Telegram Models
// ============================================================================

/// The `user` sub-object of Telegram launch data.
///
/// `id` and `first_name` are mandatory; a payload missing either fails
/// deserialization and is rejected as malformed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: String,
    #[serde(default)]
    pub is_bot: Option<bool>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
    #[serde(default)]
    pub is_premium: Option<bool>,
    #[serde(default)]
    pub added_to_attachment_menu: Option<bool>,
    #[serde(default)]
    pub allows_write_to_pm: Option<bool>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

/// Chat a bot update arrived in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
    #[serde(rename = "type")]
    pub chat_type: String,
}

/// Inbound bot message (the fields this service acts on).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: TelegramChat,
    #[serde(default)]
    pub from: Option<TelegramUser>,
    #[serde(default)]
    pub text: Option<String>,
}

/// A single entry from getUpdates / the webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
}

// ============================================================================
// Mini App Models
// ============================================================================

/// Request body for POST /miniApp/init.
#[derive(Debug, Deserialize)]
pub struct InitRequest {
    pub init_data_raw: String,
}

/// Response after a successful init.
#[derive(Debug, Serialize)]
pub struct InitResponse {
    pub token: String,
    pub start_param: Option<String>,
    pub start_page: StartPage,
    pub user: StoredUser,
}

/// Which page the front-end should open first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StartPage {
    Calendar,
    Home,
}

/// Request body for POST /miniApp/dates.
#[derive(Debug, Deserialize)]
pub struct DatesRequest {
    pub dates: Vec<String>,
}

/// Response after a calendar submission.
#[derive(Debug, Serialize)]
pub struct DatesResponse {
    pub user: StoredUser,
}

// ============================================================================
// Storage Models
// ============================================================================

/// User data as stored in Redis, keyed by `user:{telegram_id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredUser {
    pub telegram_id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
    pub is_bot: bool,
    pub is_premium: bool,
    pub allows_write_to_pm: bool,
    pub photo_url: Option<String>,
    /// auth_date of the freshest launch payload seen for this user.
    /// Upserts with an older value must not overwrite the profile.
    pub last_auth_timestamp: i64,
    pub created_at: u64,
}

impl StoredUser {
    /// Build a stored record from verified launch data.
    pub fn from_telegram(user: &TelegramUser, auth_timestamp: i64, now: u64) -> Self {
        StoredUser {
            telegram_id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            language_code: user.language_code.clone(),
            is_bot: user.is_bot.unwrap_or(false),
            is_premium: user.is_premium.unwrap_or(false),
            allows_write_to_pm: user.allows_write_to_pm.unwrap_or(false),
            photo_url: user.photo_url.clone(),
            last_auth_timestamp: auth_timestamp,
            created_at: now,
        }
    }
}

/// Calendar data as stored in Redis, keyed by `calendar:{ref}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCalendar {
    pub dates: Vec<String>,
    pub owner_telegram_id: i64,
    pub created_at: u64,
}
