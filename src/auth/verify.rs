//! Telegram Mini App init-data verification.
//!
//! Launch parameters arrive as a query-string-encoded blob signed by
//! Telegram: the `hash` field is an HMAC-SHA256 tag over the remaining
//! fields, serialized as sorted `key=value` lines. The signing key is
//! itself derived from the bot token with HMAC-SHA256 keyed by the
//! literal string `"WebAppData"`.

use crate::auth::token::constant_time_eq;
use crate::models::TelegramUser;
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use std::collections::BTreeMap;

type HmacSha256 = Hmac<Sha256>;

/// Result of recomputing the integrity tag for a launch-data string.
///
/// Carries both tags so the caller owns the accept/reject decision;
/// use [`InitDataCheck::hash_valid`] for the comparison.
#[derive(Debug, Clone)]
pub struct InitDataCheck {
    /// Tag supplied by the client in the `hash` field (empty if absent).
    pub expected_hash: String,
    /// Tag recomputed from the remaining fields and the bot token.
    pub calculated_hash: String,
    /// The decoded payload fields.
    pub data: InitData,
}

impl InitDataCheck {
    /// Compare the supplied and recomputed tags in constant time.
    pub fn hash_valid(&self) -> bool {
        constant_time_eq(&self.expected_hash, &self.calculated_hash)
    }
}

/// Decoded launch-data fields.
///
/// `user`, `receiver` and `chat` arrive as JSON text; they are parsed to
/// structured values, falling back to the raw string when parsing fails.
/// Decoding never errors: malformed fields surface later as validation
/// failures, not as panics or parse errors.
#[derive(Debug, Clone, Default)]
pub struct InitData {
    /// Unix seconds of the launch, 0 when absent or malformed.
    pub auth_date: i64,
    pub user: Option<Value>,
    pub receiver: Option<Value>,
    pub chat: Option<Value>,
    pub start_param: Option<String>,
    /// Remaining fields (query_id, chat_type, ...) kept verbatim.
    pub extra: BTreeMap<String, String>,
}

impl InitData {
    /// Typed view of the `user` field.
    ///
    /// Returns `None` when the field is absent, was not valid JSON, or
    /// lacks the required `id` (numeric) / `first_name` (string) fields.
    pub fn user(&self) -> Option<TelegramUser> {
        self.user
            .as_ref()
            .and_then(|value| serde_json::from_value(value.clone()).ok())
    }
}

/// Recompute the integrity tag for a raw launch-data string.
///
/// Pure function of (raw string, bot token): parses the query string,
/// removes `hash`, sorts the remaining pairs by key, joins them as
/// `key=value` lines and computes
/// `hex(HMAC-SHA256(HMAC-SHA256("WebAppData", bot_token), lines))`.
///
/// Verification and freshness policy are the caller's responsibility.
pub fn calculate_hashes(init_data_raw: &str, bot_token: &str) -> InitDataCheck {
    let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(init_data_raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    // The supplied tag never participates in its own verification
    let expected_hash = pairs
        .iter()
        .position(|(k, _)| k == "hash")
        .map(|i| pairs.remove(i).1)
        .unwrap_or_default();

    // Stable sort keeps insertion order among duplicate keys
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let secret_key = hmac_sha256(b"WebAppData", bot_token.as_bytes());
    let calculated_hash = hex::encode(hmac_sha256(
        &secret_key,
        data_check_string(&pairs).as_bytes(),
    ));

    InitDataCheck {
        expected_hash,
        calculated_hash,
        data: decode_fields(pairs),
    }
}

/// Canonical serialization: `key=value` lines joined with `\n`,
/// in the (already sorted) pair order.
fn data_check_string(pairs: &[(String, String)]) -> String {
    pairs
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("\n")
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

fn decode_fields(pairs: Vec<(String, String)>) -> InitData {
    let mut data = InitData::default();
    for (key, value) in pairs {
        match key.as_str() {
            // JSON-encoded sub-objects; keep the raw string if parsing fails
            "user" | "receiver" | "chat" => {
                let parsed = serde_json::from_str(&value).unwrap_or(Value::String(value));
                match key.as_str() {
                    "user" => data.user = Some(parsed),
                    "receiver" => data.receiver = Some(parsed),
                    _ => data.chat = Some(parsed),
                }
            }
            "auth_date" => data.auth_date = value.parse().unwrap_or(0),
            "start_param" => data.start_param = Some(value),
            _ => {
                data.extra.insert(key, value);
            }
        }
    }
    data
}
