//! Session token Redis operations.
//!
//! Redis key patterns:
//! - `user:{telegram_id}` — user profile (JSON)
//! - `token:{sha256_hex}` — owning telegram_id (STRING, TTL = token lifetime)
//!
//! Only token hashes ever reach Redis; the raw secret stays with the
//! client. Expiry is enforced by the key TTL, so an expired token is
//! indistinguishable from one that never existed.

use crate::models::StoredUser;
use crate::storage::user::user_key;
use redis::AsyncCommands;

fn token_key(token_hash: &str) -> String {
    format!("token:{}", token_hash)
}

/// Atomic issuance: upsert the user profile (only if the incoming
/// auth_date is strictly newer than the stored one) and insert the token
/// record with its TTL.
///
/// Runs as a single Lua script, so both writes apply or neither does —
/// a token must never exist without its owning profile, and a replayed
/// older init must not regress the profile. The stored `created_at` is
/// preserved across profile updates.
const ISSUE_SCRIPT: &str = r#"
local incoming = cjson.decode(ARGV[1])
local existing = redis.call('GET', KEYS[1])
if existing then
    local ok, current = pcall(cjson.decode, existing)
    if ok and tonumber(current['last_auth_timestamp']) >= tonumber(incoming['last_auth_timestamp']) then
        -- out-of-order or replayed init: keep the stored profile
    else
        if ok and current['created_at'] then
            incoming['created_at'] = current['created_at']
        end
        redis.call('SET', KEYS[1], cjson.encode(incoming))
    end
else
    redis.call('SET', KEYS[1], ARGV[1])
end
redis.call('SET', KEYS[2], ARGV[2], 'EX', tonumber(ARGV[3]))
return 1
"#;

/// Persist a verified identity and a freshly minted token hash in one
/// atomic batch.
///
/// Any error means nothing committed; the caller must discard the raw
/// secret and fail the request.
pub async fn issue_session<C>(
    con: &mut C,
    user: &StoredUser,
    token_hash: &str,
    ttl_secs: u64,
) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    let json = serde_json::to_string(user).map_err(super::json_error)?;

    redis::Script::new(ISSUE_SCRIPT)
        .key(user_key(user.telegram_id))
        .key(token_key(token_hash))
        .arg(json)
        .arg(user.telegram_id)
        .arg(ttl_secs)
        .invoke_async::<()>(con)
        .await?;

    Ok(())
}

/// Resolve a token hash back to its owning user.
///
/// Returns `None` for unknown and expired hashes alike; the caller maps
/// both to the same unauthorized outcome.
pub async fn resolve_session<C>(
    con: &mut C,
    token_hash: &str,
) -> Result<Option<StoredUser>, redis::RedisError>
where
    C: AsyncCommands,
{
    let telegram_id: Option<i64> = con.get(token_key(token_hash)).await?;

    match telegram_id {
        Some(id) => crate::storage::user::get_user(con, id).await,
        None => Ok(None),
    }
}
