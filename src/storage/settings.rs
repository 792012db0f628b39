//! Settings and bot-update Redis operations.
//!
//! Redis key patterns:
//! - `setting:{name}` — small configuration values resolved at runtime
//!   (bot username, webhook secret)
//! - `update:{update_id}` — raw inbound bot updates (JSON)
//! - `updates:last_id` — highest update_id seen, for getUpdates polling

use redis::AsyncCommands;

fn setting_key(name: &str) -> String {
    format!("setting:{}", name)
}

/// Get a setting value by name.
pub async fn get_setting<C>(con: &mut C, name: &str) -> Result<Option<String>, redis::RedisError>
where
    C: AsyncCommands,
{
    con.get(setting_key(name)).await
}

/// Set a setting value.
pub async fn set_setting<C>(con: &mut C, name: &str, value: &str) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    con.set::<_, _, ()>(setting_key(name), value).await?;
    Ok(())
}

/// Store a raw bot update and advance the last-seen update id.
pub async fn add_update<C>(
    con: &mut C,
    update_id: i64,
    raw_json: &str,
) -> Result<(), redis::RedisError>
where
    C: AsyncCommands,
{
    con.set::<_, _, ()>(format!("update:{}", update_id), raw_json)
        .await?;

    let last: Option<i64> = con.get("updates:last_id").await?;
    if update_id > last.unwrap_or(0) {
        con.set::<_, _, ()>("updates:last_id", update_id).await?;
    }

    Ok(())
}

/// Highest update_id processed so far, 0 when none.
pub async fn get_latest_update_id<C>(con: &mut C) -> Result<i64, redis::RedisError>
where
    C: AsyncCommands,
{
    let last: Option<i64> = con.get("updates:last_id").await?;
    Ok(last.unwrap_or(0))
}
