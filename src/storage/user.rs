//! User Redis operations.
//!
//! Redis key patterns:
//! - `user:{telegram_id}` — user profile (JSON), written only through the
//!   upsert-if-newer script in [`crate::storage::session`]

use crate::models::StoredUser;
use redis::AsyncCommands;

pub(crate) fn user_key(telegram_id: i64) -> String {
    format!("user:{}", telegram_id)
}

/// Get a user by Telegram id.
pub async fn get_user<C>(
    con: &mut C,
    telegram_id: i64,
) -> Result<Option<StoredUser>, redis::RedisError>
where
    C: AsyncCommands,
{
    let json: Option<String> = con.get(user_key(telegram_id)).await?;

    match json {
        Some(data) => Ok(Some(
            serde_json::from_str(&data).map_err(super::json_error)?,
        )),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_key_format() {
        assert_eq!(user_key(42), "user:42");
        assert_eq!(user_key(-1001234), "user:-1001234");
    }

    #[tokio::test]
    async fn test_get_user_roundtrip() {
        // Requires a running Redis instance; skip if unavailable
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let client = match redis::Client::open(redis_url) {
            Ok(c) => c,
            Err(_) => {
                eprintln!("Skipping test: Redis not available");
                return;
            }
        };
        let mut con = match client.get_multiplexed_async_connection().await {
            Ok(c) => c,
            Err(_) => {
                eprintln!("Skipping test: Redis connection failed");
                return;
            }
        };

        let user = StoredUser {
            telegram_id: 990001,
            first_name: "Test".to_string(),
            last_name: None,
            username: Some("tester".to_string()),
            language_code: Some("en".to_string()),
            is_bot: false,
            is_premium: false,
            allows_write_to_pm: true,
            photo_url: None,
            last_auth_timestamp: 1_700_000_000,
            created_at: 1_700_000_000,
        };

        let json = serde_json::to_string(&user).unwrap();
        let _: () = con.set(user_key(user.telegram_id), json).await.unwrap();

        let loaded = get_user(&mut con, user.telegram_id).await.unwrap().unwrap();
        assert_eq!(loaded.telegram_id, 990001);
        assert_eq!(loaded.username.as_deref(), Some("tester"));

        let _: () = con.del(user_key(user.telegram_id)).await.unwrap();
        assert!(get_user(&mut con, user.telegram_id)
            .await
            .unwrap()
            .is_none());
    }
}
