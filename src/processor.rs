//! Inbound bot update processing.
//!
//! Updates arrive either through the webhook route or through getUpdates
//! polling; both paths funnel into [`process_update`]. Every update is
//! persisted before any command handling, so a delivery is never lost to
//! a handler bug.

use crate::dispatch::{Dispatcher, Notification};
use crate::error::AppError;
use crate::messages::Lang;
use crate::models::TelegramUpdate;
use crate::storage;
use redis::AsyncCommands;

/// Handle one bot update: persist it, then react to known commands.
///
/// Unknown updates and non-command messages are stored and otherwise
/// ignored.
pub async fn process_update<C>(
    con: &mut C,
    dispatcher: &Dispatcher,
    update: &TelegramUpdate,
) -> Result<(), AppError>
where
    C: AsyncCommands,
{
    let raw = serde_json::to_string(update)?;
    storage::settings::add_update(con, update.update_id, &raw).await?;

    let Some(message) = &update.message else {
        tracing::debug!("update {} has no message, stored only", update.update_id);
        return Ok(());
    };

    let text = message.text.as_deref().unwrap_or("");
    let command = text.split_whitespace().next().unwrap_or("");

    match command {
        "/start" | "/info" => {
            let language = Lang::from_tag(
                message
                    .from
                    .as_ref()
                    .and_then(|u| u.language_code.as_deref()),
            );
            dispatcher.enqueue(Notification::Greeting {
                chat_id: message.chat.id,
                language,
                reply_to_message_id: Some(message.message_id),
            });
        }
        _ => {
            tracing::debug!(
                "update {}: no command handler for message",
                update.update_id
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{TelegramChat, TelegramMessage, TelegramUser};
    use crate::telegram::TelegramClient;

    async fn test_connection() -> Option<redis::aio::MultiplexedConnection> {
        // Requires a running Redis instance; skip if unavailable
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let client = match redis::Client::open(redis_url) {
            Ok(c) => c,
            Err(_) => {
                eprintln!("Skipping test: Redis not available");
                return None;
            }
        };
        match client.get_multiplexed_async_connection().await {
            Ok(c) => Some(c),
            Err(_) => {
                eprintln!("Skipping test: Redis connection failed");
                None
            }
        }
    }

    fn test_dispatcher() -> Dispatcher {
        let telegram = TelegramClient::new("0:test", false);
        let (dispatcher, _handle) = Dispatcher::spawn(telegram, "test_bot".to_string());
        dispatcher
    }

    fn update_with_text(update_id: i64, text: Option<&str>) -> TelegramUpdate {
        TelegramUpdate {
            update_id,
            message: Some(TelegramMessage {
                message_id: 7,
                from: Some(TelegramUser {
                    id: 42,
                    is_bot: Some(false),
                    first_name: "Test".to_string(),
                    last_name: None,
                    username: None,
                    language_code: Some("uk".to_string()),
                    is_premium: None,
                    added_to_attachment_menu: None,
                    allows_write_to_pm: None,
                    photo_url: None,
                }),
                chat: TelegramChat {
                    id: 42,
                    chat_type: "private".to_string(),
                },
                text: text.map(str::to_string),
            }),
        }
    }

    #[tokio::test]
    async fn test_update_is_persisted() {
        let Some(mut con) = test_connection().await else {
            return;
        };

        let update = update_with_text(991001, Some("hello there"));
        process_update(&mut con, &test_dispatcher(), &update)
            .await
            .unwrap();

        let stored: Option<String> = con.get("update:991001").await.unwrap();
        assert!(stored.is_some());

        let _: Result<(), _> = con.del("update:991001").await;
        let _: Result<(), _> = con.del("updates:last_id").await;
    }

    #[tokio::test]
    async fn test_update_without_message_is_stored_only() {
        let Some(mut con) = test_connection().await else {
            return;
        };

        let update = TelegramUpdate {
            update_id: 991002,
            message: None,
        };
        process_update(&mut con, &test_dispatcher(), &update)
            .await
            .unwrap();

        let stored: Option<String> = con.get("update:991002").await.unwrap();
        assert!(stored.is_some());

        let _: Result<(), _> = con.del("update:991002").await;
        let _: Result<(), _> = con.del("updates:last_id").await;
    }
}
