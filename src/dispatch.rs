//! Outbound bot message dispatch.
//!
//! Request handlers never talk to the Telegram API directly. They enqueue
//! a [`Notification`] and return; a single background worker owns the
//! Telegram client and delivers messages in order. Delivery failures are
//! logged and dropped so a Telegram outage cannot fail user requests.

use crate::messages::{self, Lang};
use crate::telegram::TelegramClient;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A message to be delivered by the background worker.
#[derive(Debug)]
pub enum Notification {
    /// Greeting in reply to /start or /info.
    Greeting {
        chat_id: i64,
        language: Lang,
        reply_to_message_id: Option<i64>,
    },
    /// Confirmation plus the shareable calendar link, sent after a
    /// calendar submission.
    CalendarLink {
        chat_id: i64,
        language: Lang,
        user_name: String,
        calendar_ref: String,
    },
}

/// Cloneable handle for enqueueing notifications.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Dispatcher {
    /// Start the delivery worker and return a handle to it.
    ///
    /// The worker exits once every handle has been dropped and the queue
    /// is drained; awaiting the `JoinHandle` gives a graceful shutdown.
    pub fn spawn(telegram: TelegramClient, bot_name: String) -> (Dispatcher, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();

        let handle = tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                deliver(&telegram, &bot_name, notification).await;
            }
            tracing::debug!("notification dispatcher stopped");
        });

        (Dispatcher { tx }, handle)
    }

    /// Enqueue a notification for delivery.
    ///
    /// Fails only after the worker has stopped, which in practice means
    /// the service is shutting down; the notification is dropped.
    pub fn enqueue(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            tracing::warn!("notification dropped: dispatcher is stopped");
        }
    }
}

async fn deliver(telegram: &TelegramClient, bot_name: &str, notification: Notification) {
    match notification {
        Notification::Greeting {
            chat_id,
            language,
            reply_to_message_id,
        } => {
            let text = messages::greeting_message(language, bot_name);
            if let Err(e) = telegram
                .send_message(chat_id, &text, Some("MarkdownV2"), reply_to_message_id)
                .await
            {
                tracing::error!("failed to send greeting to chat {}: {}", chat_id, e);
            }
        }
        Notification::CalendarLink {
            chat_id,
            language,
            user_name,
            calendar_ref,
        } => {
            let confirmation = messages::calendar_link_message(language);
            if let Err(e) = telegram
                .send_message(chat_id, &confirmation, Some("MarkdownV2"), None)
                .await
            {
                tracing::error!("failed to send confirmation to chat {}: {}", chat_id, e);
                return;
            }

            let share =
                messages::calendar_share_message(language, &user_name, bot_name, &calendar_ref);
            if let Err(e) = telegram
                .send_message(chat_id, &share, Some("MarkdownV2"), None)
                .await
            {
                tracing::error!("failed to send share message to chat {}: {}", chat_id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_worker_exits_when_handles_dropped() {
        let telegram = TelegramClient::new("0:test", false);
        let (dispatcher, handle) = Dispatcher::spawn(telegram, "test_bot".to_string());

        drop(dispatcher);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_one_worker() {
        let telegram = TelegramClient::new("0:test", false);
        let (dispatcher, handle) = Dispatcher::spawn(telegram, "test_bot".to_string());

        let clone = dispatcher.clone();
        drop(dispatcher);

        // Worker keeps running while any handle survives
        assert!(!handle.is_finished());

        drop(clone);
        handle.await.unwrap();
    }
}
