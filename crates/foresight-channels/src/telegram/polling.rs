//! Long-polling update loop and Channel trait implementation.

use super::types::{TgMessage, TgResponse, TgUpdate};
use super::TelegramChannel;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use foresight_core::{
    error::ForesightError,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn bot_username(&self) -> Option<String> {
        self.username.get().cloned()
    }

    async fn start(&self) -> Result<mpsc::Receiver<IncomingMessage>, ForesightError> {
        let me = self.get_me().await?;
        if let Some(username) = me.username {
            info!("Telegram bot authenticated as @{username}");
            let _ = self.username.set(username);
        }

        self.register_commands().await;

        let (tx, rx) = mpsc::channel(64);
        let client = self.client.clone();
        let base_url = self.base_url.clone();
        let allowed_users = self.config.allowed_users.clone();
        let poll_timeout = self.config.poll_timeout_secs;
        let poll_interval = Duration::from_millis(self.config.poll_interval_ms);
        let last_update_id = self.last_update_id.clone();

        info!("Telegram channel starting long polling...");

        tokio::spawn(async move {
            let mut backoff_secs: u64 = 1;

            loop {
                let last = last_update_id.lock().await;
                let url = updates_url(&base_url, poll_timeout, last.map(|id| id + 1));
                drop(last);

                let resp = match client
                    .get(&url)
                    .timeout(Duration::from_secs(poll_timeout + 5))
                    .send()
                    .await
                {
                    Ok(r) => r,
                    Err(e) => {
                        error!("telegram poll error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                let body: TgResponse<Vec<TgUpdate>> = match resp.json().await {
                    Ok(b) => b,
                    Err(e) => {
                        error!("telegram parse error (retry in {backoff_secs}s): {e}");
                        tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                        backoff_secs = (backoff_secs * 2).min(60);
                        continue;
                    }
                };

                if !body.ok {
                    error!(
                        "telegram API error (retry in {backoff_secs}s): {}",
                        body.description.unwrap_or_default()
                    );
                    tokio::time::sleep(Duration::from_secs(backoff_secs)).await;
                    backoff_secs = (backoff_secs * 2).min(60);
                    continue;
                }

                // Successful poll -- reset backoff.
                backoff_secs = 1;

                let updates = body.result.unwrap_or_default();

                if let Some(last_update) = updates.last() {
                    *last_update_id.lock().await = Some(last_update.update_id);
                }

                for update in updates {
                    let Some(msg) = update.message else {
                        continue;
                    };
                    let Some(incoming) = to_incoming(msg, &allowed_users) else {
                        continue;
                    };
                    if tx.send(incoming).await.is_err() {
                        info!("telegram channel receiver dropped, stopping poll");
                        return;
                    }
                }

                tokio::time::sleep(poll_interval).await;
            }
        });

        Ok(rx)
    }

    async fn send(&self, message: OutgoingMessage) -> Result<(), ForesightError> {
        let chat_id_str = message
            .reply_target
            .as_deref()
            .ok_or_else(|| ForesightError::Channel("no reply_target on outgoing message".into()))?;

        let chat_id: i64 = chat_id_str.parse().map_err(|e| {
            ForesightError::Channel(format!("invalid telegram chat_id '{chat_id_str}': {e}"))
        })?;

        self.send_text(chat_id, &message.text, message.markdown)
            .await
    }

    async fn stop(&self) -> Result<(), ForesightError> {
        info!("Telegram channel stopped");
        Ok(())
    }
}

/// `getUpdates` URL for the next poll.
pub(super) fn updates_url(base_url: &str, timeout_secs: u64, offset: Option<i64>) -> String {
    let mut url = format!("{base_url}/getUpdates?timeout={timeout_secs}");
    if let Some(off) = offset {
        url.push_str(&format!("&offset={off}"));
    }
    url
}

/// Turn a Telegram message into an [`IncomingMessage`], or `None` if it
/// should be ignored.
pub(super) fn to_incoming(msg: TgMessage, allowed_users: &[i64]) -> Option<IncomingMessage> {
    let text = msg.text.filter(|t| !t.is_empty())?;

    let Some(user) = msg.from else {
        debug!("telegram: ignoring message without sender in chat {}", msg.chat.id);
        return None;
    };

    if user.is_bot {
        debug!("telegram: ignoring message from bot {}", user.id);
        return None;
    }

    // Auth check.
    if !allowed_users.is_empty() && !allowed_users.contains(&user.id) {
        warn!("ignoring message from unauthorized user {}", user.id);
        return None;
    }

    let sender_name = if let Some(ref un) = user.username {
        format!("@{un}")
    } else if let Some(ref ln) = user.last_name {
        format!("{} {ln}", user.first_name)
    } else {
        user.first_name.clone()
    };

    let timestamp = DateTime::<Utc>::from_timestamp(msg.date, 0)
        .filter(|_| msg.date > 0)
        .unwrap_or_else(Utc::now);

    Some(IncomingMessage {
        id: Uuid::new_v4(),
        channel: "telegram".to_string(),
        sender_id: user.id.to_string(),
        sender_name: Some(sender_name),
        text,
        timestamp,
        reply_target: Some(msg.chat.id.to_string()),
        is_group: matches!(msg.chat.chat_type.as_str(), "group" | "supergroup"),
    })
}
