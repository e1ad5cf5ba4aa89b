//! Outbound Bot API calls: messages, command registration, and `getMe`.

use super::types::{TgResponse, TgUser};
use super::TelegramChannel;
use crate::utils::split_message;
use foresight_core::error::ForesightError;
use tracing::{info, warn};

/// Telegram's per-message length limit.
const MAX_MESSAGE_LEN: usize = 4096;

impl TelegramChannel {
    /// Send a text message to a specific chat.
    ///
    /// Markdown that Telegram refuses to parse is resent as plain text.
    pub(crate) async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        markdown: bool,
    ) -> Result<(), ForesightError> {
        let url = format!("{}/sendMessage", self.base_url);

        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let body = if markdown {
                serde_json::json!({
                    "chat_id": chat_id,
                    "text": chunk,
                    "parse_mode": "Markdown",
                })
            } else {
                serde_json::json!({
                    "chat_id": chat_id,
                    "text": chunk,
                })
            };

            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| ForesightError::Channel(format!("telegram send failed: {e}")))?;

            let status = resp.status();
            if status.is_success() {
                continue;
            }

            let error_text = resp.text().await.unwrap_or_default();
            if !(markdown && error_text.contains("can't parse entities")) {
                return Err(ForesightError::Channel(format!(
                    "telegram send failed ({status}): {error_text}"
                )));
            }

            warn!("Markdown parse failed, retrying as plain text: {error_text}");
            let plain_body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            let plain_resp = self
                .client
                .post(&url)
                .json(&plain_body)
                .send()
                .await
                .map_err(|e| {
                    ForesightError::Channel(format!("telegram send (plain) failed: {e}"))
                })?;
            if !plain_resp.status().is_success() {
                let plain_err = plain_resp.text().await.unwrap_or_default();
                return Err(ForesightError::Channel(format!(
                    "telegram send (plain fallback) failed: {plain_err}"
                )));
            }
        }

        Ok(())
    }

    /// Register the foresight command with Telegram so users see it in the menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "silpo", "description": "Your foresight for today" },
            ]
        });

        let url = format!("{}/setMyCommands", self.base_url);
        match self.client.post(&url).json(&commands).send().await {
            Ok(resp) if resp.status().is_success() => {
                info!("registered Telegram bot commands");
            }
            Ok(resp) => {
                let body = resp.text().await.unwrap_or_default();
                warn!("failed to register Telegram bot commands: {body}");
            }
            Err(e) => {
                warn!("failed to register Telegram bot commands: {e}");
            }
        }
    }

    /// Fetch the bot's own account. Fails if the token is rejected.
    pub(crate) async fn get_me(&self) -> Result<TgUser, ForesightError> {
        let url = format!("{}/getMe", self.base_url);
        let resp: TgResponse<TgUser> = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ForesightError::Channel(format!("telegram getMe failed: {e}")))?
            .json()
            .await
            .map_err(|e| ForesightError::Channel(format!("telegram getMe parse failed: {e}")))?;

        if !resp.ok {
            return Err(ForesightError::Channel(format!(
                "telegram getMe rejected: {}",
                resp.description.unwrap_or_default()
            )));
        }

        resp.result
            .ok_or_else(|| ForesightError::Channel("telegram getMe returned no user".into()))
    }
}
