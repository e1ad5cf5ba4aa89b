use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming message from a channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Channel name (e.g. "telegram").
    pub channel: String,
    /// Platform-specific user ID.
    pub sender_id: String,
    /// Human-readable sender name.
    pub sender_name: Option<String>,
    /// Message text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Platform-specific target for routing the response (e.g. Telegram chat_id).
    #[serde(default)]
    pub reply_target: Option<String>,
    /// Whether this message comes from a group chat.
    #[serde(default)]
    pub is_group: bool,
}

/// An outgoing message to send back through a channel.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    /// Platform-specific target for routing (e.g. Telegram chat_id).
    #[serde(default)]
    pub reply_target: Option<String>,
    /// Render `text` as Markdown where the platform supports it.
    #[serde(default)]
    pub markdown: bool,
}

impl OutgoingMessage {
    /// Build a reply addressed to the conversation `incoming` came from.
    pub fn reply_to(incoming: &IncomingMessage, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply_target: incoming.reply_target.clone(),
            markdown: false,
        }
    }

    /// Mark this message as Markdown.
    pub fn with_markdown(mut self) -> Self {
        self.markdown = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn incoming() -> IncomingMessage {
        IncomingMessage {
            id: Uuid::new_v4(),
            channel: "telegram".to_string(),
            sender_id: "42".to_string(),
            sender_name: Some("@alice".to_string()),
            text: "/silpo".to_string(),
            timestamp: Utc::now(),
            reply_target: Some("-100777".to_string()),
            is_group: true,
        }
    }

    #[test]
    fn test_reply_to_copies_target() {
        let msg = OutgoingMessage::reply_to(&incoming(), "hi");
        assert_eq!(msg.text, "hi");
        assert_eq!(msg.reply_target.as_deref(), Some("-100777"));
        assert!(!msg.markdown);
    }

    #[test]
    fn test_with_markdown() {
        let msg = OutgoingMessage::reply_to(&incoming(), "*hi*").with_markdown();
        assert!(msg.markdown);
    }

    #[test]
    fn test_outgoing_markdown_defaults_when_missing() {
        let msg: OutgoingMessage =
            serde_json::from_str(r#"{"text": "x", "reply_target": "1"}"#).unwrap();
        assert!(!msg.markdown);
    }
}
