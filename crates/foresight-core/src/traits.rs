use crate::{
    error::ForesightError,
    message::{IncomingMessage, OutgoingMessage},
};
use async_trait::async_trait;

/// Messaging Channel trait.
///
/// Every messaging platform implements this trait to receive and send
/// messages. The foresight core never depends on a concrete channel.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name.
    fn name(&self) -> &str;

    /// The bot's own handle on this platform, once known.
    ///
    /// Used to tell `/command@this_bot` apart from `/command@other_bot`.
    fn bot_username(&self) -> Option<String> {
        None
    }

    /// Start listening for incoming messages.
    /// Returns a receiver that yields incoming messages.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<IncomingMessage>, ForesightError>;

    /// Send a response back through this channel.
    async fn send(&self, message: OutgoingMessage) -> Result<(), ForesightError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), ForesightError>;
}
