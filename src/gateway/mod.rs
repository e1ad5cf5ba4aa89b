//! Gateway — the main event loop connecting channels to the foresight service.


use crate::commands::{format_foresight, Command};
use chrono::Local;
use foresight_core::{
    config::ReplyConfig,
    message::{IncomingMessage, OutgoingMessage},
    traits::Channel,
};
use foresight_store::{ForesightService, UserId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Routes recognized commands from every channel to the foresight service.
pub struct Gateway {
    service: Arc<ForesightService>,
    channels: HashMap<String, Arc<dyn Channel>>,
    reply: ReplyConfig,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(
        service: Arc<ForesightService>,
        channels: HashMap<String, Arc<dyn Channel>>,
        reply: ReplyConfig,
    ) -> Self {
        Self {
            service,
            channels,
            reply,
        }
    }

    /// Run the main event loop until Ctrl-C.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "Foresight gateway running | channels: {} | foresights: {} | state: {}",
            self.channels.keys().cloned().collect::<Vec<_>>().join(", "),
            self.service.pool().len(),
            self.service.store().location(),
        );

        let (tx, mut rx) = mpsc::channel::<IncomingMessage>(256);

        for (name, channel) in &self.channels {
            let mut channel_rx = channel
                .start()
                .await
                .map_err(|e| anyhow::anyhow!("failed to start channel {name}: {e}"))?;
            let tx = tx.clone();
            let channel_name = name.clone();

            tokio::spawn(async move {
                while let Some(msg) = channel_rx.recv().await {
                    if tx.send(msg).await.is_err() {
                        info!("gateway receiver dropped, stopping {channel_name} forwarder");
                        break;
                    }
                }
            });

            info!("Channel started: {name}");
        }

        drop(tx);

        loop {
            tokio::select! {
                incoming = rx.recv() => {
                    let Some(incoming) = incoming else {
                        warn!("all channels closed");
                        break;
                    };
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.handle_message(incoming).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// Stop all channels.
    async fn shutdown(&self) {
        info!("Shutting down...");
        for (name, channel) in &self.channels {
            if let Err(e) = channel.stop().await {
                warn!("failed to stop channel {name}: {e}");
            }
        }
        info!("Shutdown complete.");
    }

    /// Handle one inbound message. Anything that is not a known command is ignored.
    pub(crate) async fn handle_message(&self, incoming: IncomingMessage) {
        let bot_username = self
            .channels
            .get(&incoming.channel)
            .and_then(|c| c.bot_username());

        let Some(command) = Command::parse(&incoming.text, bot_username.as_deref()) else {
            return;
        };

        match command {
            Command::Foresight => {
                if let Some(reply) = self.foresight_reply(&incoming).await {
                    self.send(&incoming, reply).await;
                }
            }
        }
    }

    /// Build the foresight reply, or `None` if it could not be computed.
    async fn foresight_reply(&self, incoming: &IncomingMessage) -> Option<OutgoingMessage> {
        let user: UserId = match incoming.sender_id.parse() {
            Ok(id) => id,
            Err(e) => {
                warn!(
                    "{}: cannot use sender id '{}' as a user id: {e}",
                    incoming.channel, incoming.sender_id
                );
                return None;
            }
        };
        // Server clock, not the send time: late deliveries must not reach back a day.
        let now = Local::now();

        // The store writes its state file synchronously; keep that off the async workers.
        let service = self.service.clone();
        let result = tokio::task::spawn_blocking(move || {
            service.get_foresight(user, &now).map(str::to_owned)
        })
        .await;

        let foresight = match result {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                error!("failed to pick foresight for user {user}: {e}");
                return None;
            }
            Err(e) => {
                error!("foresight task for user {user} failed: {e}");
                return None;
            }
        };

        debug!(
            "foresight for {} ({user}) on {}",
            incoming.sender_name.as_deref().unwrap_or("unknown"),
            incoming.channel
        );

        let text = format_foresight(&self.reply.intro, &foresight);
        Some(OutgoingMessage::reply_to(incoming, text).with_markdown())
    }

    /// Send a reply through the channel the message came from.
    async fn send(&self, incoming: &IncomingMessage, reply: OutgoingMessage) {
        let Some(channel) = self.channels.get(&incoming.channel) else {
            warn!("no channel named {} to reply through", incoming.channel);
            return;
        };
        if let Err(e) = channel.send(reply).await {
            error!("failed to send message: {e}");
        }
    }
}
