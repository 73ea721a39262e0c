//! Operator-facing status channel.
//!
//! A task keeps one [`StatusMessage`] open for its whole lifetime and keeps
//! editing it as stages progress. [`StatusMessage::announce`] skips edits that
//! would not change the displayed text and absorbs one flood-control wait.

pub mod log;
pub mod telegram;

pub use log::LogChannel;
pub use telegram::TelegramBot;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

/// Identity of a posted message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors reported by a status channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// Flood control; the channel asks us to wait before the next call.
    #[error("rate limited, retry after {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    /// The edit would leave the message unchanged.
    #[error("message is not modified")]
    NotModified,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("API error {code}: {description}")]
    Api { code: u16, description: String },
}

/// Something that can show and update text for the operator.
#[async_trait]
pub trait StatusChannel: Send + Sync {
    /// Post a new message.
    async fn post(&self, text: &str) -> Result<MessageId, ChannelError>;

    /// Replace the text of a posted message.
    async fn edit(&self, id: MessageId, text: &str) -> Result<(), ChannelError>;
}

/// The single status message of a task.
pub struct StatusMessage {
    channel: Arc<dyn StatusChannel>,
    id: MessageId,
    last: String,
}

impl StatusMessage {
    /// Post the initial status text.
    pub async fn open(channel: Arc<dyn StatusChannel>, text: &str) -> Result<Self, ChannelError> {
        let id = match channel.post(text).await {
            Err(ChannelError::RateLimited { retry_after }) => {
                warn!(wait_secs = retry_after.as_secs(), "Status channel flood wait");
                tokio::time::sleep(retry_after).await;
                channel.post(text).await?
            }
            other => other?,
        };

        Ok(Self {
            channel,
            id,
            last: text.to_string(),
        })
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    /// The text currently displayed.
    pub fn text(&self) -> &str {
        &self.last
    }

    /// Show `text`, editing the message only when it actually changes.
    ///
    /// A flood-control reply is waited out exactly once; a second failure is
    /// returned. "Not modified" counts as success.
    pub async fn announce(&mut self, text: &str) -> Result<(), ChannelError> {
        if text == self.last {
            return Ok(());
        }

        let result = match self.channel.edit(self.id, text).await {
            Err(ChannelError::RateLimited { retry_after }) => {
                warn!(
                    message = %self.id,
                    wait_secs = retry_after.as_secs(),
                    "Status edit hit flood control, retrying once"
                );
                tokio::time::sleep(retry_after).await;
                self.channel.edit(self.id, text).await
            }
            other => other,
        };

        match result {
            Ok(()) | Err(ChannelError::NotModified) => {
                self.last = text.to_string();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Best-effort [`announce`](Self::announce): failures are logged only.
    pub async fn report(&mut self, text: &str) {
        if let Err(e) = self.announce(text).await {
            warn!(message = %self.id, "Failed to update status message: {}", e);
        } else {
            debug!(message = %self.id, "Status: {}", text);
        }
    }
}
