//! Status channel that writes to the log.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;

use super::{ChannelError, MessageId, StatusChannel};

/// Logs every status update through `tracing`.
///
/// Used when no chat channel is configured, e.g. for local runs of the CLI.
#[derive(Debug, Default)]
pub struct LogChannel {
    next_id: AtomicI64,
}

impl LogChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StatusChannel for LogChannel {
    async fn post(&self, text: &str) -> Result<MessageId, ChannelError> {
        let id = MessageId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        tracing::info!(message = %id, "{}", text);
        Ok(id)
    }

    async fn edit(&self, id: MessageId, text: &str) -> Result<(), ChannelError> {
        tracing::info!(message = %id, "{}", text);
        Ok(())
    }
}
