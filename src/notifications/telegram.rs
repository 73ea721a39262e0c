//! Telegram Bot API client.
//!
//! Serves both as the operator [`StatusChannel`] (`sendMessage`,
//! `editMessageText`) and as a [`DeliverySink`] (`sendDocument`, streamed from
//! disk with per-chunk progress).
//!
//! Error mapping:
//! - HTTP 429 with `parameters.retry_after` -> [`ChannelError::RateLimited`]
//! - HTTP 400 "message is not modified" -> [`ChannelError::NotModified`]
//! - anything else the API rejects -> [`ChannelError::Api`]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use super::{ChannelError, MessageId, StatusChannel};
use crate::config::TelegramConfig;
use crate::progress::TransferObserver;
use crate::sinks::{Delivery, DeliverySink, SinkError, Upload};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CHUNK_SIZE: usize = 512 * 1024;
const FALLBACK_RETRY_AFTER: u64 = 1;

// ---------------------------------------------------------------------------
// Bot API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    error_code: Option<u16>,
    description: Option<String>,
    parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
struct ResponseParameters {
    retry_after: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Telegram bot bound to one chat.
///
/// # Examples
///
/// ```no_run
/// use anidrop::config::TelegramConfig;
/// use anidrop::notifications::TelegramBot;
///
/// let config = TelegramConfig {
///     bot_token: "123:abc".into(),
///     chat_id: Some("-100200".into()),
///     ..TelegramConfig::default()
/// };
/// let bot = TelegramBot::new(&config);
/// ```
pub struct TelegramBot {
    client: Client,
    base_url: String,
    chat_id: String,
    parse_mode: Option<String>,
    chunk_size: usize,
}

impl TelegramBot {
    pub fn new(config: &TelegramConfig) -> Self {
        // No overall timeout: documents can take a long time to stream.
        let client = Client::builder()
            .connect_timeout(CONNECTION_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client: {}", e);
                Client::new()
            });

        Self {
            client,
            base_url: format!(
                "{}/bot{}",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id.clone().unwrap_or_default(),
            parse_mode: config.parse_mode.clone(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Read size used when streaming documents.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Send a request and unwrap the Bot API envelope.
    async fn call<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ChannelError> {
        let response = request
            .send()
            .await
            .map_err(|e| ChannelError::Transport(e.to_string()))?;

        let status = response.status();
        let body: ApiResponse<T> = response.json().await.map_err(|e| {
            ChannelError::Transport(format!("invalid Bot API response ({}): {}", status, e))
        })?;

        if body.ok {
            return body.result.ok_or_else(|| ChannelError::Api {
                code: status.as_u16(),
                description: "response carried no result".to_string(),
            });
        }

        let code = body.error_code.unwrap_or(status.as_u16());
        let description = body.description.unwrap_or_default();

        if code == 429 {
            let retry_after = body
                .parameters
                .and_then(|p| p.retry_after)
                .unwrap_or(FALLBACK_RETRY_AFTER);
            return Err(ChannelError::RateLimited {
                retry_after: Duration::from_secs(retry_after),
            });
        }

        if code == 400 && description.contains("message is not modified") {
            return Err(ChannelError::NotModified);
        }

        Err(ChannelError::Api { code, description })
    }

    async fn document_form(
        &self,
        upload: &Upload<'_>,
        observer: Arc<dyn TransferObserver>,
    ) -> Result<Form, SinkError> {
        let file = tokio::fs::File::open(upload.path).await?;
        let total = file.metadata().await?.len();

        observer.on_progress(0, total);
        let mut sent = 0u64;
        let stream = ReaderStream::with_capacity(file, self.chunk_size).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
                observer.on_progress(sent, total);
            }
            chunk
        });

        let document = Part::stream_with_length(Body::wrap_stream(stream), total)
            .file_name(file_name(upload.path));

        let mut form = Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", upload.caption.to_string())
            .part("document", document);

        if let Some(mode) = &self.parse_mode {
            form = form.text("parse_mode", mode.clone());
        }

        if let Some(thumbnail) = upload.thumbnail {
            match tokio::fs::read(thumbnail).await {
                Ok(bytes) => {
                    form = form.part("thumbnail", Part::bytes(bytes).file_name(file_name(thumbnail)));
                }
                Err(e) => warn!("Skipping unreadable thumbnail {:?}: {}", thumbnail, e),
            }
        }

        Ok(form)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

fn sink_error(err: ChannelError) -> SinkError {
    match err {
        ChannelError::RateLimited { retry_after } => SinkError::RateLimited { retry_after },
        ChannelError::Transport(message) => SinkError::Transport(message),
        ChannelError::Api { code, description } => SinkError::Rejected { code, description },
        ChannelError::NotModified => SinkError::Rejected {
            code: 400,
            description: "message is not modified".to_string(),
        },
    }
}

// ---------------------------------------------------------------------------
// Trait implementations
// ---------------------------------------------------------------------------

#[async_trait]
impl StatusChannel for TelegramBot {
    async fn post(&self, text: &str) -> Result<MessageId, ChannelError> {
        let mut body = json!({ "chat_id": self.chat_id, "text": text });
        if let Some(mode) = &self.parse_mode {
            body["parse_mode"] = json!(mode);
        }

        let message: Message = self
            .call(
                self.client
                    .post(self.method_url("sendMessage"))
                    .timeout(REQUEST_TIMEOUT)
                    .json(&body),
            )
            .await?;

        debug!(message = message.message_id, "Posted status message");
        Ok(MessageId(message.message_id))
    }

    async fn edit(&self, id: MessageId, text: &str) -> Result<(), ChannelError> {
        let mut body = json!({ "chat_id": self.chat_id, "message_id": id.0, "text": text });
        if let Some(mode) = &self.parse_mode {
            body["parse_mode"] = json!(mode);
        }

        // Result is the edited message, or `true` for inline messages.
        let _: serde_json::Value = self
            .call(
                self.client
                    .post(self.method_url("editMessageText"))
                    .timeout(REQUEST_TIMEOUT)
                    .json(&body),
            )
            .await?;

        Ok(())
    }
}

#[async_trait]
impl DeliverySink for TelegramBot {
    fn name(&self) -> &str {
        "Telegram"
    }

    async fn deliver(
        &self,
        upload: &Upload<'_>,
        observer: Arc<dyn TransferObserver>,
    ) -> Result<Delivery, SinkError> {
        let url = self.method_url("sendDocument");
        let mut retried = false;

        loop {
            // The form owns the file stream, so every attempt rebuilds it.
            let form = self.document_form(upload, observer.clone()).await?;

            match self
                .call::<Message>(self.client.post(&url).multipart(form))
                .await
            {
                Ok(message) => {
                    return Ok(Delivery {
                        sink: self.name().to_string(),
                        location: Some(format!("message {}", message.message_id)),
                    });
                }
                Err(ChannelError::RateLimited { retry_after }) if !retried => {
                    retried = true;
                    warn!(
                        wait_secs = retry_after.as_secs(),
                        "sendDocument hit flood control, retrying once"
                    );
                    tokio::time::sleep(retry_after).await;
                }
                Err(e) => return Err(sink_error(e)),
            }
        }
    }
}
