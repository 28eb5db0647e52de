//! MessageBroker: builds, signs, and sends outbound envelopes.
//!
//! The broker is the single point through which the kernel publishes
//! messages. It owns the session identity and the signer (both injected at
//! construction), mints a fresh header per message, serializes the four JSON
//! parts in the fixed signing order, and performs exactly one multipart
//! write per message.

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use quill_wire::{encode, Header, MsgType, Session, Signer};

use crate::infrastructure::transport::Channel;

/// Error type for outbound message assembly and delivery.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// One of the four JSON parts could not be serialized.
    #[error("failed to serialize {part} part: {source}")]
    Serialize {
        part: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The transport rejected the multipart write.
    #[error("transport write failed: {0}")]
    Transport(#[from] std::io::Error),
}

/// Builds and publishes signed outbound messages.
pub struct MessageBroker {
    signer: Signer,
    session: Session,
}

impl MessageBroker {
    /// Creates a broker from an already-validated signer and session.
    pub fn new(signer: Signer, session: Session) -> Self {
        Self { signer, session }
    }

    /// The session identity stamped into every outbound header.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Builds, signs, and sends one message on `channel`.
    ///
    /// `parent_header` and `metadata` must be JSON objects; `Value::Null` is
    /// normalized to `{}` so that empty parts always reach the wire as empty
    /// objects, never `null` or `[]`.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::Serialize`] when a part fails to serialize and
    /// [`BrokerError::Transport`] when the channel write fails.
    pub async fn send(
        &self,
        channel: &dyn Channel,
        msg_type: MsgType,
        content: &Value,
        parent_header: &Value,
        metadata: &Value,
    ) -> Result<(), BrokerError> {
        let header = self.session.header(msg_type);

        let header_bytes =
            serde_json::to_vec(&header).map_err(|source| BrokerError::Serialize {
                part: "header",
                source,
            })?;
        let parent_bytes = serialize_part("parent_header", parent_header)?;
        let metadata_bytes = serialize_part("metadata", metadata)?;
        let content_bytes = serialize_part("content", content)?;

        let signature = self.signer.sign(&[
            &header_bytes,
            &parent_bytes,
            &metadata_bytes,
            &content_bytes,
        ]);

        let frames = encode(
            &signature,
            [header_bytes, parent_bytes, metadata_bytes, content_bytes],
        );

        debug!(
            process_id = std::process::id(),
            msg_type = msg_type.as_str(),
            msg_id = %header.msg_id,
            content = %content,
            frames = ?frames
                .iter()
                .map(|f| String::from_utf8_lossy(f))
                .collect::<Vec<_>>(),
            "sent message"
        );

        channel.send_multipart(frames).await?;
        Ok(())
    }

    /// Convenience for the common reply pattern where the parent is the
    /// request header and metadata is empty.
    ///
    /// # Errors
    ///
    /// Same as [`MessageBroker::send`].
    pub async fn reply(
        &self,
        channel: &dyn Channel,
        msg_type: MsgType,
        content: &Value,
        parent: &Header,
    ) -> Result<(), BrokerError> {
        let parent_value = serde_json::to_value(parent).map_err(|source| {
            BrokerError::Serialize {
                part: "parent_header",
                source,
            }
        })?;
        self.send(channel, msg_type, content, &parent_value, &Value::Null)
            .await
    }
}

/// Serializes one part, normalizing `Null` to an empty JSON object.
fn serialize_part(part: &'static str, value: &Value) -> Result<Vec<u8>, BrokerError> {
    if value.is_null() {
        return Ok(b"{}".to_vec());
    }
    serde_json::to_vec(value).map_err(|source| BrokerError::Serialize { part, source })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
