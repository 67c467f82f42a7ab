//! # Message Framer
//!
//! Parses one message off the transport: a line-delimited attribute block,
//! then a body whose handling depends on the attributes.
//!
//! ## Framing rules
//! - Lines parse into attributes until a line of length ≤ 1 (an empty
//!   line, or a lone `\r`) ends the block.
//! - Zero attributes read means the peer closed the connection; the framer
//!   reports this as `Ok(None)` and the sentinel never reaches a consumer.
//! - The protocol has exactly one verb: when the first attribute is not
//!   `POST`, the message is returned with attributes only and no body
//!   bytes are consumed.
//! - A `POST` with a non-empty `file` attribute streams `content-length`
//!   bytes to the sink store; the forwarded message gets the synthesized
//!   body `<file>NAME</file>` and a recomputed `content-length`.
//! - A `POST` without a `file` attribute carries an inline body of exactly
//!   `content-length` bytes.

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, warn};

use crate::config::MAX_PAYLOAD_SIZE;
use crate::core::message::{Attribute, Message};
use crate::core::receiver::FileReceiver;
use crate::error::{ProtocolError, Result};
use crate::storage::SinkStore;
use crate::transport::Transport;

/// The single verb this protocol understands.
const VERB_POST: &str = "POST";

/// Size limits applied while framing one connection.
///
/// Carried from the server configuration down to the transport, framer,
/// and file receiver so every connection enforces the same caps.
#[derive(Debug, Clone, Copy)]
pub struct FramingLimits {
    /// Longest accepted attribute line, in bytes.
    pub max_line_len: usize,
    /// Largest accepted inline message body, in bytes.
    pub max_payload: usize,
    /// Block size used to stream file content.
    pub block_size: usize,
}

impl Default for FramingLimits {
    fn default() -> Self {
        Self {
            max_line_len: crate::transport::MAX_LINE_LEN,
            max_payload: MAX_PAYLOAD_SIZE,
            block_size: crate::core::receiver::BLOCK_SIZE,
        }
    }
}

/// Frames messages off a transport, handing file payloads to a
/// [`FileReceiver`] backed by the given store.
pub struct MessageFramer<'a> {
    store: &'a dyn SinkStore,
    limits: FramingLimits,
}

impl<'a> MessageFramer<'a> {
    pub fn new(store: &'a dyn SinkStore) -> Self {
        Self {
            store,
            limits: FramingLimits::default(),
        }
    }

    /// Apply configured size limits instead of the defaults.
    pub fn with_limits(mut self, limits: FramingLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Read one complete message.
    ///
    /// Returns `Ok(None)` when the peer closed the connection before
    /// sending any attributes.
    pub async fn read_message<S>(&self, transport: &mut Transport<S>) -> Result<Option<Message>>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut message = Message::new();

        loop {
            let line = transport.read_line().await?;
            if line.len() <= 1 {
                break;
            }
            message.add_attribute(Attribute::parse(&line));
        }

        if message.attributes().is_empty() {
            return Ok(None);
        }

        if message.verb() == Some(VERB_POST) {
            match message.find_value("file").filter(|v| !v.is_empty()) {
                Some(_) => self.read_file_payload(&mut message, transport).await?,
                None => self.read_inline_body(&mut message, transport).await?,
            }
        }

        debug!(
            attributes = message.attributes().len(),
            body_bytes = message.body().len(),
            "message framed"
        );
        Ok(Some(message))
    }

    /// Stream the declared file bytes to the sink store and rewrite the
    /// message to carry the synthesized `<file>NAME</file>` body.
    async fn read_file_payload<S>(
        &self,
        message: &mut Message,
        transport: &mut Transport<S>,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        // find_value returns the owned name before the message is edited.
        let filename = message
            .find_value("file")
            .unwrap_or_default()
            .to_string();

        let Some(declared_size) = parse_content_length(message) else {
            // No way to know how many bytes to drain. Per protocol the
            // message is returned as-is; every subsequent read on this
            // connection is suspect.
            warn!(
                file = %filename,
                "file POST without content-length; stream may be desynchronized"
            );
            return Ok(());
        };

        FileReceiver::new(self.store)
            .with_block_size(self.limits.block_size)
            .receive(&filename, declared_size, transport)
            .await?;

        message.remove_attribute("content-length");
        let body = format!("<file>{filename}</file>");
        message.add_attribute(Attribute::new("content-length", body.len().to_string()));
        message.set_body(body.into_bytes());
        Ok(())
    }

    /// Read exactly `content-length` bytes as the message body; a missing
    /// or unparsable length means the message has no body.
    async fn read_inline_body<S>(
        &self,
        message: &mut Message,
        transport: &mut Transport<S>,
    ) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let Some(len) = parse_content_length(message) else {
            return Ok(());
        };

        let len = len as usize;
        if len > self.limits.max_payload {
            return Err(ProtocolError::OversizedPayload {
                size: len,
                limit: self.limits.max_payload,
            });
        }

        let body = transport.read_exact(len).await?;
        message.set_body(body);
        Ok(())
    }
}

/// First `content-length` attribute parsed as a byte count.
fn parse_content_length(message: &Message) -> Option<u64> {
    let value = message.find_value("content-length")?;
    match value.parse::<u64>() {
        Ok(len) => Some(len),
        Err(_) => {
            warn!(value = %value, "unparsable content-length; treating as absent");
            None
        }
    }
}
