//! # Connection Handler
//!
//! Drives one connection from accept to termination.
//!
//! One handler is constructed per accepted transport; nothing mutable is
//! shared between concurrently running handlers except the message queue,
//! which is internally synchronized. The handler loops over
//! `MessageFramer::read_message` and forwards each completed message to
//! the queue, stopping when the peer closes the connection or sends the
//! `quit` sentinel. Neither terminating condition produces an enqueued
//! message.
//!
//! Reads have no timeout: a stalled peer stalls this handler's task
//! indefinitely. Supervision is the caller's concern.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, warn};

use crate::core::framer::{FramingLimits, MessageFramer};
use crate::error::Result;
use crate::protocol::queue::MessageProducer;
use crate::storage::SinkStore;
use crate::transport::Transport;

/// Body text that terminates a connection without being forwarded.
const QUIT_SENTINEL: &str = "quit";

/// Per-connection message pump.
pub struct ConnectionHandler {
    queue: MessageProducer,
    store: Arc<dyn SinkStore>,
    limits: FramingLimits,
}

impl ConnectionHandler {
    pub fn new(queue: MessageProducer, store: Arc<dyn SinkStore>) -> Self {
        Self {
            queue,
            store,
            limits: FramingLimits::default(),
        }
    }

    /// Apply configured size limits instead of the defaults.
    pub fn with_limits(mut self, limits: FramingLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Process the connection until the peer closes it, sends `quit`, or
    /// the transport fails.
    ///
    /// Protocol-level oddities (malformed file posts, unopenable sinks)
    /// are handled inside the framer; only transport and limit errors
    /// reach this loop, and they end the connection after a log line.
    pub async fn run<S>(self, stream: S)
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut transport = Transport::new(stream).with_max_line_len(self.limits.max_line_len);
        if let Err(e) = self.pump(&mut transport).await {
            warn!(error = %e, "connection handler stopped on error");
        }
    }

    async fn pump<S>(&self, transport: &mut Transport<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let framer = MessageFramer::new(self.store.as_ref()).with_limits(self.limits);

        loop {
            let Some(message) = framer.read_message(transport).await? else {
                info!("peer closed connection; handler terminating");
                return Ok(());
            };

            if message.body_str() == QUIT_SENTINEL {
                info!("quit received; handler terminating");
                return Ok(());
            }

            debug!(
                attributes = message.attributes().len(),
                "forwarding message to queue"
            );
            self.queue.enqueue(message).await?;
        }
    }
}
